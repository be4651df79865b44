use std::time::Duration;

use sonosupnp::soap::{SoapFault, build_soap_request, parse_soap_envelope, parse_soap_fault};
use tracing::{debug, trace};

use crate::errors::ControlError;
use crate::transport::HttpTransport;

pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Result of a SOAP call: HTTP status code and raw XML body.
#[derive(Debug, Clone)]
pub struct SoapCallResult {
    pub status: u16,
    pub raw_body: String,
}

impl SoapCallResult {
    /// Only an exact 200 counts as success for control actions.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// SOAP fault carried by the body, if the body parses as an envelope.
    pub fn fault(&self) -> Option<SoapFault> {
        parse_soap_envelope(self.raw_body.as_bytes())
            .ok()
            .and_then(|envelope| parse_soap_fault(&envelope))
    }
}

/// Invoke a UPnP SOAP action on a control URL.
///
/// - `control_url`: full HTTP URL of the service control endpoint
/// - `service_type`: service URN, e.g. "urn:schemas-upnp-org:service:AVTransport:1"
/// - `action`: action name, e.g. "Play"
/// - `args`: list of (name, value) pairs, e.g. &[("InstanceID", "0")]
///
/// Any HTTP status is returned as a result; only transport faults are errors.
pub fn invoke_upnp_action(
    transport: &dyn HttpTransport,
    control_url: &str,
    service_type: &str,
    action: &str,
    args: &[(&str, &str)],
    timeout: Duration,
) -> Result<SoapCallResult, ControlError> {
    let body_xml = build_soap_request(service_type, action, args)?;

    let soap_action_header = format!(r#""{}#{}""#, service_type, action);
    let headers = [
        ("Content-Type", SOAP_CONTENT_TYPE),
        ("SOAPAction", soap_action_header.as_str()),
    ];

    debug!("Invoking {} on {}", action, control_url);
    trace!("SOAP request body:\n{}", body_xml);

    let response = transport.post(control_url, &headers, &body_xml, timeout)?;

    Ok(SoapCallResult {
        status: response.status,
        raw_body: response.body,
    })
}

/// Turns a non-200 status into [`ControlError::BadStatus`].
///
/// A UPnP fault in the body is logged but never changes the outcome.
pub fn ensure_ok(action: &str, call_result: &SoapCallResult) -> Result<(), ControlError> {
    if call_result.is_ok() {
        return Ok(());
    }

    match call_result.fault() {
        Some(fault) => debug!(
            "{} returned {} (HTTP status {})",
            action, fault, call_result.status
        ),
        None => trace!(
            "{} failed with HTTP status {} and body: {}",
            action, call_result.status, call_result.raw_body
        ),
    }

    Err(ControlError::bad_status(action, call_result.status))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAULT_BODY: &str = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <s:Fault>
      <faultcode>s:Client</faultcode>
      <faultstring>UPnPError</faultstring>
      <detail>
        <UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
          <errorCode>701</errorCode>
        </UPnPError>
      </detail>
    </s:Fault>
  </s:Body>
</s:Envelope>"#;

    fn call_result(status: u16, raw_body: &str) -> SoapCallResult {
        SoapCallResult {
            status,
            raw_body: raw_body.to_string(),
        }
    }

    #[test]
    fn only_exact_200_is_ok() {
        let ok = call_result(200, "");
        let no_content = call_result(204, "");

        assert!(ensure_ok("Play", &ok).is_ok());
        assert!(matches!(
            ensure_ok("Play", &no_content),
            Err(ControlError::BadStatus { status: 204, .. })
        ));
    }

    #[test]
    fn fault_is_decoded_for_diagnostics() {
        let result = call_result(500, FAULT_BODY);

        let fault = result.fault().unwrap();
        assert_eq!(fault.upnp_error.unwrap().error_code, 701);
        assert!(matches!(
            ensure_ok("Pause", &result),
            Err(ControlError::BadStatus { status: 500, .. })
        ));
    }

    #[test]
    fn fault_in_200_body_does_not_fail() {
        let result = call_result(200, FAULT_BODY);
        assert!(ensure_ok("Stop", &result).is_ok());
    }
}

use super::{SoapEnvelope, find_child_with_suffix};
use xmltree::Element;

/// `s:Fault` payload of a failed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// e.g. `s:Client`
    pub fault_code: String,
    /// Usually `UPnPError`.
    pub fault_string: String,
    pub upnp_error: Option<UpnpError>,
}

/// `detail/UPnPError` of a fault (701 "Transition not available", ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpnpError {
    pub error_code: u32,
    /// Empty when the device sends none.
    pub error_description: String,
}

impl std::fmt::Display for SoapFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.upnp_error {
            Some(err) if err.error_description.is_empty() => {
                write!(f, "UPnP error {}", err.error_code)
            }
            Some(err) => write!(f, "UPnP error {} ({})", err.error_code, err.error_description),
            None => write!(f, "{}: {}", self.fault_code, self.fault_string),
        }
    }
}

/// Decodes the fault carried by `envelope`, if its payload is one.
pub fn parse_soap_fault(envelope: &SoapEnvelope) -> Option<SoapFault> {
    if !envelope.is_fault() {
        return None;
    }
    let fault = envelope.payload()?;

    let upnp_error = find_child_with_suffix(fault, "detail")
        .and_then(|detail| find_child_with_suffix(detail, "UPnPError"))
        .and_then(|err| {
            Some(UpnpError {
                error_code: child_text(err, "errorCode")?.parse().ok()?,
                error_description: child_text(err, "errorDescription").unwrap_or_default(),
            })
        });

    Some(SoapFault {
        fault_code: child_text(fault, "faultcode").unwrap_or_default(),
        fault_string: child_text(fault, "faultstring").unwrap_or_default(),
        upnp_error,
    })
}

fn child_text(parent: &Element, suffix: &str) -> Option<String> {
    let text = find_child_with_suffix(parent, suffix)?.get_text()?;
    Some(text.trim().to_string())
}

use sonosupnp::xml::first_element_text;
use tracing::debug;

use crate::config::ControllerConfig;
use crate::errors::ControlError;
use crate::transport::HttpTransport;

const FRIENDLY_NAME_TAG: &str = "friendlyName";

/// First `friendlyName` of a device description document.
pub fn parse_friendly_name(xml: &str) -> Result<String, ControlError> {
    first_element_text(xml, FRIENDLY_NAME_TAG)
        .ok_or_else(|| ControlError::parse("Missing friendlyName element in device description"))
}

/// Fetches the description document of the speaker at `address` and reads
/// its friendly name.
pub fn fetch_friendly_name(
    transport: &dyn HttpTransport,
    config: &ControllerConfig,
    address: &str,
) -> Result<String, ControlError> {
    let url = config.description_url(address);
    let response = transport.get(&url, config.http_timeout())?;

    if !response.is_success() {
        return Err(ControlError::bad_status("GetDeviceDescription", response.status));
    }

    parse_friendly_name(&response.body)
}

/// Friendly name of the speaker, or the synthesised fallback name when the
/// description cannot be fetched or read. Never empty.
pub fn resolve_device_name(
    transport: &dyn HttpTransport,
    config: &ControllerConfig,
    address: &str,
) -> String {
    match fetch_friendly_name(transport, config, address) {
        Ok(name) => name,
        Err(err) => {
            debug!("Cannot name speaker at {}: {}", address, err);
            config.fallback_name(address)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SONOS_DESCRIPTION: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:ZonePlayer:1</deviceType>
    <friendlyName>192.168.1.20 - Sonos One - RINCON_000E58A0123401400</friendlyName>
    <manufacturer>Sonos, Inc.</manufacturer>
    <modelName>Sonos One</modelName>
    <roomName>Living Room</roomName>
    <deviceList>
      <device>
        <deviceType>urn:schemas-upnp-org:device:MediaRenderer:1</deviceType>
        <friendlyName>Living Room - Sonos One Media Renderer</friendlyName>
      </device>
    </deviceList>
  </device>
</root>"#;

    #[test]
    fn reads_simple_friendly_name() {
        let xml = "<root><device><friendlyName>Living Room</friendlyName></device></root>";
        assert_eq!(parse_friendly_name(xml).unwrap(), "Living Room");
    }

    #[test]
    fn reads_root_device_name_first() {
        assert_eq!(
            parse_friendly_name(SONOS_DESCRIPTION).unwrap(),
            "192.168.1.20 - Sonos One - RINCON_000E58A0123401400"
        );
    }

    #[test]
    fn missing_tag_is_a_parse_error() {
        let xml = "<root><device><modelName>Sonos One</modelName></device></root>";
        assert!(matches!(parse_friendly_name(xml), Err(ControlError::Parse(_))));
    }

    #[test]
    fn empty_root_name_does_not_borrow_sub_device_name() {
        let xml = SONOS_DESCRIPTION.replace(
            "192.168.1.20 - Sonos One - RINCON_000E58A0123401400",
            "",
        );
        assert!(matches!(parse_friendly_name(&xml), Err(ControlError::Parse(_))));
    }
}

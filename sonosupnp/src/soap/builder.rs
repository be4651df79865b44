use super::{SOAP_ENCODING_STYLE, SOAP_ENVELOPE_NS, SoapBuildError};
use xmltree::{Element, EmitterConfig, XMLNode};

/// Serialises a UPnP action call.
///
/// The action element is `u:<action>` in the `service_urn` namespace, with
/// one child per argument in the given order. Values are XML-escaped.
pub fn build_soap_request(
    service_urn: &str,
    action: &str,
    args: &[(&str, &str)],
) -> Result<String, SoapBuildError> {
    let mut call = Element::new(&format!("u:{}", action));
    call.attributes
        .insert("xmlns:u".to_string(), service_urn.to_string());
    call.children.extend(
        args.iter()
            .map(|(name, value)| XMLNode::Element(text_element(name, value))),
    );

    write_document(&wrap_in_envelope(call))
}

fn text_element(name: &str, value: &str) -> Element {
    let mut element = Element::new(name);
    element.children.push(XMLNode::Text(value.to_string()));
    element
}

fn wrap_in_envelope(payload: Element) -> Element {
    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(payload));

    let mut envelope = Element::new("s:Envelope");
    for (name, value) in [
        ("xmlns:s", SOAP_ENVELOPE_NS),
        ("s:encodingStyle", SOAP_ENCODING_STYLE),
    ] {
        envelope.attributes.insert(name.to_string(), value.to_string());
    }
    envelope.children.push(XMLNode::Element(body));
    envelope
}

fn write_document(root: &Element) -> Result<String, SoapBuildError> {
    let config = EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(false);

    let mut out = Vec::new();
    root.write_with_config(&mut out, config)?;
    Ok(String::from_utf8(out)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_volume_arguments_keep_their_order() {
        let xml = build_soap_request(
            "urn:schemas-upnp-org:service:RenderingControl:1",
            "SetVolume",
            &[("InstanceID", "0"), ("Channel", "Master"), ("DesiredVolume", "42")],
        )
        .unwrap();

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\""));
        assert!(xml.contains("s:encodingStyle=\"http://schemas.xmlsoap.org/soap/encoding/\""));
        assert!(xml.contains("xmlns:u=\"urn:schemas-upnp-org:service:RenderingControl:1\""));

        let instance = xml.find("<InstanceID>0</InstanceID>").unwrap();
        let channel = xml.find("<Channel>Master</Channel>").unwrap();
        let volume = xml.find("<DesiredVolume>42</DesiredVolume>").unwrap();
        assert!(xml.find("<u:SetVolume").unwrap() < instance);
        assert!(instance < channel && channel < volume);
    }

    #[test]
    fn action_without_arguments() {
        let xml = build_soap_request("urn:schemas-upnp-org:service:AVTransport:1", "Next", &[])
            .unwrap();
        assert!(xml.contains("<s:Body><u:Next"));
    }

    #[test]
    fn argument_values_are_escaped() {
        let xml = build_soap_request(
            "urn:schemas-upnp-org:service:AVTransport:1",
            "SetAVTransportURI",
            &[("CurrentURI", "http://host/a?b=1&c=2")],
        )
        .unwrap();

        assert!(xml.contains("http://host/a?b=1&amp;c=2"));
    }
}

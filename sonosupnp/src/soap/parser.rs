use super::SoapEnvelope;
use xmltree::{Element, XMLNode};

#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] xmltree::ParseError),

    #[error("Root element is <{0}>, not a SOAP Envelope")]
    MissingEnvelope(String),

    #[error("SOAP Envelope has no Body")]
    MissingBody,
}

/// Parses a response document into its body element.
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapParseError> {
    let mut root = Element::parse(xml)?;

    if !root.name.ends_with("Envelope") {
        return Err(SoapParseError::MissingEnvelope(root.name));
    }

    let position = root
        .children
        .iter()
        .position(|node| matches!(node, XMLNode::Element(e) if e.name.ends_with("Body")))
        .ok_or(SoapParseError::MissingBody)?;

    match root.children.swap_remove(position) {
        XMLNode::Element(body) => Ok(SoapEnvelope::from_body(body)),
        _ => Err(SoapParseError::MissingBody),
    }
}

/// First child element whose name ends with `suffix`.
///
/// Prefixes vary between devices (`s:Fault`, `SOAP-ENV:Fault`, ...), so
/// lookups match on the end of the name.
pub fn find_child_with_suffix<'a>(parent: &'a Element, suffix: &str) -> Option<&'a Element> {
    parent.children.iter().find_map(|node| match node {
        XMLNode::Element(elem) if elem.name.ends_with(suffix) => Some(elem),
        _ => None,
    })
}

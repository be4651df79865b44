use xmltree::{Element, XMLNode};

/// Body of a SOAP response, kept as an element tree.
///
/// Devices answer with a single payload element inside `s:Body`: either
/// `u:<Action>Response` or `s:Fault`. Any `s:Header` is discarded.
#[derive(Debug, Clone)]
pub struct SoapEnvelope {
    body: Element,
}

impl SoapEnvelope {
    pub(crate) fn from_body(body: Element) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &Element {
        &self.body
    }

    /// First element child of the body.
    pub fn payload(&self) -> Option<&Element> {
        self.body.children.iter().find_map(|node| match node {
            XMLNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn is_fault(&self) -> bool {
        self.payload().is_some_and(|p| p.name.ends_with("Fault"))
    }
}

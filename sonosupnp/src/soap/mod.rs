//! # Module SOAP - Simple Object Access Protocol
//!
//! Client side of UPnP control: action requests are serialised into SOAP
//! envelopes, and responses (including SOAP faults) are parsed back.
//!
//! ## Example
//!
//! ```
//! use sonosupnp::soap::build_soap_request;
//!
//! let body = build_soap_request(
//!     "urn:schemas-upnp-org:service:AVTransport:1",
//!     "Pause",
//!     &[("InstanceID", "0")],
//! )
//! .unwrap();
//! assert!(body.contains("<InstanceID>0</InstanceID>"));
//! ```

mod builder;
mod envelope;
mod fault;
mod parser;

pub use builder::build_soap_request;
pub use envelope::SoapEnvelope;
pub use fault::{SoapFault, UpnpError, parse_soap_fault};
pub use parser::{SoapParseError, find_child_with_suffix, parse_soap_envelope};

/// Namespace of the SOAP 1.1 envelope.
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Encoding style declared on every request envelope.
pub const SOAP_ENCODING_STYLE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// Erreur de construction d'une requête SOAP
#[derive(Debug, thiserror::Error)]
pub enum SoapBuildError {
    #[error("XML write error: {0}")]
    Xml(#[from] xmltree::Error),

    #[error("SOAP body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

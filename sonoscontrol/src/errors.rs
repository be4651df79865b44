use sonosupnp::soap::SoapBuildError;
use thiserror::Error;

/// Failure reason of a single network call.
///
/// Public operations of [`crate::SonosController`] never return this type;
/// they log it and collapse it to `false` / `None`.
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Request to {0} timed out")]
    Timeout(String),
    #[error("Connection refused by {0}")]
    ConnectionRefused(String),
    #[error("Host not found: {0}")]
    HostNotFound(String),
    #[error("{action} failed with HTTP status {status}")]
    BadStatus { action: String, status: u16 },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("No device named '{0}' answered discovery")]
    NotFound(String),
    #[error("Discovery error: {0}")]
    Discovery(#[from] std::io::Error),
    #[error("Soap Error: {0}")]
    Soap(#[from] SoapBuildError),
}

impl ControlError {
    pub fn bad_status(action: &str, status: u16) -> Self {
        ControlError::BadStatus {
            action: action.to_string(),
            status,
        }
    }

    pub fn not_found(name: &str) -> Self {
        ControlError::NotFound(name.to_string())
    }

    pub fn parse(message: &str) -> Self {
        ControlError::Parse(message.to_string())
    }
}

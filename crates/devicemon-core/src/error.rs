//! Shared error type across devicemon crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, DeviceMonError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum DeviceMonError {
    /// Malformed request body or invalid configuration.
    #[error("{0}")]
    BadRequest(String),
    /// Path identifier is not a positive integer.
    #[error("404 page not found")]
    NotFound,
    /// Method not supported on the route; `allow` lists the supported ones.
    #[error("method not allowed")]
    MethodNotAllowed { allow: &'static str },
    /// A metric with the same fully-qualified name is already registered.
    #[error("duplicate metric registration: {0}")]
    DuplicateMetric(String),
    #[error("{0}")]
    Internal(String),
}

impl DeviceMonError {
    /// HTTP status code surfaced to clients.
    pub fn status_code(&self) -> u16 {
        match self {
            DeviceMonError::BadRequest(_) => 400,
            DeviceMonError::NotFound => 404,
            DeviceMonError::MethodNotAllowed { .. } => 405,
            DeviceMonError::DuplicateMetric(_) | DeviceMonError::Internal(_) => 500,
        }
    }

    /// Value for the `Allow` header, if this error carries one.
    pub fn allow(&self) -> Option<&'static str> {
        match self {
            DeviceMonError::MethodNotAllowed { allow } => Some(allow),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DeviceMonError {
    fn from(e: serde_json::Error) -> Self {
        DeviceMonError::BadRequest(e.to_string())
    }
}

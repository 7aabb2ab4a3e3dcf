//! Unified error types for ErrorX Core.

use errorx_types::{GatewayError, LicenseError, ProfileError};
use serde::Serialize;
use thiserror::Error;

/// Main error type for all orchestration operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// A backend call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// License input or record was rejected.
    #[error(transparent)]
    License(#[from] LicenseError),

    /// Profile input was rejected.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// License validation could not be performed at all.
    #[error("Failed to validate license. Please try again.")]
    LoginUnavailable(#[source] GatewayError),

    /// Another execution of the same operation is still running.
    #[error("{key} is already in progress")]
    InFlight { key: String },

    /// Operation requires a logged-in session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub fn in_flight(key: &str) -> Self {
        Self::InFlight { key: key.to_string() }
    }
}

impl Serialize for CoreError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_message_passes_through() {
        let err = CoreError::from(GatewayError::Rejected("profile not found".to_string()));
        assert_eq!(err.to_string(), "profile not found");
    }

    #[test]
    fn test_login_unavailable_hides_transport_detail() {
        let err = CoreError::LoginUnavailable(GatewayError::Unreachable("refused".to_string()));
        assert_eq!(err.to_string(), "Failed to validate license. Please try again.");
    }
}

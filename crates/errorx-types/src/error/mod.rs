//! Typed error definitions for ErrorX.
//!
//! Every error here is serializable so it can cross the service boundary
//! and be rendered in a notice unchanged.

mod gateway;
mod license;
mod profile;

pub use gateway::GatewayError;
pub use license::LicenseError;
pub use profile::ProfileError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type that wraps all domain-specific errors.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "domain", content = "error")]
pub enum TypedError {
    /// Wraps a license-related error
    #[error("License error: {0}")]
    License(#[from] LicenseError),

    /// Wraps a profile operation error
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Wraps a backend gateway error
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Standard Result type using TypedError.
pub type Result<T> = std::result::Result<T, TypedError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = TypedError::Profile(ProfileError::NotFound { uid: "R1a2b".to_string() });

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("Profile"));
        assert!(json.contains("R1a2b"));

        let deserialized: TypedError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, deserialized);
    }

    #[test]
    fn test_error_display() {
        let err = GatewayError::Api { code: 500, message: "service busy".to_string() };

        let msg = format!("{}", TypedError::from(err));
        assert!(msg.contains("500"));
        assert!(msg.contains("service busy"));
    }
}

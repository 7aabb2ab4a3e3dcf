//! Profile-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during profile operations.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ProfileError {
    /// Profile with given uid not found
    #[error("Profile not found: {uid}")]
    NotFound {
        /// Identifier of the missing profile
        uid: String,
    },

    /// Import was submitted without a URL
    #[error("Profile URL is empty")]
    EmptyUrl,

    /// Only YAML files can be turned into local profiles
    #[error("Only YAML Files Supported: {path}")]
    UnsupportedFile {
        /// Rejected file path
        path: String,
    },

    /// Local file could not be read
    #[error("Failed to read {path}: {message}")]
    ReadFailed {
        /// File path
        path: String,
        /// Underlying I/O message
        message: String,
    },
}

impl ProfileError {
    /// Validation failures are rejected before any backend call.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyUrl | Self::UnsupportedFile { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_validation() {
        assert!(ProfileError::EmptyUrl.is_validation());
        assert!(!ProfileError::NotFound { uid: "x".to_string() }.is_validation());
    }
}

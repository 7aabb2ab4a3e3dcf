//! Backend gateway errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by any call into the backend service.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum GatewayError {
    /// The service could not be reached at all
    #[error("Failed to connect to the ErrorX Service: {0}")]
    Unreachable(String),

    /// The service answered with a non-zero envelope code
    #[error("Service returned code {code}: {message}")]
    Api {
        /// Envelope code reported by the service
        code: i32,
        /// Envelope message reported by the service
        message: String,
    },

    /// The response body could not be decoded
    #[error("Invalid service response: {0}")]
    InvalidResponse(String),

    /// The envelope was successful but carried no payload
    #[error("No {0} data in response")]
    MissingData(String),

    /// Domain-level rejection raised by the backend itself
    #[error("{0}")]
    Rejected(String),
}

impl GatewayError {
    /// Check if this is a transport failure rather than a backend answer.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

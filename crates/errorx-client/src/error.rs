//! Error types for the ErrorX service client.

use errorx_types::GatewayError;
use thiserror::Error;

/// Errors that can occur when talking to the ErrorX service.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The configured base URL could not be parsed.
    #[error("Invalid service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP request failed.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service answered with a non-zero envelope code.
    #[error("{message} (code {code})")]
    Api {
        /// Envelope code.
        code: i32,
        /// Envelope message.
        message: String,
    },

    /// Envelope carried no payload where one is required.
    #[error("No {0} data in response")]
    MissingData(&'static str),

    /// A path segment could not be placed in the request URL.
    #[error("Invalid request path: {0}")]
    InvalidPath(String),

    /// Response could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<ClientError> for GatewayError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Request(e) if e.is_connect() || e.is_timeout() => {
                Self::Unreachable(e.to_string())
            },
            ClientError::Request(e) if e.is_decode() => Self::InvalidResponse(e.to_string()),
            ClientError::Request(e) => Self::Unreachable(e.to_string()),
            ClientError::InvalidUrl(e) => Self::Unreachable(e.to_string()),
            ClientError::Api { code, message } => Self::Api { code, message },
            ClientError::MissingData(what) => Self::MissingData(what.to_string()),
            ClientError::InvalidResponse(msg) => Self::InvalidResponse(msg),
            err @ ClientError::InvalidPath(_) => Self::Rejected(err.to_string()),
        }
    }
}

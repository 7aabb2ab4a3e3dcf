//! HTTP client for the local ErrorX service.
//!
//! Every endpoint answers with the `{ code, msg, data }` envelope; a
//! non-zero `code` is surfaced as [`ClientError::Api`].

mod client;
mod error;
mod types;

pub use client::ServiceClient;
pub use error::ClientError;
pub use types::*;

//! License-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while handling license records.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum LicenseError {
    /// The entered key was empty after trimming
    #[error("Please enter a license key")]
    EmptyKey,

    /// The backend declared the key invalid
    #[error("Invalid license key")]
    InvalidKey,

    /// The start timestamp could not be parsed
    #[error("Invalid license start time: {value}")]
    InvalidStartTime {
        /// Raw value received from the service
        value: String,
    },
}

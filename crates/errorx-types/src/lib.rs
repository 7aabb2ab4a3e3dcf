//! # ErrorX Types
//!
//! Core types, models, and error definitions for the ErrorX client.
//!
//! - **`error`** - Typed error hierarchy for license, profile, and gateway failures
//! - **`models`** - Domain models (LicenseRecord, Profile, ProfileSet, proxy status, config)
//!
//! ## Architecture Role
//!
//! `errorx-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!                errorx-types (this crate)
//!                        │
//!            ┌───────────┴───────────┐
//!            ▼                       ▼
//!      errorx-client            errorx-core
//!            │                       │
//!            └───────────┬───────────┘
//!                        ▼
//!                    errorx-cli
//! ```

pub mod error;
pub mod models;

pub use error::{GatewayError, LicenseError, ProfileError, Result, TypedError};

pub use models::{
    ClientConfig, LicenseRecord, Notice, NoticeLevel, Profile, ProfileItem, ProfileKind,
    ProfileSet, ProxyPortStatus, ServerSummary, SessionCredentials, SubscriptionType,
    SystemSettings,
};

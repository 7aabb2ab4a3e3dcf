//! Domain models for the ErrorX client.

mod config;
mod license;
mod notice;
mod profile;
mod proxy;
mod session;

pub use config::ClientConfig;
pub use license::{parse_start_time, LicenseRecord, SubscriptionType};
pub use notice::{Notice, NoticeLevel};
pub use profile::{Profile, ProfileItem, ProfileKind, ProfileOption, ProfileSet, RuntimeLogs};
pub use proxy::{ProxyPortStatus, ServerEntry, ServerSummary, SystemSettings};
pub use session::SessionCredentials;

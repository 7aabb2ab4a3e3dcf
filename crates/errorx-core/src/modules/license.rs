//! Remaining-time arithmetic and license display helpers.
//!
//! All arithmetic is UTC. Local time only appears in
//! [`format_expiry_local`], which has no control-flow significance.

use chrono::{DateTime, Local, SubsecRound, TimeDelta, Utc};
use errorx_types::{LicenseRecord, SessionCredentials};
use serde::Serialize;

const NOT_AVAILABLE: &str = "N/A";

/// Time left on `record` at `now`, `None` when the plan length is unknown.
///
/// `now` is truncated to whole seconds to match the record's precision.
pub fn remaining_time(record: &LicenseRecord, now: DateTime<Utc>) -> Option<TimeDelta> {
    let expires_at = record.expires_at()?;
    Some(expires_at - now.trunc_subsecs(0))
}

pub fn is_expired(record: &LicenseRecord, now: DateTime<Utc>) -> bool {
    remaining_time(record, now).is_some_and(|r| r <= TimeDelta::zero())
}

/// `"{d}D {HH}H {MM}M {SS}S"`, `"Expired"`, or `"N/A"`.
pub fn format_remaining(record: &LicenseRecord, now: DateTime<Utc>) -> String {
    match remaining_time(record, now) {
        None => NOT_AVAILABLE.to_string(),
        Some(r) if r <= TimeDelta::zero() => "Expired".to_string(),
        Some(r) => {
            let total = r.num_seconds();
            let days = total / 86_400;
            let hours = (total % 86_400) / 3_600;
            let minutes = (total % 3_600) / 60;
            let seconds = total % 60;
            format!("{days}D {hours:02}H {minutes:02}M {seconds:02}S")
        },
    }
}

/// Expiry instant rendered in the local zone, or `"N/A"`.
pub fn format_expiry_local(record: &LicenseRecord) -> String {
    record.expires_at().map_or_else(
        || NOT_AVAILABLE.to_string(),
        |at| at.with_timezone(&Local).format("%Y/%m/%d %H:%M:%S %:z").to_string(),
    )
}

/// Everything a presenter shows about the active license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseSummary {
    pub license_key: String,
    pub masked_key: String,
    pub plan: String,
    pub platform: String,
    pub device_active: bool,
    pub remaining: String,
    pub expires: String,
}

impl LicenseSummary {
    pub fn build(record: &LicenseRecord, now: DateTime<Utc>) -> Self {
        let masked_key = SessionCredentials::authenticated(record.license_key.as_str()).masked_key();
        let platform = if record.allowed_platform.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            record.allowed_platform.clone()
        };
        Self {
            license_key: record.license_key.clone(),
            masked_key,
            plan: record.subscription_type.label().to_string(),
            platform,
            device_active: record.is_device_active,
            remaining: format_remaining(record, now),
            expires: format_expiry_local(record),
        }
    }
}

//! License record and subscription plans.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Subscription plan, keyed by the service's duration code.
///
/// Unrecognised codes are kept verbatim in `Unknown` so that remaining time
/// resolves to "N/A" instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionType {
    /// `2H` - two hour trial
    Trial2h,
    /// `1D`
    Day1,
    /// `7D`
    Week1,
    /// `30D`
    Month1,
    /// `90D`
    Month3,
    /// `180D`
    Month6,
    /// `365D`
    Year1,
    /// `3650D`
    Lifetime,
    /// Any code the client does not know about
    Unknown(String),
}

impl SubscriptionType {
    /// Wire code used by the service.
    pub fn code(&self) -> &str {
        match self {
            Self::Trial2h => "2H",
            Self::Day1 => "1D",
            Self::Week1 => "7D",
            Self::Month1 => "30D",
            Self::Month3 => "90D",
            Self::Month6 => "180D",
            Self::Year1 => "365D",
            Self::Lifetime => "3650D",
            Self::Unknown(code) => code,
        }
    }

    /// Label shown next to the license.
    pub fn label(&self) -> &str {
        match self {
            Self::Trial2h => "TRIAL",
            Self::Day1 => "1DAY",
            Self::Week1 => "WEEK",
            Self::Month1 => "1MONTH",
            Self::Month3 => "3MONTH",
            Self::Month6 => "6MONTH",
            Self::Year1 => "1YEAR",
            Self::Lifetime => "LIFETIME",
            Self::Unknown(code) => code,
        }
    }

    /// Plan length, `None` for unknown codes.
    pub fn duration(&self) -> Option<TimeDelta> {
        match self {
            Self::Trial2h => Some(TimeDelta::hours(2)),
            Self::Day1 => Some(TimeDelta::days(1)),
            Self::Week1 => Some(TimeDelta::days(7)),
            Self::Month1 => Some(TimeDelta::days(30)),
            Self::Month3 => Some(TimeDelta::days(90)),
            Self::Month6 => Some(TimeDelta::days(180)),
            Self::Year1 => Some(TimeDelta::days(365)),
            Self::Lifetime => Some(TimeDelta::days(3650)),
            Self::Unknown(_) => None,
        }
    }
}

impl From<String> for SubscriptionType {
    fn from(code: String) -> Self {
        match code.as_str() {
            "2H" => Self::Trial2h,
            "1D" => Self::Day1,
            "7D" => Self::Week1,
            "30D" => Self::Month1,
            "90D" => Self::Month3,
            "180D" => Self::Month6,
            "365D" => Self::Year1,
            "3650D" => Self::Lifetime,
            _ => Self::Unknown(code),
        }
    }
}

impl From<&str> for SubscriptionType {
    fn from(code: &str) -> Self {
        Self::from(code.to_string())
    }
}

impl From<SubscriptionType> for String {
    fn from(value: SubscriptionType) -> Self {
        value.code().to_string()
    }
}

impl std::fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// License as cached by the expiry monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// License key the session was opened with
    pub license_key: String,
    /// Subscription plan
    pub subscription_type: SubscriptionType,
    /// Activation instant, second precision, UTC
    pub start_time: DateTime<Utc>,
    /// Whether this desktop device is active on the license
    pub is_device_active: bool,
    /// Platform the license is bound to
    pub allowed_platform: String,
}

impl LicenseRecord {
    /// Instant the license stops being valid, `None` when the plan is unknown.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.subscription_type
            .duration()
            .and_then(|d| self.start_time.checked_add_signed(d))
    }
}

/// Parse the service's naive start timestamp as UTC.
///
/// The service sends `YYYY-MM-DDTHH:MM:SS` with an optional fractional part
/// and no zone suffix.
pub fn parse_start_time(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim().trim_end_matches('Z');
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc())
}

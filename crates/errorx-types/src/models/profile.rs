//! Profile and profile set models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of routing profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// Authored or dropped locally
    Local,
    /// Pulled from a subscription URL, refreshable
    Remote,
    /// Merge overlay applied during enhance
    Merge,
    /// Script overlay applied during enhance
    Script,
}

impl ProfileKind {
    /// Kinds listed to the user as selectable profiles.
    pub const fn is_user_facing(self) -> bool {
        matches!(self, Self::Local | Self::Remote)
    }
}

/// A named routing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Stable identity assigned by the backend
    pub uid: String,
    /// Profile kind
    #[serde(rename = "type")]
    pub kind: ProfileKind,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Subscription source for remote profiles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Last update time (unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<i64>,
}

/// Ordered profiles plus the single current pointer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSet {
    /// Uid of the current profile, if any
    #[serde(default)]
    pub current: Option<String>,
    /// Profiles in user-visible order
    #[serde(default)]
    pub items: Vec<Profile>,
}

impl ProfileSet {
    /// Drop a `current` pointer that no longer references a member.
    pub fn normalized(mut self) -> Self {
        let dangling = self
            .current
            .as_deref()
            .is_some_and(|uid| !self.items.iter().any(|p| p.uid == uid));
        if dangling {
            self.current = None;
        }
        self
    }

    pub fn get(&self, uid: &str) -> Option<&Profile> {
        self.items.iter().find(|p| p.uid == uid)
    }

    pub fn is_current(&self, uid: &str) -> bool {
        self.current.as_deref() == Some(uid)
    }

    /// Profiles the user can select (local and remote).
    pub fn user_items(&self) -> impl Iterator<Item = &Profile> {
        self.items.iter().filter(|p| p.kind.is_user_facing())
    }

    /// Uids of refreshable profiles, in order.
    pub fn remote_uids(&self) -> Vec<String> {
        self.user_items()
            .filter(|p| p.kind == ProfileKind::Remote)
            .map(|p| p.uid.clone())
            .collect()
    }

    /// Uids that are logically current; empty when nothing is selected.
    pub fn current_uids(&self) -> Vec<String> {
        self.current.iter().filter(|uid| !uid.is_empty()).cloned().collect()
    }

    pub fn order(&self) -> Vec<&str> {
        self.items.iter().map(|p| p.uid.as_str()).collect()
    }
}

/// Extra options attached to a new profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileOption {
    /// Fetch through the system proxy
    #[serde(default)]
    pub with_proxy: bool,
    /// Fetch through the client's own proxy
    #[serde(default)]
    pub self_proxy: bool,
}

/// Template for creating a profile with locally supplied content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileItem {
    #[serde(rename = "type")]
    pub kind: ProfileKind,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub option: ProfileOption,
}

impl ProfileItem {
    /// Local profile with the given name and no source URL.
    pub fn local(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            kind: ProfileKind::Local,
            name: name.into(),
            desc: desc.into(),
            url: String::new(),
            option: ProfileOption::default(),
        }
    }
}

/// Runtime log entries keyed by chain name, each entry `(level, message)`.
pub type RuntimeLogs = BTreeMap<String, Vec<(String, String)>>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile(uid: &str, kind: ProfileKind) -> Profile {
        Profile {
            uid: uid.to_string(),
            kind,
            name: uid.to_uppercase(),
            desc: None,
            url: None,
            updated: None,
        }
    }

    #[test]
    fn test_normalized_clears_dangling_current() {
        let set = ProfileSet {
            current: Some("gone".to_string()),
            items: vec![profile("a", ProfileKind::Local)],
        };
        assert_eq!(set.normalized().current, None);

        let set = ProfileSet {
            current: Some("a".to_string()),
            items: vec![profile("a", ProfileKind::Local)],
        };
        assert_eq!(set.normalized().current.as_deref(), Some("a"));
    }

    #[test]
    fn test_remote_uids_skip_overlays() {
        let set = ProfileSet {
            current: None,
            items: vec![
                profile("l1", ProfileKind::Local),
                profile("r1", ProfileKind::Remote),
                profile("m1", ProfileKind::Merge),
                profile("r2", ProfileKind::Remote),
                profile("s1", ProfileKind::Script),
            ],
        };
        assert_eq!(set.remote_uids(), vec!["r1", "r2"]);
        assert_eq!(set.user_items().count(), 3);
    }

    #[test]
    fn test_profile_wire_format() {
        let json = r#"{"current":"r1","items":[{"uid":"r1","type":"remote","name":"Sub","url":"https://x"}]}"#;
        let set: ProfileSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.items[0].kind, ProfileKind::Remote);
        assert_eq!(set.current_uids(), vec!["r1"]);
    }
}

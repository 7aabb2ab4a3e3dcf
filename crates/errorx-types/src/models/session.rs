//! Session credentials.

use serde::{Deserialize, Serialize};

/// Credentials held for the single active session.
///
/// Both fields are always written together; a session is either fully
/// present or absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredentials {
    pub is_authenticated: bool,
    pub license_key: String,
}

impl SessionCredentials {
    pub fn authenticated(license_key: impl Into<String>) -> Self {
        Self { is_authenticated: true, license_key: license_key.into() }
    }

    /// Key with everything but the last four characters masked.
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.license_key.chars().collect();
        let visible = chars.len().saturating_sub(4);
        chars
            .iter()
            .enumerate()
            .map(|(i, c)| if i < visible && *c != '-' { '•' } else { *c })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_key_keeps_separators_and_tail() {
        let creds = SessionCredentials::authenticated("ABCD-EFGH-1234");
        assert_eq!(creds.masked_key(), "••••-••••-1234");
    }
}

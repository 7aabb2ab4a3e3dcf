//! Local proxy server and system integration models.

use serde::{Deserialize, Serialize};

/// `(port, is_running)` pair as reported by the proxy status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyPortStatus(pub u16, pub bool);

impl ProxyPortStatus {
    pub const fn port(&self) -> u16 {
        self.0
    }

    pub const fn is_running(&self) -> bool {
        self.1
    }
}

/// Single upstream server entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub name: String,
    pub status: String,
}

/// Server pool overview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSummary {
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
    pub total_servers: i32,
    pub live_servers: i32,
    pub reserved_servers: i32,
}

/// System-level integration toggles owned by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSettings {
    #[serde(default)]
    pub enable_system_proxy: bool,
    #[serde(default)]
    pub enable_tun_mode: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_port_status_from_tuple_array() {
        let status: Vec<ProxyPortStatus> =
            serde_json::from_str("[[18010,true],[18011,false]]").unwrap();
        assert_eq!(status[0].port(), 18010);
        assert!(status[0].is_running());
        assert!(!status[1].is_running());
    }
}

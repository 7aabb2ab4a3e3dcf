//! Built-in default ErrorX profile.

use errorx_types::ProfileItem;
use std::fmt::Write;

pub const TEMPLATE_NAME: &str = "ErrorX";
const TEMPLATE_DESC: &str = "Default ErrorX configuration";

const SERVER_COUNT: u16 = 20;
const BASE_PORT: u16 = 18010;
const HEALTH_CHECK_URL: &str = "http://1.1.1.1/";
const HEALTH_CHECK_INTERVAL_SECS: u32 = 60;

const RULES: &[&str] = &[
    "PROCESS-NAME,errorx-service,DIRECT",
    "PROCESS-NAME,errorx-service.exe,DIRECT",
    "PROCESS-NAME,ErrorX,DIRECT",
    "PROCESS-NAME,ErrorX.exe,DIRECT",
    "PROCESS-NAME,\"ErrorX Service\",DIRECT",
    "PROCESS-NAME,ErrorX*,DIRECT",
    "DOMAIN-SUFFIX,google.com,ErrorX",
    "DOMAIN-SUFFIX,youtube.com,ErrorX",
    "DOMAIN-SUFFIX,facebook.com,ErrorX",
    "GEOIP,CN,DIRECT",
    "MATCH,ErrorX",
];

pub fn default_item() -> ProfileItem {
    ProfileItem::local(TEMPLATE_NAME, TEMPLATE_DESC)
}

/// YAML routing config pointing every server slot at the local proxy ports.
pub fn default_content() -> String {
    let mut yaml = String::from("proxies:\n");
    for i in 0..SERVER_COUNT {
        let _ = write!(
            yaml,
            "  - name: \"Server-{}\"\n    type: socks5\n    server: 127.0.0.1\n    port: {}\n",
            i + 1,
            BASE_PORT + i
        );
    }

    let _ = write!(
        yaml,
        "\nproxy-groups:\n  - name: \"{TEMPLATE_NAME}\"\n    type: load-balance\n    proxies:\n"
    );
    for i in 0..SERVER_COUNT {
        let _ = writeln!(yaml, "      - \"Server-{}\"", i + 1);
    }
    let _ = write!(
        yaml,
        "    url: {HEALTH_CHECK_URL}\n    interval: {HEALTH_CHECK_INTERVAL_SECS}\n    strategy: round-robin\n"
    );

    yaml.push_str("\nrules:\n");
    for rule in RULES {
        let _ = writeln!(yaml, "  - {rule}");
    }
    yaml
}

#[cfg(test)]
mod tests {
    use super::*;
    use errorx_types::ProfileKind;

    #[test]
    fn test_template_covers_port_range() {
        let yaml = default_content();
        assert!(yaml.starts_with("proxies:\n  - name: \"Server-1\"\n"));
        assert!(yaml.contains("port: 18010\n"));
        assert!(yaml.contains("port: 18029\n"));
        assert!(!yaml.contains("port: 18030"));
        assert_eq!(yaml.matches("type: socks5").count(), 20);
        assert!(yaml.contains("      - \"Server-20\"\n    url: http://1.1.1.1/\n"));
        assert!(yaml.ends_with("  - MATCH,ErrorX\n"));
    }

    #[test]
    fn test_template_item_is_local() {
        let item = default_item();
        assert_eq!(item.kind, ProfileKind::Local);
        assert_eq!(item.name, "ErrorX");
        assert!(item.url.is_empty());
    }
}

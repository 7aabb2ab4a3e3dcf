//! Creating local profiles from dropped YAML files.

use errorx_types::{Notice, ProfileError, ProfileItem};
use std::path::Path;

use super::orchestrator::ProfileOrchestrator;
use super::Outcome;
use crate::error::CoreError;

const UNSUPPORTED_NOTICE: &str = "Only YAML Files Supported";
const FALLBACK_NAME: &str = "New Profile";

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

impl ProfileOrchestrator {
    /// Create one local profile per YAML file, named after the file.
    /// Other files are skipped with a notice.
    pub async fn import_files<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(paths.len());

        for path in paths {
            let path = path.as_ref();
            if !is_yaml(path) {
                self.notify(Notice::error(UNSUPPORTED_NOTICE));
                let err = ProfileError::UnsupportedFile { path: path.display().to_string() };
                outcomes.push(Outcome::Rejected(err.to_string()));
                continue;
            }

            let content = match tokio::fs::read_to_string(path).await {
                Ok(content) => content,
                Err(e) => {
                    let err = ProfileError::ReadFailed {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    };
                    outcomes.push(self.surface(&CoreError::from(err), None));
                    continue;
                },
            };

            let name = path
                .file_name()
                .map_or_else(|| FALLBACK_NAME.to_string(), |n| n.to_string_lossy().into_owned());
            let item = ProfileItem::local(name, "");

            match self.store().gateway().create_profile(&item, Some(&content)).await {
                Ok(()) => {
                    tracing::info!("[Profiles] Created {} from {}", item.name, path.display());
                    self.store().refresh_profiles_quietly().await;
                    outcomes.push(Outcome::Applied);
                },
                Err(e) => outcomes.push(self.surface(&CoreError::from(e), None)),
            }
        }
        outcomes
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::modules::events::{drain, notices, EventBus};
    use crate::testing::MockGateway;
    use crate::utils::SingleFlight;
    use errorx_types::{ClientConfig, ProfileKind};
    use std::sync::Arc;

    #[test]
    fn test_yaml_detection() {
        assert!(is_yaml(Path::new("/tmp/a.yaml")));
        assert!(is_yaml(Path::new("C:\\cfg\\B.YML")));
        assert!(!is_yaml(Path::new("/tmp/a.json")));
        assert!(!is_yaml(Path::new("/tmp/yaml")));
    }

    #[tokio::test]
    async fn test_import_files_skips_non_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("office.yaml");
        std::fs::write(&good, "proxies: []\n").unwrap();
        let bad = dir.path().join("notes.txt");
        std::fs::write(&bad, "hello").unwrap();

        let mock = Arc::new(MockGateway::new());
        let events = EventBus::new();
        let mut rx = events.subscribe();
        let orch = ProfileOrchestrator::new(
            mock.clone(),
            events,
            SingleFlight::new(),
            &ClientConfig::default(),
        );

        let outcomes = orch.import_files(&[bad, good]).await;
        assert!(matches!(outcomes[0], Outcome::Rejected(_)));
        assert_eq!(outcomes[1], Outcome::Applied);

        let created = mock.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].0.name, "office.yaml");
        assert_eq!(created[0].0.kind, ProfileKind::Local);
        assert_eq!(created[0].1.as_deref(), Some("proxies: []\n"));
        assert_eq!(orch.profiles().items.len(), 1);

        let events = drain(&mut rx);
        assert_eq!(notices(&events)[0].message, UNSUPPORTED_NOTICE);
    }

    #[tokio::test]
    async fn test_missing_file_is_surfaced() {
        let mock = Arc::new(MockGateway::new());
        let orch = ProfileOrchestrator::new(
            mock.clone(),
            EventBus::new(),
            SingleFlight::new(),
            &ClientConfig::default(),
        );
        let outcomes = orch.import_files(&["/definitely/not/here.yaml"]).await;
        assert!(matches!(&outcomes[0], Outcome::Failed(msg) if msg.contains("here.yaml")));
        assert!(mock.created().is_empty());
    }
}

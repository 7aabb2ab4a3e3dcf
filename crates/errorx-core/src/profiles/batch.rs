//! Batch Update Scheduler
//!
//! Fans out refreshes across remote profiles. The busy cache guarantees a
//! profile has at most one refresh in flight; completions share one
//! throttled re-fetch of the profile set.

use errorx_types::Notice;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::store::ProfileStore;
use super::{Outcome, SkipReason, UPDATE_ALL_KEY};
use crate::utils::{BusyCache, SingleFlight, Throttle};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Uids an update was issued for, in profile order.
    pub dispatched: Vec<String>,
    pub succeeded: Vec<String>,
    /// `(uid, error message)` per failed update.
    pub failed: Vec<(String, String)>,
    /// Remote uids left alone because they were already busy.
    pub skipped_busy: Vec<String>,
    /// Another batch was still running; nothing was done.
    pub rejected: bool,
}

pub struct BatchUpdateScheduler {
    store: Arc<ProfileStore>,
    busy: BusyCache,
    flights: SingleFlight,
    refresh_window: Duration,
}

impl BatchUpdateScheduler {
    pub fn new(store: Arc<ProfileStore>, flights: SingleFlight, refresh_window: Duration) -> Self {
        Self { store, busy: BusyCache::new(), flights, refresh_window }
    }

    pub fn busy(&self) -> &BusyCache {
        &self.busy
    }

    /// Refresh every remote profile that is not already busy.
    ///
    /// Resolves once every issued update has settled. One profile failing
    /// never fails the batch.
    pub async fn update_all(&self) -> BatchReport {
        let Some(_flight) = self.flights.try_acquire(UPDATE_ALL_KEY) else {
            tracing::debug!("[BatchUpdate] Batch already running");
            return BatchReport { rejected: true, ..BatchReport::default() };
        };

        let remote = self.store.snapshot().remote_uids();
        let claims = self.busy.claim_all(remote.iter().cloned());
        let dispatched: Vec<String> = claims.iter().map(|c| c.uid().to_string()).collect();
        let skipped_busy: Vec<String> =
            remote.into_iter().filter(|uid| !dispatched.contains(uid)).collect();

        if dispatched.is_empty() {
            tracing::info!("[BatchUpdate] Nothing to update ({} busy)", skipped_busy.len());
            return BatchReport { skipped_busy, ..BatchReport::default() };
        }
        tracing::info!(
            "[BatchUpdate] Updating {} remote profiles ({} busy)",
            dispatched.len(),
            skipped_busy.len()
        );

        let refresh = self.throttled_refresh();
        let gateway = Arc::clone(self.store.gateway());
        let updates = claims.into_iter().map(|claim| {
            let gateway = Arc::clone(&gateway);
            let refresh = refresh.clone();
            async move {
                let uid = claim.uid().to_string();
                let result = gateway.update_profile(&uid).await;
                if result.is_ok() {
                    refresh.call();
                }
                drop(claim);
                (uid, result)
            }
        });

        let mut report = BatchReport { dispatched, skipped_busy, ..BatchReport::default() };
        for (uid, result) in join_all(updates).await {
            match result {
                Ok(()) => report.succeeded.push(uid),
                Err(e) => {
                    tracing::warn!("[BatchUpdate] Failed to update {}: {}", uid, e);
                    report.failed.push((uid, e.to_string()));
                },
            }
        }

        tracing::info!(
            "[BatchUpdate] Done: {} updated, {} failed",
            report.succeeded.len(),
            report.failed.len()
        );
        report
    }

    /// Refresh one profile unless it is already busy.
    pub async fn update_one(&self, uid: &str) -> Outcome {
        let Some(_claim) = self.busy.try_claim(uid) else {
            tracing::debug!("[BatchUpdate] {} is already updating", uid);
            return Outcome::Skipped(SkipReason::Busy);
        };

        match self.store.gateway().update_profile(uid).await {
            Ok(()) => {
                self.store.refresh_profiles_quietly().await;
                Outcome::Applied
            },
            Err(e) => {
                let message = e.to_string();
                tracing::error!("[BatchUpdate] Failed to update {}: {}", uid, message);
                self.store.events().notify(Notice::error(message.as_str()));
                Outcome::Failed(message)
            },
        }
    }

    fn throttled_refresh(&self) -> Throttle {
        let store = Arc::clone(&self.store);
        Throttle::new(self.refresh_window, move || {
            let store = Arc::clone(&store);
            async move { store.refresh_profiles_quietly().await }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::modules::events::EventBus;
    use crate::testing::{profile, MockGateway};
    use errorx_types::{GatewayError, ProfileKind, ProfileSet};

    fn remote_set(n: usize) -> ProfileSet {
        let mut items = vec![profile("local", ProfileKind::Local), profile("merge", ProfileKind::Merge)];
        items.extend((1..=n).map(|i| profile(&format!("r{i}"), ProfileKind::Remote)));
        ProfileSet { current: Some("local".to_string()), items }
    }

    async fn scheduler(mock: &Arc<MockGateway>) -> BatchUpdateScheduler {
        let store = Arc::new(ProfileStore::new(mock.clone(), EventBus::new()));
        store.refresh_profiles().await.unwrap();
        mock.clear_calls();
        BatchUpdateScheduler::new(store, SingleFlight::new(), Duration::from_secs(2))
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_remote_profiles_are_updated() {
        let mock = Arc::new(MockGateway::new().with_profiles(remote_set(3)));
        let batch = scheduler(&mock).await;

        let report = batch.update_all().await;
        assert_eq!(report.dispatched, vec!["r1", "r2", "r3"]);
        assert_eq!(report.succeeded.len(), 3);
        assert!(batch.busy().busy_uids().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_fail_batch() {
        let mock = Arc::new(MockGateway::new().with_profiles(remote_set(3)));
        mock.fail_uid("update_profile", "r2", GatewayError::Rejected("timeout".into()));
        let batch = scheduler(&mock).await;

        let report = batch.update_all().await;
        assert_eq!(report.succeeded, vec!["r1", "r3"]);
        assert_eq!(report.failed, vec![("r2".to_string(), "timeout".to_string())]);
        assert!(!batch.busy().is_busy("r2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_profile_is_skipped() {
        let mock = Arc::new(MockGateway::new().with_profiles(remote_set(3)));
        mock.delay("update_profile", Duration::from_millis(500));
        let batch = scheduler(&mock).await;

        let (single, report) = tokio::join!(batch.update_one("r2"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            batch.update_all().await
        });
        assert_eq!(single, Outcome::Applied);
        assert_eq!(report.dispatched, vec!["r1", "r3"]);
        assert_eq!(report.skipped_busy, vec!["r2"]);
        assert_eq!(mock.count("update_profile"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completions_collapse_into_few_refreshes() {
        let mock = Arc::new(MockGateway::new().with_profiles(remote_set(8)));
        mock.delay("update_profile", Duration::from_millis(100));
        let batch = scheduler(&mock).await;

        batch.update_all().await;
        tokio::time::sleep(Duration::from_secs(3)).await;
        // leading + trailing edge of a single window
        assert_eq!(mock.count("get_profiles"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_one_failure_is_surfaced() {
        let mock = Arc::new(MockGateway::new().with_profiles(remote_set(1)));
        mock.fail("update_profile", GatewayError::Rejected("bad url".into()));
        let batch = scheduler(&mock).await;

        assert_eq!(batch.update_one("r1").await, Outcome::Failed("bad url".into()));
        assert!(!batch.busy().is_busy("r1"));
        assert_eq!(mock.count("get_profiles"), 0);
    }
}

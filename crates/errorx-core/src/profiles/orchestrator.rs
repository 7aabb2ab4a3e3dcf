//! Profile Activation Orchestrator
//!
//! Decides when and in what order profile mutations reach the backend.
//! Every mutating call is followed by a full re-fetch through
//! [`ProfileStore`]; local state is never patched optimistically.
//!
//! `select` always runs: set current → close connections → activate selected.

use errorx_types::{ClientConfig, Notice, ProfileError, ProfileItem, ProfileSet};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::batch::{BatchReport, BatchUpdateScheduler};
use super::store::ProfileStore;
use super::template;
use super::{
    Outcome, SkipReason, DELETE_KEY, ENHANCE_ERROR_MS, ENHANCE_KEY, IMPORT_KEY, SELECT_KEY,
    SWITCH_ERROR_MS, SWITCH_SUCCESS_MS,
};
use crate::error::{CoreError, CoreResult};
use crate::modules::events::{ClientEvent, EventBus};
use crate::modules::gateway::BackendGateway;
use crate::utils::SingleFlight;

type ActivatingSet = Arc<Mutex<BTreeSet<String>>>;

pub struct ProfileOrchestrator {
    store: Arc<ProfileStore>,
    flights: SingleFlight,
    activating: ActivatingSet,
    debounce: Duration,
    import_draft: Mutex<String>,
    batch: BatchUpdateScheduler,
}

impl ProfileOrchestrator {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        events: EventBus,
        flights: SingleFlight,
        config: &ClientConfig,
    ) -> Self {
        let store = Arc::new(ProfileStore::new(gateway, events));
        let batch = BatchUpdateScheduler::new(
            Arc::clone(&store),
            flights.clone(),
            Duration::from_millis(config.refresh_throttle_ms),
        );
        Self {
            store,
            flights,
            activating: Arc::new(Mutex::new(BTreeSet::new())),
            debounce: Duration::from_millis(config.activation_debounce_ms),
            import_draft: Mutex::new(String::new()),
            batch,
        }
    }

    pub fn store(&self) -> &Arc<ProfileStore> {
        &self.store
    }

    pub fn batch(&self) -> &BatchUpdateScheduler {
        &self.batch
    }

    pub fn profiles(&self) -> ProfileSet {
        self.store.snapshot()
    }

    /// Uids currently shown as activating. Cosmetic only.
    pub fn activating(&self) -> Vec<String> {
        self.activating.lock().iter().cloned().collect()
    }

    fn gateway(&self) -> &Arc<dyn BackendGateway> {
        self.store.gateway()
    }

    fn events(&self) -> &EventBus {
        self.store.events()
    }

    pub async fn refresh(&self) -> CoreResult<ProfileSet> {
        let set = self.store.refresh_profiles().await?;
        self.store.refresh_logs_quietly().await;
        Ok(set)
    }

    // ===== Activation =====

    /// Make `uid` current. No-op when it already is, unless `force`.
    ///
    /// Membership is not checked locally; an unknown uid is rejected by the
    /// backend and surfaced like any other failure.
    pub async fn select(&self, uid: &str, force: bool) -> Outcome {
        let Some(_flight) = self.flights.try_acquire(SELECT_KEY) else {
            tracing::debug!("[Profiles] Switch in progress, ignoring select of {}", uid);
            return Outcome::Skipped(SkipReason::InFlight);
        };
        if !force && self.store.is_current(uid) {
            return Outcome::Skipped(SkipReason::Unchanged);
        }
        self.activate(uid, force).await
    }

    /// Activation requested from elsewhere in the app (navigation hand-off).
    /// Re-fetches first and never notifies on success.
    pub async fn activate_requested(&self, uid: &str) -> Outcome {
        self.store.refresh_profiles_quietly().await;
        self.activate(uid, false).await
    }

    async fn activate(&self, uid: &str, notify_success: bool) -> Outcome {
        let _scope = self.debounced_activating(uid);
        tracing::info!("[Profiles] Switching to {}", uid);

        let result: CoreResult<bool> = async {
            let changed = self.gateway().patch_current(uid).await?;
            self.store.refresh_profiles_quietly().await;
            self.store.refresh_logs_quietly().await;
            if let Err(e) = self.gateway().close_all_connections().await {
                tracing::warn!("[Profiles] Failed to close connections: {}", e);
            }
            self.gateway().activate_selected().await?;
            Ok(changed)
        }
        .await;

        match result {
            Ok(changed) => {
                if notify_success && changed {
                    self.events()
                        .notify(Notice::success("Profile Switched").with_duration(SWITCH_SUCCESS_MS));
                }
                Outcome::Applied
            },
            Err(e) => self.surface(&e, Some(SWITCH_ERROR_MS)),
        }
    }

    /// Ask the backend to re-derive routing state from the whole set.
    pub async fn enhance(&self, notify_success: bool) -> Outcome {
        let Some(_flight) = self.flights.try_acquire(ENHANCE_KEY) else {
            tracing::debug!("[Profiles] Enhance already running");
            return Outcome::Skipped(SkipReason::InFlight);
        };
        let _scope = self.mark_activating(self.store.snapshot().current_uids());

        match self.gateway().enhance_profiles().await {
            Ok(()) => {
                self.store.refresh_logs_quietly().await;
                if notify_success {
                    self.events()
                        .notify(Notice::success("Profile Reactivated").with_duration(SWITCH_SUCCESS_MS));
                }
                Outcome::Applied
            },
            Err(e) => self.surface(&CoreError::from(e), Some(ENHANCE_ERROR_MS)),
        }
    }

    // ===== Mutations =====

    /// Delete `uid`. Only the delete call itself can fail the operation;
    /// deleting the current profile always re-derives routing state, with
    /// the local `current` already cleared.
    pub async fn delete(&self, uid: &str) -> Outcome {
        let Some(_flight) = self.flights.try_acquire(DELETE_KEY) else {
            return Outcome::Skipped(SkipReason::InFlight);
        };

        let snapshot = self.store.snapshot();
        let was_current = snapshot.is_current(uid);
        let mut marked = if was_current { snapshot.current_uids() } else { Vec::new() };
        marked.push(uid.to_string());
        let _scope = self.mark_activating(marked);

        if let Err(e) = self.gateway().delete_profile(uid).await {
            return self.surface(&CoreError::from(e), None);
        }
        tracing::info!("[Profiles] Deleted {}", uid);

        self.store.refresh_profiles_quietly().await;
        self.store.refresh_logs_quietly().await;

        if was_current {
            self.store.forget_current(uid);
            self.enhance(false).await;
        }
        Outcome::Applied
    }

    /// Move `active` to the position of `over`.
    pub async fn reorder(&self, active: &str, over: &str) -> Outcome {
        if active == over {
            return Outcome::Skipped(SkipReason::Unchanged);
        }

        let result: CoreResult<()> = async {
            self.gateway().reorder_profile(active, over).await?;
            self.store.refresh_profiles().await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => Outcome::Applied,
            Err(e) => self.surface(&e, None),
        }
    }

    /// Import a remote profile, then fold it into routing state whether or
    /// not it became current.
    pub async fn import(&self, url: &str) -> Outcome {
        let url = url.trim();
        if url.is_empty() {
            return Outcome::Rejected(ProfileError::EmptyUrl.to_string());
        }
        let Some(_flight) = self.flights.try_acquire(IMPORT_KEY) else {
            return Outcome::Skipped(SkipReason::InFlight);
        };

        if let Err(e) = self.gateway().import_profile(url).await {
            return self.surface(&CoreError::from(e), None);
        }
        tracing::info!("[Profiles] Imported {}", url);
        self.events().notify(Notice::success("Profile Imported Successfully"));

        self.store.refresh_profiles_quietly().await;
        self.enhance(false).await;
        Outcome::Applied
    }

    pub fn set_import_url(&self, url: &str) {
        *self.import_draft.lock() = url.to_string();
    }

    pub fn import_url(&self) -> String {
        self.import_draft.lock().clone()
    }

    /// Import is offered only with a non-empty URL and no import running.
    pub fn can_import(&self) -> bool {
        !self.import_draft.lock().trim().is_empty() && !self.flights.is_in_flight(IMPORT_KEY)
    }

    /// Import the drafted URL and clear the draft on success.
    pub async fn submit_import(&self) -> Outcome {
        let url = self.import_url();
        let outcome = self.import(&url).await;
        if outcome.is_applied() {
            self.import_draft.lock().clear();
        }
        outcome
    }

    /// Like [`import`](Self::import) with locally supplied content.
    pub async fn create_from_template(&self, item: &ProfileItem, content: &str) -> Outcome {
        if let Err(e) = self.gateway().create_profile(item, Some(content)).await {
            return self.surface(&CoreError::from(e), None);
        }
        tracing::info!("[Profiles] Created profile {}", item.name);

        self.store.refresh_profiles_quietly().await;
        self.enhance(false).await;
        Outcome::Applied
    }

    pub async fn create_default(&self) -> Outcome {
        let outcome =
            self.create_from_template(&template::default_item(), &template::default_content()).await;
        if outcome.is_applied() {
            self.events().notify(Notice::success("ErrorX Config Applied Successfully"));
        }
        outcome
    }

    // ===== Refresh =====

    pub async fn update_one(&self, uid: &str) -> Outcome {
        self.batch.update_one(uid).await
    }

    pub async fn update_all(&self) -> BatchReport {
        self.batch.update_all().await
    }

    // ===== Helpers =====

    pub(super) fn surface(&self, err: &CoreError, duration_ms: Option<u64>) -> Outcome {
        let message = err.to_string();
        tracing::error!("[Profiles] {}", message);
        let notice = match duration_ms {
            Some(ms) => Notice::error(message.as_str()).with_duration(ms),
            None => Notice::error(message.as_str()),
        };
        self.events().notify(notice);
        Outcome::Failed(message)
    }

    pub(super) fn notify(&self, notice: Notice) {
        self.events().notify(notice);
    }

    fn mark_activating(&self, uids: Vec<String>) -> ActivatingScope {
        {
            let mut set = self.activating.lock();
            *set = uids.into_iter().collect();
        }
        publish_activating(&self.activating, self.events());
        ActivatingScope {
            set: Arc::clone(&self.activating),
            events: self.events().clone(),
            pending: None,
        }
    }

    /// Mark `uid` activating only if the switch outlives the debounce.
    fn debounced_activating(&self, uid: &str) -> ActivatingScope {
        let set = Arc::clone(&self.activating);
        let events = self.events().clone();
        let delay = self.debounce;
        let uid = uid.to_string();

        let pending = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            set.lock().insert(uid);
            publish_activating(&set, &events);
        });

        ActivatingScope {
            set: Arc::clone(&self.activating),
            events: self.events().clone(),
            pending: Some(pending),
        }
    }
}

fn publish_activating(set: &ActivatingSet, events: &EventBus) {
    let uids: Vec<String> = set.lock().iter().cloned().collect();
    events.publish(ClientEvent::ActivatingChanged(uids));
}

/// Clears the activating set when the operation ends, on every exit path.
struct ActivatingScope {
    set: ActivatingSet,
    events: EventBus,
    pending: Option<JoinHandle<()>>,
}

impl Drop for ActivatingScope {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        self.set.lock().clear();
        publish_activating(&self.set, &self.events);
    }
}

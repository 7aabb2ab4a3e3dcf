//! Per-profile busy flags for refresh work.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Mapping from profile uid to a busy flag. Absence means "not busy".
#[derive(Debug, Clone, Default)]
pub struct BusyCache {
    entries: Arc<Mutex<HashMap<String, bool>>>,
}

impl BusyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim every uid that is not already busy, in one critical section.
    ///
    /// Filtering and marking happen under the same lock, so two overlapping
    /// callers can never both claim the same uid.
    pub fn claim_all<I, S>(&self, uids: I) -> Vec<BusyGuard>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = self.entries.lock();
        let mut claimed = Vec::new();
        for uid in uids {
            let uid = uid.into();
            if entries.get(&uid).copied().unwrap_or(false) {
                continue;
            }
            entries.insert(uid.clone(), true);
            claimed.push(BusyGuard { entries: Arc::clone(&self.entries), uid });
        }
        claimed
    }

    pub fn try_claim(&self, uid: &str) -> Option<BusyGuard> {
        self.claim_all([uid]).pop()
    }

    pub fn is_busy(&self, uid: &str) -> bool {
        self.entries.lock().get(uid).copied().unwrap_or(false)
    }

    /// Uids currently marked busy, sorted.
    pub fn busy_uids(&self) -> Vec<String> {
        let mut uids: Vec<String> = self
            .entries
            .lock()
            .iter()
            .filter(|(_, busy)| **busy)
            .map(|(uid, _)| uid.clone())
            .collect();
        uids.sort();
        uids
    }
}

/// Clears the busy flag of one uid when dropped.
#[derive(Debug)]
pub struct BusyGuard {
    entries: Arc<Mutex<HashMap<String, bool>>>,
    uid: String,
}

impl BusyGuard {
    pub fn uid(&self) -> &str {
        &self.uid
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.entries.lock().remove(&self.uid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_all_skips_busy_entries() {
        let cache = BusyCache::new();
        let first = cache.claim_all(["r1", "r2"]);
        assert_eq!(first.len(), 2);

        let second = cache.claim_all(["r1", "r2", "r3"]);
        let uids: Vec<&str> = second.iter().map(BusyGuard::uid).collect();
        assert_eq!(uids, vec!["r3"]);
        assert_eq!(cache.busy_uids(), vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn test_drop_clears_flag() {
        let cache = BusyCache::new();
        let guard = cache.try_claim("r1");
        assert!(guard.is_some());
        assert!(cache.is_busy("r1"));
        assert!(cache.try_claim("r1").is_none());

        drop(guard);
        assert!(!cache.is_busy("r1"));
        assert!(cache.try_claim("r1").is_some());
    }

    #[test]
    fn test_duplicate_uids_in_one_call_claimed_once() {
        let cache = BusyCache::new();
        let claimed = cache.claim_all(["r1", "r1"]);
        assert_eq!(claimed.len(), 1);
    }
}

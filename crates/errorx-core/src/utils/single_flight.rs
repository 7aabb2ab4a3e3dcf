//! RAII single-flight guard keyed by operation name.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};

/// Set of operation keys that currently have an execution in flight.
///
/// Cloning shares the underlying set, so every clone guards the same keys.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    in_flight: Arc<DashMap<String, ()>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the slot for `key`. Returns `None` while another guard for
    /// the same key is alive.
    pub fn try_acquire(&self, key: &str) -> Option<FlightGuard> {
        match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(FlightGuard { in_flight: Arc::clone(&self.in_flight), key: key.to_string() })
            },
        }
    }

    /// Like [`try_acquire`](Self::try_acquire) but rejects with
    /// [`CoreError::InFlight`].
    pub fn acquire(&self, key: &str) -> CoreResult<FlightGuard> {
        self.try_acquire(key).ok_or_else(|| CoreError::in_flight(key))
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight.contains_key(key)
    }
}

/// Releases its key on drop, on every exit path including panics and
/// cancelled futures.
#[derive(Debug)]
pub struct FlightGuard {
    in_flight: Arc<DashMap<String, ()>>,
    key: String,
}

impl FlightGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}

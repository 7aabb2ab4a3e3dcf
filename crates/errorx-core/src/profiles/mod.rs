//! Profile activation orchestration and batch refresh.

pub mod batch;
mod files;
pub mod orchestrator;
pub mod store;
pub mod template;

pub use batch::{BatchReport, BatchUpdateScheduler};
pub use orchestrator::ProfileOrchestrator;
pub use store::ProfileStore;

use serde::Serialize;

// Single-flight keys, one per action type.
pub const SELECT_KEY: &str = "select";
pub const ENHANCE_KEY: &str = "enhance";
pub const DELETE_KEY: &str = "delete";
pub const IMPORT_KEY: &str = "import";
pub const UPDATE_ALL_KEY: &str = "update_all";

// Notice display durations (ms).
pub const SWITCH_SUCCESS_MS: u64 = 1000;
pub const SWITCH_ERROR_MS: u64 = 4000;
pub const ENHANCE_ERROR_MS: u64 = 3000;

/// Why an operation made no backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Nothing to change (already current, reorder onto itself).
    Unchanged,
    /// Same action type already running.
    InFlight,
    /// Profile is already being refreshed.
    Busy,
}

/// Result of an orchestrator operation. Failures have already been
/// surfaced as notices by the time this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    Skipped(SkipReason),
    /// Input rejected before any backend call.
    Rejected(String),
    /// Backend call failed with this message.
    Failed(String),
}

impl Outcome {
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

//! # ErrorX Core
//!
//! Session, license and profile orchestration for the ErrorX client.
//!
//! ## Layout
//!
//! ```text
//! errorx-core/src/
//! ├── context.rs          # ClientContext: wires every component below
//! ├── modules/
//! │   ├── gateway.rs      # BackendGateway trait (the only backend seam)
//! │   ├── http_gateway.rs # BackendGateway over errorx-client
//! │   ├── events.rs       # Broadcast bus for notices and navigation
//! │   ├── session.rs      # Credentials holder
//! │   ├── login.rs        # License key gate
//! │   ├── license.rs      # Remaining-time math and formatting
//! │   ├── monitor.rs      # Expiry driver
//! │   ├── shutdown.rs     # Expiry teardown sequence
//! │   ├── proxy_panel.rs  # Local proxy status and control
//! │   ├── config.rs       # client_config.json persistence
//! │   └── logger.rs       # tracing subscriber setup
//! ├── profiles/
//! │   ├── orchestrator.rs # select, enhance, delete, reorder, import, create
//! │   ├── batch.rs        # Bounded concurrent remote updates
//! │   ├── store.rs        # Cached ProfileSet and runtime logs
//! │   └── template.rs     # Built-in default profile
//! └── utils/              # SingleFlight, BusyCache, Throttle
//! ```
//!
//! Every backend call goes through [`BackendGateway`]; the HTTP implementation
//! is one option and [`testing::MockGateway`] is another.

#![allow(
    clippy::significant_drop_tightening,
    reason = "Lock guards in async code require careful lifetime management"
)]
#![allow(clippy::redundant_else, reason = "Explicit else blocks improve readability in complex control flow")]
#![allow(clippy::map_err_ignore, reason = "Error context is provided in the replacement message")]
// Test-only lints: allow panic!, println!, etc. in test code
#![cfg_attr(
    test,
    allow(clippy::panic, clippy::print_stdout, clippy::needless_collect, clippy::assertions_on_result_states)
)]

pub mod context;
pub mod error;
pub mod modules;
pub mod profiles;
#[doc(hidden)]
pub mod testing;
pub mod utils;

// Re-export commonly used types
pub use context::{ClientContext, SessionHandles};
pub use error::{CoreError, CoreResult};
pub use modules::events::{ClientEvent, EventBus};
pub use modules::gateway::BackendGateway;
pub use modules::http_gateway::HttpGateway;
pub use modules::license::LicenseSummary;
pub use modules::monitor::{LicenseMonitor, MonitorState, TickOutcome};
pub use modules::shutdown::{ShutdownReport, StepStatus};
pub use profiles::{BatchReport, Outcome, ProfileOrchestrator, SkipReason};

//! Concurrency primitives shared by the orchestrators.

pub mod busy_cache;
pub mod single_flight;
pub mod throttle;

pub use busy_cache::{BusyCache, BusyGuard};
pub use single_flight::{FlightGuard, SingleFlight};
pub use throttle::Throttle;

//! Session, license, proxy and configuration modules.

pub mod config;
pub mod events;
pub mod gateway;
pub mod http_gateway;
pub mod license;
pub mod logger;
pub mod login;
pub mod monitor;
pub mod proxy_panel;
pub mod session;
pub mod shutdown;

//! Counterparty App
//!
//! Terminal front end for the counterparty registry:
//! - `AppConfig` layered from defaults, TOML, environment and flags
//! - `logging::init` for the tracing subscriber
//! - `view` text rendering of the header, table, form and indicator
//! - `commands` handlers behind the `cpty` binary

#![warn(unreachable_pub)]

// Core modules
pub mod commands;
pub mod config;
pub mod logging;
pub mod view;

// Re-exports for convenience
pub use commands::CommandError;
pub use config::{AppConfig, ConfigError, LogConfig};
pub use logging::LoggingError;

use cpty_client::{CounterpartyService, ReqwestTransport};
use std::sync::Arc;

/// Service over the real HTTP transport
#[must_use]
pub fn build_service(config: &AppConfig) -> CounterpartyService {
    CounterpartyService::new(config.client.clone(), Arc::new(ReqwestTransport::new()))
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

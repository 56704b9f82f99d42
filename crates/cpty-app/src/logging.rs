//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence over the configured filter. Output goes to
//! stderr so command output on stdout stays clean.

use crate::config::LogConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Subscriber could not be installed
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Filter directive does not parse
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Configured directive
        filter: String,
        /// Parser message
        message: String,
    },

    /// A global subscriber is already set
    #[error("tracing subscriber already initialized")]
    AlreadyInitialized,
}

/// Build the filter from `RUST_LOG` or the configured directive
///
/// # Errors
/// `LoggingError::Filter` when the configured directive is malformed
pub fn filter_for(config: &LogConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|e| LoggingError::Filter {
        filter: config.filter.clone(),
        message: e.to_string(),
    })
}

/// Install the global subscriber
///
/// # Errors
/// Filter parse failure, or a subscriber already installed
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = filter_for(config)?;
    let result = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|_| LoggingError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_directive_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LogConfig {
            filter: "cpty=notalevel".to_string(),
            json: false,
        };
        assert!(matches!(filter_for(&config), Err(LoggingError::Filter { .. })));
    }

    #[test]
    fn second_init_reports_already_initialized() {
        let config = LogConfig::default();
        let first = init(&config);
        let second = init(&config);
        // Another test in this binary may have won the first install
        assert!(first.is_ok() || matches!(first, Err(LoggingError::AlreadyInitialized)));
        assert!(matches!(second, Err(LoggingError::AlreadyInitialized)));
    }
}

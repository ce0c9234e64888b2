//! Logging setup for hosts embedding the notifier.
//!
//! `RUST_LOG` wins when set, and a malformed value is an error rather than
//! being ignored; otherwise the level from the `[logging]` section applies. Connection debugging needs `debug` (raw traffic and
//! lifecycle) or `trace` (parsed stanzas) to produce output.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Build the filter used by [`init`].
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_from(rust_log.as_deref(), config)
}

fn filter_from(
    rust_log: Option<&str>,
    config: &LoggingConfig,
) -> Result<EnvFilter, TelemetryError> {
    let directives = match rust_log.map(str::trim) {
        Some(directives) if !directives.is_empty() => directives,
        _ => config.level.as_str(),
    };

    EnvFilter::try_new(directives).map_err(|error| TelemetryError::InvalidFilter {
        filter: directives.to_string(),
        message: error.to_string(),
    })
}

/// Install a global fmt subscriber. Fails instead of panicking when one is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|error| TelemetryError::AlreadyInitialized(error.to_string()))?;

    tracing::info!(level = %config.level, "logging initialized");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_builds_a_filter() {
        let config = LoggingConfig {
            level: "debug".to_string(),
        };
        // RUST_LOG may be set in the test environment; either way a filter comes back.
        assert!(env_filter(&config).is_ok());
    }

    #[test]
    fn rust_log_overrides_configured_level() {
        let config = LoggingConfig {
            level: "info".to_string(),
        };
        let filter = filter_from(Some("jabber_xmpp=trace"), &config).unwrap();
        assert!(filter.to_string().contains("jabber_xmpp=trace"));
    }

    #[test]
    fn blank_rust_log_falls_back_to_config() {
        let config = LoggingConfig {
            level: "debug".to_string(),
        };
        let filter = filter_from(Some("  "), &config).unwrap();
        assert!(filter.to_string().contains("debug"));
    }

    #[test]
    fn malformed_rust_log_is_reported() {
        let config = LoggingConfig::default();
        let error = filter_from(Some("jabber_xmpp=loud"), &config).unwrap_err();
        assert!(matches!(
            error,
            TelemetryError::InvalidFilter { ref filter, .. } if filter == "jabber_xmpp=loud"
        ));
    }

    #[test]
    fn second_init_reports_error() {
        let config = LoggingConfig::default();
        let _ = init(&config);
        assert!(matches!(
            init(&config),
            Err(TelemetryError::AlreadyInitialized(_))
        ));
    }
}

//! Structured logging for picpik
//!
//! Installs a `tracing` subscriber with an env filter and either the compact
//! or the JSON formatter. Library crates only emit events; binaries call
//! [`init_with_config`] once at startup.

use once_cell::sync::Lazy;
use picpik_core::config::LoggingConfig;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Global session ID for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Initialize with custom configuration
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<()> {
    let filter = config.env_filter();

    let result = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(config.show_target)
                    .with_file(config.show_file)
                    .with_line_number(config.show_line_number)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(config.show_target)
                    .with_file(config.show_file)
                    .with_line_number(config.show_line_number)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(())
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json: bool,
    pub show_target: bool,
    pub show_file: bool,
    pub show_line_number: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            show_target: false,
            show_file: false,
            show_line_number: false,
        }
    }
}

impl TelemetryConfig {
    /// Build from the `[logging]` section of `.picpik.toml`
    pub fn from_logging(logging: &LoggingConfig) -> Self {
        Self {
            log_level: logging.level.clone(),
            json: logging.json,
            ..Self::default()
        }
    }

    /// Raise the level to `debug` for the picpik crates
    #[must_use]
    pub fn verbose(mut self) -> Self {
        self.log_level = "picpik=debug,picpik_image=debug,picpik_core=debug".to_string();
        self.show_target = true;
        self
    }

    /// `RUST_LOG` wins over the configured level
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id() {
        let id = session_id();
        assert!(!id.is_empty());
        // Should be a valid UUID
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn test_from_logging() {
        let logging = LoggingConfig {
            level: "warn".to_string(),
            json: true,
        };
        let config = TelemetryConfig::from_logging(&logging);
        assert_eq!(config.log_level, "warn");
        assert!(config.json);
    }

    #[test]
    fn test_verbose_targets_picpik() {
        let config = TelemetryConfig::default().verbose();
        assert!(config.log_level.contains("picpik_image=debug"));
        assert!(config.show_target);
    }

    #[test]
    fn test_second_init_fails_cleanly() {
        // Whichever test installs first wins; the second call must error, not panic.
        let _ = init_with_config(TelemetryConfig::default());
        assert!(init_with_config(TelemetryConfig::default()).is_err());
    }
}

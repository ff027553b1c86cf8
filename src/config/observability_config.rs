//! Logging configuration parsing from environment variables.

use std::env;

/// Observability environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ObservabilityEnvConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit log lines as JSON-friendly plain text (no ANSI colours)
    pub plain_logs: bool,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            plain_logs: false,
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("TILTWATCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            plain_logs: env::var("TILTWATCH_PLAIN_LOGS")
                .unwrap_or_else(|_| "false".to_string())
                .parse::<bool>()
                .unwrap_or(false),
        }
    }
}

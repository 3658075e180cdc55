//! Log setup.
//!
//! The TUI owns the terminal, so interactive sessions log to a daily rolling
//! file under `$NBX_HOME/logs`. Headless commands may log to stderr instead.

use std::path::Path;

use anyhow::{Context, Result};
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Environment variable overriding the configured filter.
pub const LOG_ENV: &str = "NBX_LOG";

const LOG_FILE_PREFIX: &str = "nbx.log";

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    /// Daily rolling file in the given directory.
    File(&'a Path),
    Stderr,
}

/// Builds the filter: `NBX_LOG`, else the config level, else `default`.
pub fn env_filter(config: &LogConfig, default: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return filter;
    }
    config
        .level
        .as_deref()
        .and_then(|level| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

/// Installs the global subscriber.
///
/// Keep the returned guard alive until exit; dropping it flushes and stops
/// the background writer. Installing twice is not an error (the first
/// subscriber stays).
pub fn init(config: &LogConfig, target: LogTarget<'_>) -> Result<Option<WorkerGuard>> {
    match target {
        LogTarget::File(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter(config, "info"))
                .with_writer(writer)
                .with_ansi(false)
                .try_init();
            Ok(Some(guard))
        }
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter(config, "warn"))
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .try_init();
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_level_is_used() {
        let config = LogConfig {
            level: Some("debug".to_string()),
        };
        if std::env::var(LOG_ENV).is_err() {
            assert_eq!(env_filter(&config, "info").to_string(), "debug");
        }
    }

    #[test]
    fn test_invalid_level_falls_back() {
        let config = LogConfig {
            level: Some("foo=notalevel".to_string()),
        };
        if std::env::var(LOG_ENV).is_err() {
            assert_eq!(env_filter(&config, "warn").to_string(), "warn");
        }
    }

    #[test]
    fn test_file_target_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");

        let guard = init(&LogConfig::default(), LogTarget::File(&logs)).unwrap();

        assert!(guard.is_some());
        assert!(logs.is_dir());
    }
}

//! Tracing setup.
//!
//! Logs go to `${CABINET_HOME}/logs/cabinet.log` so they never interleave with
//! command output on stdout/stderr. Filtering is controlled by `CABINET_LOG`
//! (an `EnvFilter` directive, default `warn`).

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::paths;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "CABINET_LOG";

const LOG_FILE: &str = "cabinet.log";

/// Installs the global tracing subscriber.
///
/// The returned guard flushes buffered log lines on drop and must be held for
/// the lifetime of the process.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a subscriber is
/// already installed.
pub fn init() -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}

/// Renders a token for logs and terminal output without revealing it.
pub fn mask_token(token: &str) -> String {
    match token.get(..12) {
        Some(prefix) if token.len() > 16 => format!("{prefix}..."),
        _ => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJhbGciOiJI...");
        assert_eq!(mask_token("short"), "***");
    }
}

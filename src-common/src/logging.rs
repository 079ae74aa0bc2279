//! Logging setup shared by every callscribe process.
//!
//! [`init`] installs the global `tracing` subscriber: an `EnvFilter` driven
//! by `RUST_LOG` (default `info`) in front of a non-blocking daily-rolling
//! file appender under the platform log directory.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Prefix of the rolling log files; the appender appends the date
/// (e.g. `callscribe.log.2026-08-23`).
pub const LOG_FILE_PREFIX: &str = "callscribe.log";

fn project_dirs() -> directories::ProjectDirs {
    directories::ProjectDirs::from("", "", "callscribe")
        .expect("Failed to determine project directories")
}

/// Returns the platform-appropriate directory for log files.
///
/// Linux follows the XDG state convention (`~/.local/state/callscribe/logs`),
/// macOS uses `~/Library/Logs/callscribe`, everything else gets a `logs`
/// directory under the local app-data dir.
pub fn log_dir() -> PathBuf {
    let dirs = project_dirs();

    #[cfg(target_os = "linux")]
    {
        dirs.state_dir()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| dirs.data_local_dir().join("state"))
            .join("logs")
    }

    #[cfg(target_os = "macos")]
    {
        // `directories` has no accessor for ~/Library/Logs, so walk up from
        // data_local_dir (~/Library/Application Support/callscribe).
        let library = dirs
            .data_local_dir()
            .parent()
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| dirs.data_local_dir().to_path_buf());
        library.join("Logs").join("callscribe")
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        dirs.data_local_dir().join("logs")
    }
}

/// Ensures the log directory exists, creating it if necessary.
pub fn ensure_log_dir() -> Result<(), std::io::Error> {
    std::fs::create_dir_all(log_dir())
}

/// Initialize logging for the calling process.
///
/// Creates the log directory, installs the global subscriber, and returns
/// the appender's worker guard; the caller must hold the guard for the
/// lifetime of the process or buffered log lines are lost on exit. Must be
/// called at most once per process.
pub fn init() -> Result<WorkerGuard, std::io::Error> {
    ensure_log_dir()?;
    let appender = tracing_appender::rolling::daily(log_dir(), LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_is_app_scoped() {
        let dir = log_dir();
        assert!(dir
            .components()
            .any(|c| c.as_os_str().to_string_lossy().contains("callscribe")));
    }

    #[test]
    fn test_init_installs_subscriber_and_creates_dir() {
        let guard = init().unwrap();
        assert!(log_dir().is_dir());
        // A second init would panic (global subscriber already set), which
        // is why callers own the single init.
        tracing::info!("logging initialized");
        drop(guard);
    }
}

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name prefix used by the daily rolling appender.
pub const LOG_FILE_PREFIX: &str = "clientperms.log";

const LOG_RETENTION_DAYS: u64 = 7;

/// Return the log directory path.
///
/// Precedence: `CLIENTPERMS_LOG_DIR` env var > platform default.
/// macOS: `~/Library/Logs/clientperms/`
/// Linux: `$XDG_DATA_HOME/clientperms/logs/` or `~/.local/share/clientperms/logs/`
pub fn log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CLIENTPERMS_LOG_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = dirs::home_dir() {
            return home.join("Library").join("Logs").join("clientperms");
        }
    }

    #[cfg(not(target_os = "macos"))]
    {
        if let Some(data) = dirs::data_dir() {
            return data.join("clientperms").join("logs");
        }
    }

    PathBuf::from("logs")
}

/// Remove log files older than `max_age_days` from the given directory.
///
/// Only files whose name starts with [`LOG_FILE_PREFIX`] are touched, in case
/// the directory is shared with something else.
fn cleanup_old_logs(log_path: &Path, max_age_days: u64) {
    let cutoff = SystemTime::now() - Duration::from_secs(max_age_days * 86400);
    let Ok(entries) = std::fs::read_dir(log_path) else {
        return;
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(LOG_FILE_PREFIX) {
            continue;
        }
        let stale = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .is_ok_and(|modified| modified <= cutoff);
        if stale {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}

/// Initialize the logging subsystem.
///
/// Filter controlled by `CLIENTPERMS_LOG` or `RUST_LOG` (default: `info`).
/// File output: daily rotation in `log_dir()`, 7-day retention.
/// Console output: stderr, without targets.
pub fn init() {
    let filter = EnvFilter::try_from_env("CLIENTPERMS_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let log_path = log_dir();
    if let Err(e) = std::fs::create_dir_all(&log_path) {
        eprintln!(
            "warning: failed to create log directory {:?}: {}",
            log_path, e
        );
    }

    cleanup_old_logs(&log_path, LOG_RETENTION_DAYS);

    let file_appender = rolling::daily(&log_path, LOG_FILE_PREFIX);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
}

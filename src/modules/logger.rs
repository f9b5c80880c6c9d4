//! Tracing setup: console output plus a daily rolling `portal.log` under
//! `<data dir>/logs` when that directory accepts writes.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::modules::paths::get_data_dir;

pub const LOG_FILE_PREFIX: &str = "portal.log";

/// Used when `RUST_LOG` is unset or unparseable
const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

const WRITE_CHECK_FILE: &str = ".portal_write_check";

struct LocalTimer;

impl fmt::time::FormatTime for LocalTimer {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().to_rfc3339())
    }
}

pub fn get_log_dir() -> Result<PathBuf, String> {
    let log_dir = get_data_dir()?.join("logs");
    fs::create_dir_all(&log_dir).map_err(|e| format!("Failed to create log directory: {}", e))?;
    Ok(log_dir)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Non-blocking daily writer into `dir`, or `None` if `dir` rejects writes
fn file_writer(dir: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    if !is_log_dir_writable(dir) {
        return None;
    }
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    Some(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber.
///
/// The returned guard flushes the log file when dropped; hold it for the
/// lifetime of the process.
pub fn init_logger() -> Option<WorkerGuard> {
    let _ = tracing_log::LogTracer::init();

    let writer = match get_log_dir() {
        Ok(dir) => {
            let writer = file_writer(&dir);
            if writer.is_none() {
                eprintln!("Log directory {} is not writable, logging to console only", dir.display());
            }
            writer
        }
        Err(e) => {
            eprintln!("Unable to initialize log directory: {}", e);
            None
        }
    };

    let (file_layer, guard) = match writer {
        Some((non_blocking, guard)) => {
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_timer(LocalTimer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = fmt::layer().with_target(false).with_timer(LocalTimer);

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(console_layer)
        .with(file_layer)
        .try_init();

    info!(file = guard.is_some(), "Logging initialized");
    guard
}

fn is_log_dir_writable(dir: &Path) -> bool {
    let check = dir.join(WRITE_CHECK_FILE);
    let writable = fs::write(&check, b"ok").is_ok();
    if writable {
        let _ = fs::remove_file(&check);
    }
    writable
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_writable_check_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_log_dir_writable(dir.path()));
        assert!(!dir.path().join(WRITE_CHECK_FILE).exists());
    }

    #[test]
    fn test_missing_dir_has_no_file_writer() {
        let dir = tempfile::tempdir().unwrap();
        assert!(file_writer(&dir.path().join("absent")).is_none());
    }

    #[test]
    fn test_file_writer_creates_portal_log() {
        let dir = tempfile::tempdir().unwrap();
        let (mut writer, guard) = file_writer(dir.path()).unwrap();
        writer.write_all(b"line\n").unwrap();
        drop(guard);

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().any(|name| name.starts_with(LOG_FILE_PREFIX)), "files: {:?}", names);
    }
}

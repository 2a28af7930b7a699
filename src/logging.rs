use crate::config::{ensure_logs_dir, get_logs_dir};
use crate::error::IntakeError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, Once};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    fmt::{self},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Rotate a component log once it grows past this size (10MB)
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_LOG_BACKUPS: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub component: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

static LOGGER_INITIALIZED: Once = Once::new();

// Keep the guard alive for the lifetime of the program
static FILE_APPENDER_GUARD: LazyLock<Mutex<Option<tracing_appender::non_blocking::WorkerGuard>>> =
    LazyLock::new(|| Mutex::new(None));

/// Install the console and `app.log` subscribers.
///
/// `default_level` is used when `RUST_LOG` is unset.
pub fn init_logging(default_level: &str) -> Result<(), IntakeError> {
    ensure_logs_dir()?;
    let logs_dir = get_logs_dir()?;

    LOGGER_INITIALIZED.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        let console_layer = fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .with_filter(env_filter.clone());

        let file_appender = tracing_appender::rolling::never(&logs_dir, "app.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if let Ok(mut guard_mutex) = FILE_APPENDER_GUARD.lock() {
            *guard_mutex = Some(guard);
        }

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_filter(env_filter);

        // A subscriber may already be installed (tests, embedding apps)
        let _ = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .try_init();
    });

    Ok(())
}

/// Emit through tracing and append a JSON line to `<component>.log`
pub fn log_intake_event(
    component: &str,
    level: &str,
    message: &str,
    details: Option<serde_json::Value>,
) -> Result<(), IntakeError> {
    match level {
        "ERROR" => error!(component = component, "{}", message),
        "WARN" => warn!(component = component, "{}", message),
        "DEBUG" => debug!(component = component, "{}", message),
        _ => info!(component = component, "{}", message),
    }

    ensure_logs_dir()?;
    let log_file_path = get_logs_dir()?.join(format!("{}.log", component));

    let entry = LogEntry {
        timestamp: Utc::now().to_rfc3339(),
        level: level.to_string(),
        component: component.to_string(),
        message: message.to_string(),
        details,
    };

    write_log_entry(&log_file_path, &entry)
}

fn write_log_entry(log_file_path: &Path, entry: &LogEntry) -> Result<(), IntakeError> {
    if should_rotate_log(log_file_path)? {
        rotate_log_file(log_file_path)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;

    let json_line = serde_json::to_string(entry)?;
    writeln!(file, "{}", json_line)?;
    file.flush()?;

    Ok(())
}

fn should_rotate_log(log_file_path: &Path) -> Result<bool, IntakeError> {
    if !log_file_path.exists() {
        return Ok(false);
    }

    Ok(std::fs::metadata(log_file_path)?.len() > MAX_LOG_SIZE)
}

fn backup_path(log_file_path: &Path, index: u32) -> PathBuf {
    log_file_path.with_extension(format!("log.{}", index))
}

fn rotate_log_file(log_file_path: &Path) -> Result<(), IntakeError> {
    // Shift existing backups up by one (4 -> 5, 3 -> 4, ...)
    for i in (1..MAX_LOG_BACKUPS).rev() {
        let current_backup = backup_path(log_file_path, i);
        if current_backup.exists() {
            std::fs::rename(&current_backup, backup_path(log_file_path, i + 1))?;
        }
    }

    if log_file_path.exists() {
        std::fs::rename(log_file_path, backup_path(log_file_path, 1))?;
    }

    Ok(())
}

/// Read a component log, newest entries first
pub fn read_component_logs(
    component: &str,
    max_lines: Option<usize>,
) -> Result<Vec<LogEntry>, IntakeError> {
    let log_file_path = get_logs_dir()?.join(format!("{}.log", component));
    read_log_file(&log_file_path, max_lines)
}

fn read_log_file(log_file_path: &Path, max_lines: Option<usize>) -> Result<Vec<LogEntry>, IntakeError> {
    if !log_file_path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(log_file_path)?);
    let mut entries = Vec::new();

    for line in reader.lines() {
        let line = line?;
        // Lines written by older builds or by hand are skipped
        if let Ok(entry) = serde_json::from_str::<LogEntry>(&line) {
            entries.push(entry);
        }
    }

    entries.reverse();

    if let Some(max) = max_lines {
        entries.truncate(max);
    }

    Ok(entries)
}

pub fn log_info(component: &str, message: &str) -> Result<(), IntakeError> {
    log_intake_event(component, "INFO", message, None)
}

pub fn log_error(component: &str, message: &str) -> Result<(), IntakeError> {
    log_intake_event(component, "ERROR", message, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            level: "INFO".to_string(),
            component: "intake".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    #[test]
    fn test_log_rotation() {
        let temp_dir = tempdir().unwrap();
        let log_file = temp_dir.path().join("test.log");

        {
            let mut file = File::create(&log_file).unwrap();
            let large_content = "x".repeat(11 * 1024 * 1024);
            file.write_all(large_content.as_bytes()).unwrap();
        }

        assert!(should_rotate_log(&log_file).unwrap());

        rotate_log_file(&log_file).unwrap();

        assert!(backup_path(&log_file, 1).exists());
        assert!(!log_file.exists());
    }

    #[test]
    fn test_rotation_shifts_existing_backups() {
        let temp_dir = tempdir().unwrap();
        let log_file = temp_dir.path().join("intake.log");
        std::fs::write(backup_path(&log_file, 1), "older").unwrap();
        std::fs::write(&log_file, "current").unwrap();

        rotate_log_file(&log_file).unwrap();

        assert_eq!(
            std::fs::read_to_string(backup_path(&log_file, 2)).unwrap(),
            "older"
        );
        assert_eq!(
            std::fs::read_to_string(backup_path(&log_file, 1)).unwrap(),
            "current"
        );
    }

    #[test]
    fn test_read_log_file_newest_first() {
        let temp_dir = tempdir().unwrap();
        let log_file = temp_dir.path().join("intake.log");

        for message in ["first", "second", "third"] {
            write_log_entry(&log_file, &entry(message)).unwrap();
        }
        // Non-JSON noise is ignored
        let mut file = OpenOptions::new().append(true).open(&log_file).unwrap();
        writeln!(file, "not json").unwrap();

        let entries = read_log_file(&log_file, Some(2)).unwrap();
        let messages: Vec<_> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["third", "second"]);
    }

    #[test]
    fn test_missing_log_file_is_empty() {
        let temp_dir = tempdir().unwrap();
        let entries = read_log_file(&temp_dir.path().join("none.log"), None).unwrap();
        assert!(entries.is_empty());
    }
}

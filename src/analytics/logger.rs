use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{self, schema::LoggingConfig};

// ---------------------------------------------------------------------------
// Request log entry (JSONL analytics)
// ---------------------------------------------------------------------------

/// A single entry in the request log (`~/.marketscope/requests.jsonl`).
///
/// One line per request served by the dashboard. Used by the reporter for
/// `marketscope stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub timestamp: String,
    pub method: String,
    /// Request path without the query string.
    pub path: String,
    pub status: u16,
    pub latency_ms: u64,
    /// Whether the request carried an `X-User-ID` header. The id itself is
    /// not recorded.
    #[serde(default)]
    pub user_id_present: bool,
}

// ---------------------------------------------------------------------------
// Logging functions
// ---------------------------------------------------------------------------

/// Append a request entry to the configured log.
///
/// Best-effort: does nothing when logging is disabled, and I/O failures are
/// reported at debug level only.
pub fn log_request(
    logging: &LoggingConfig,
    method: &str,
    path: &str,
    status: u16,
    latency_ms: u64,
    user_id_present: bool,
) {
    if !logging.enabled {
        return;
    }

    let entry = RequestLogEntry {
        timestamp: Utc::now().to_rfc3339(),
        method: method.to_string(),
        path: path.split('?').next().unwrap_or(path).to_string(),
        status,
        latency_ms,
        user_id_present,
    };

    if let Err(e) = append_log_entry(&request_log_path(logging), &entry) {
        log::debug!("failed to append request log entry: {e}");
    }
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read all request log entries.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_all_entries(path: &Path) -> Vec<RequestLogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    let reader = BufReader::new(file);
    reader
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<RequestLogEntry>(&line).ok())
        .collect()
}

/// Read log entries filtered to a time window (last N days).
///
/// If `days` is `None`, returns all entries.
pub fn read_entries_since_days(path: &Path, days: Option<u32>) -> Vec<RequestLogEntry> {
    let entries = read_all_entries(path);

    let Some(days) = days else {
        return entries;
    };

    let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
    let cutoff_str = cutoff.to_rfc3339();

    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff_str)
        .collect()
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn append_log_entry(path: &Path, entry: &RequestLogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Return the path to the request log file.
pub fn request_log_path(logging: &LoggingConfig) -> PathBuf {
    config::expand_home(&logging.path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn logging_to(path: &Path) -> LoggingConfig {
        LoggingConfig {
            enabled: true,
            path: path.to_string_lossy().into_owned(),
            level: "info".to_string(),
        }
    }

    #[test]
    fn entries_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("requests.jsonl");
        let logging = logging_to(&path);

        log_request(&logging, "GET", "/api/download?file=a.txt", 200, 3, false);
        log_request(&logging, "GET", "/api/v1/monitoring/alerts", 401, 1, false);

        let entries = read_all_entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "/api/download");
        assert_eq!(entries[1].status, 401);
    }

    #[test]
    fn disabled_logging_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requests.jsonl");
        let mut logging = logging_to(&path);
        logging.enabled = false;

        log_request(&logging, "GET", "/", 200, 0, false);
        assert!(!path.exists());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requests.jsonl");
        fs::write(
            &path,
            "not json\n{\"timestamp\":\"2026-01-01T00:00:00Z\",\"method\":\"GET\",\"path\":\"/\",\"status\":200,\"latency_ms\":1}\n",
        )
        .unwrap();

        let entries = read_all_entries(&path);
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].user_id_present);
    }

    #[test]
    fn missing_file_reads_empty() {
        assert!(read_all_entries(Path::new("/nonexistent/marketscope/requests.jsonl")).is_empty());
    }
}

//! Analytics reporter — aggregation of the request log.
//!
//! Reads the JSONL request log and provides:
//! - **Stats**: totals, status class distribution, per-route counts
//! - **Trends**: requests and error counts per day

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::analytics::logger::{self, RequestLogEntry};

// ---------------------------------------------------------------------------
// Aggregated stats
// ---------------------------------------------------------------------------

/// Summary statistics for `marketscope stats`.
#[derive(Debug, Serialize)]
pub struct Stats {
    pub total_requests: usize,
    pub avg_latency_ms: f64,
    pub status_distribution: StatusDistribution,
    pub route_stats: Vec<RouteStat>,
}

/// Per-route aggregated statistics.
#[derive(Debug, Clone, Serialize)]
pub struct RouteStat {
    pub route: String,
    pub count: usize,
    pub error_count: usize,
    pub avg_latency_ms: f64,
}

/// Distribution across HTTP status classes.
#[derive(Debug, Default, Serialize)]
pub struct StatusDistribution {
    pub success: usize,
    pub client_error: usize,
    pub server_error: usize,
}

impl StatusDistribution {
    /// Total number of requests across all classes.
    pub fn total(&self) -> usize {
        self.success + self.client_error + self.server_error
    }

    /// Percentage for a given class, returns 0.0 if total is zero.
    pub fn pct(&self, count: usize) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (count as f64 / total as f64) * 100.0
        }
    }
}

/// A single data point in a daily trend.
#[derive(Debug, Clone, Serialize)]
pub struct TrendEntry {
    pub date: String,
    pub requests: usize,
    pub errors: usize,
}

// ---------------------------------------------------------------------------
// Stats computation
// ---------------------------------------------------------------------------

/// Compute aggregate stats from the request log, optionally filtered to the
/// last `days` days.
pub fn compute_stats(log_path: &Path, days: Option<u32>) -> Stats {
    let entries = logger::read_entries_since_days(log_path, days);
    build_stats(&entries)
}

fn build_stats(entries: &[RequestLogEntry]) -> Stats {
    let mut status_distribution = StatusDistribution::default();
    for entry in entries {
        match entry.status {
            500.. => status_distribution.server_error += 1,
            400..=499 => status_distribution.client_error += 1,
            _ => status_distribution.success += 1,
        }
    }

    Stats {
        total_requests: entries.len(),
        avg_latency_ms: avg_latency(entries.iter()),
        status_distribution,
        route_stats: compute_route_stats(entries),
    }
}

/// Group entries by path. Sorted by request count (descending), then route.
fn compute_route_stats(entries: &[RequestLogEntry]) -> Vec<RouteStat> {
    let mut groups: HashMap<&str, Vec<&RequestLogEntry>> = HashMap::new();
    for entry in entries {
        groups.entry(&entry.path).or_default().push(entry);
    }

    let mut stats: Vec<RouteStat> = groups
        .into_iter()
        .map(|(route, group)| RouteStat {
            route: route.to_string(),
            count: group.len(),
            error_count: group.iter().filter(|e| e.status >= 400).count(),
            avg_latency_ms: avg_latency(group.iter().copied()),
        })
        .collect();

    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.route.cmp(&b.route)));
    stats
}

fn avg_latency<'a>(entries: impl Iterator<Item = &'a RequestLogEntry>) -> f64 {
    let (sum, count) = entries.fold((0.0, 0usize), |(sum, count), e| {
        (sum + e.latency_ms as f64, count + 1)
    });
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

// ---------------------------------------------------------------------------
// Trends
// ---------------------------------------------------------------------------

/// Compute daily request counts over the last `days` days.
pub fn compute_trends(log_path: &Path, days: u32) -> Vec<TrendEntry> {
    let entries = logger::read_entries_since_days(log_path, Some(days));
    build_trends(&entries)
}

fn build_trends(entries: &[RequestLogEntry]) -> Vec<TrendEntry> {
    // Group by date (YYYY-MM-DD), the first 10 chars of the RFC 3339 stamp
    let mut daily: HashMap<String, (usize, usize)> = HashMap::new();
    for entry in entries {
        let date = entry.timestamp.get(..10).unwrap_or("unknown").to_string();
        let day = daily.entry(date).or_default();
        day.0 += 1;
        if entry.status >= 400 {
            day.1 += 1;
        }
    }

    let mut trends: Vec<TrendEntry> = daily
        .into_iter()
        .map(|(date, (requests, errors))| TrendEntry {
            date,
            requests,
            errors,
        })
        .collect();

    trends.sort_by(|a, b| a.date.cmp(&b.date));
    trends
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

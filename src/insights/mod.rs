//! Competitor insights — aggregation of monitored posts and alerts.
//!
//! Shapes backend data for the dashboard:
//! - **By competitor**: post count, average sentiment, average engagement,
//!   per-platform breakdown
//! - **By platform**: post count and average engagement
//! - **Quiet competitors**: active competitors with no monitored posts
//! - **Alert digest**: totals, unread count, counts by severity

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::backend::{Alert, Competitor, CompetitorPost};

/// Sentiment scores above this are positive, below its negation negative.
const SENTIMENT_NEUTRAL_BAND: f64 = 0.1;

// ---------------------------------------------------------------------------
// Aggregated types
// ---------------------------------------------------------------------------

/// Aggregates for one competitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorSummary {
    pub competitor: String,
    pub post_count: usize,
    /// Mean over posts that carry a sentiment score; `None` if none do.
    pub avg_sentiment: Option<f64>,
    pub sentiment_label: Option<&'static str>,
    pub avg_engagement: f64,
    pub total_views: u64,
    pub platforms: Vec<PlatformSummary>,
}

/// Aggregates for one platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformSummary {
    pub platform: String,
    pub post_count: usize,
    pub avg_engagement: f64,
}

/// Summary of a user's alerts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertDigest {
    pub total: usize,
    pub unread: usize,
    pub by_severity: BTreeMap<String, usize>,
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// Group posts by competitor and aggregate each group.
///
/// Sorted by post count (descending), then competitor name.
pub fn summarize_by_competitor(posts: &[CompetitorPost]) -> Vec<CompetitorSummary> {
    let mut groups: HashMap<String, Vec<&CompetitorPost>> = HashMap::new();
    for post in posts {
        groups.entry(competitor_key(post)).or_default().push(post);
    }

    let mut summaries: Vec<CompetitorSummary> = groups
        .into_iter()
        .map(|(competitor, group)| {
            let scores: Vec<f64> = group.iter().filter_map(|p| p.sentiment_score).collect();
            let avg_sentiment = mean(&scores);

            CompetitorSummary {
                competitor,
                post_count: group.len(),
                avg_sentiment,
                sentiment_label: avg_sentiment.map(sentiment_label),
                avg_engagement: avg_engagement(&group),
                total_views: group
                    .iter()
                    .fold(0u64, |total, p| total.saturating_add(p.views)),
                platforms: platform_breakdown(&group),
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.post_count
            .cmp(&a.post_count)
            .then_with(|| a.competitor.cmp(&b.competitor))
    });
    summaries
}

/// Aggregate posts per platform across all competitors.
pub fn summarize_by_platform(posts: &[CompetitorPost]) -> Vec<PlatformSummary> {
    let refs: Vec<&CompetitorPost> = posts.iter().collect();
    platform_breakdown(&refs)
}

fn platform_breakdown(posts: &[&CompetitorPost]) -> Vec<PlatformSummary> {
    let mut groups: HashMap<String, Vec<&CompetitorPost>> = HashMap::new();
    for &post in posts {
        let platform = post.platform.trim().to_lowercase();
        let platform = if platform.is_empty() {
            "unknown".to_string()
        } else {
            platform
        };
        groups.entry(platform).or_default().push(post);
    }

    let mut platforms: Vec<PlatformSummary> = groups
        .into_iter()
        .map(|(platform, group)| PlatformSummary {
            platform,
            post_count: group.len(),
            avg_engagement: avg_engagement(&group),
        })
        .collect();

    platforms.sort_by(|a, b| {
        b.post_count
            .cmp(&a.post_count)
            .then_with(|| a.platform.cmp(&b.platform))
    });
    platforms
}

/// Competitor name, falling back to the competitor id, then `"Unknown"`.
fn competitor_key(post: &CompetitorPost) -> String {
    post.competitor_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .or_else(|| Some(post.competitor_id.trim()).filter(|id| !id.is_empty()))
        .unwrap_or("Unknown")
        .to_string()
}

fn avg_engagement(posts: &[&CompetitorPost]) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    posts.iter().map(|p| p.engagement() as f64).sum::<f64>() / posts.len() as f64
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Names of active competitors that no post belongs to, matched by id or
/// case-insensitive name. Sorted by name.
pub fn quiet_competitors(competitors: &[Competitor], posts: &[CompetitorPost]) -> Vec<String> {
    let mut quiet: Vec<String> = competitors
        .iter()
        .filter(|c| c.is_active)
        .filter(|c| {
            !posts.iter().any(|p| {
                (!c.id.is_empty() && p.competitor_id == c.id)
                    || p.competitor_name
                        .as_deref()
                        .is_some_and(|n| n.trim().eq_ignore_ascii_case(c.name.trim()))
            })
        })
        .map(|c| {
            if c.name.trim().is_empty() {
                c.id.clone()
            } else {
                c.name.trim().to_string()
            }
        })
        .filter(|name| !name.is_empty())
        .collect();

    quiet.sort();
    quiet
}

/// Label a sentiment score as positive, neutral, or negative.
pub fn sentiment_label(score: f64) -> &'static str {
    if score > SENTIMENT_NEUTRAL_BAND {
        "positive"
    } else if score < -SENTIMENT_NEUTRAL_BAND {
        "negative"
    } else {
        "neutral"
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Count alerts, unread alerts, and alerts per severity.
pub fn digest_alerts(alerts: &[Alert]) -> AlertDigest {
    let mut by_severity: BTreeMap<String, usize> = BTreeMap::new();
    for alert in alerts {
        let severity = alert
            .severity
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        *by_severity.entry(severity).or_default() += 1;
    }

    AlertDigest {
        total: alerts.len(),
        unread: alerts.iter().filter(|a| !a.is_read).count(),
        by_severity,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

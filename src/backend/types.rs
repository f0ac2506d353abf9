/// Resources returned by the external marketing backend.
///
/// The backend's schema is not versioned, so every type deserializes
/// leniently: unknown fields are ignored and missing fields default.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A competitor tracked by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Competitor {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub website: Option<String>,
    pub youtube_channel: Option<String>,
    pub platforms: Vec<String>,
    /// Competitors are monitored unless the backend says otherwise.
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}

/// A piece of competitor content picked up by monitoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetitorPost {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(deserialize_with = "id_string")]
    pub competitor_id: String,
    pub competitor_name: Option<String>,
    pub platform: String,
    pub content: String,
    pub url: Option<String>,
    pub posted_at: Option<String>,
    /// Sentiment in `[-1, 1]` when the backend has scored the post.
    pub sentiment_score: Option<f64>,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub views: u64,
}

impl CompetitorPost {
    /// Interactions counted as engagement: likes, comments, shares.
    /// Saturates at `u64::MAX`.
    pub fn engagement(&self) -> u64 {
        self.likes
            .saturating_add(self.comments)
            .saturating_add(self.shares)
    }
}

/// A monitoring alert raised by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alert {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub competitor_name: Option<String>,
    pub alert_type: Option<String>,
    #[serde(alias = "priority")]
    pub severity: Option<String>,
    pub title: Option<String>,
    pub message: String,
    pub created_at: Option<String>,
    pub is_read: bool,
}

/// Accept ids as strings or numbers.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Pull a list out of a response that is either a bare array or an object
/// wrapping the array under one of `keys`.
pub fn unwrap_list(value: Value, keys: &[&str]) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => keys
            .iter()
            .find_map(|k| match obj.remove(*k) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

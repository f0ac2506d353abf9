//! JSON-block parser for AI responses.
//!
//! The AI service is prompted to answer with a JSON document, usually inside
//! a fenced ```json block but sometimes as a bare object or array embedded in
//! prose. Three document shapes are recognised:
//!
//! | Shape | Detected by |
//! |-------|-------------|
//! | competitor campaign | top-level array |
//! | competitor analysis | `competitive_analysis` + `recommendations` |
//! | standard            | `recommendations.{high,medium,low}_priority` |
//!
//! Anything else, including invalid JSON, yields an empty result.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use super::model::{Priority, Recommendation};

static FENCED_JSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```json\s*(.*?)```").expect("fenced json regex must compile")
});

/// Required fields of a competitor-campaign entry.
const CAMPAIGN_FIELDS: [&str; 4] = [
    "competitor_name",
    "threatening_alerts",
    "optimization_steps",
    "results_and_predictions",
];

/// Priority buckets of the `recommendations` object.
const PRIORITY_KEYS: [(&str, Priority); 3] = [
    ("high_priority", Priority::High),
    ("medium_priority", Priority::Medium),
    ("low_priority", Priority::Low),
];

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Which JSON document shape was recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseFormat {
    CompetitorCampaign,
    CompetitorAnalysis,
    Standard,
}

impl std::fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CompetitorCampaign => write!(f, "competitor-campaign"),
            Self::CompetitorAnalysis => write!(f, "competitor-analysis"),
            Self::Standard => write!(f, "standard"),
        }
    }
}

/// Output of [`parse_json_block`].
#[derive(Debug, Clone, Default)]
pub struct JsonExtraction {
    /// `None` when no JSON was found or its shape was not recognised.
    pub format: Option<ResponseFormat>,
    pub recommendations: Vec<Recommendation>,
    /// The `competitive_analysis` value of the competitor-analysis shape.
    pub competitive_analysis: Option<Value>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Locate, parse, and interpret the JSON document embedded in `text`.
///
/// Never fails: a missing block, a parse error, or an unknown shape is logged
/// and produces an empty [`JsonExtraction`].
pub fn parse_json_block(text: &str) -> JsonExtraction {
    let Some(candidate) = locate_json(text) else {
        log::debug!("no JSON block found in AI response");
        return JsonExtraction::default();
    };

    let value: Value = match serde_json::from_str(candidate) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("failed to parse JSON block from AI response: {e}");
            return JsonExtraction::default();
        }
    };

    match &value {
        Value::Array(items) => JsonExtraction {
            format: Some(ResponseFormat::CompetitorCampaign),
            recommendations: items.iter().filter_map(competitor_campaign).collect(),
            competitive_analysis: None,
        },
        Value::Object(obj) => match obj.get("recommendations").and_then(priority_buckets) {
            Some(buckets) => {
                let analysis = obj.get("competitive_analysis").cloned();
                JsonExtraction {
                    format: Some(if analysis.is_some() {
                        ResponseFormat::CompetitorAnalysis
                    } else {
                        ResponseFormat::Standard
                    }),
                    recommendations: campaign_actions(buckets),
                    competitive_analysis: analysis,
                }
            }
            None => {
                log::warn!("JSON block has no recognised recommendation shape");
                JsonExtraction::default()
            }
        },
        _ => {
            log::warn!("JSON block is neither an object nor an array");
            JsonExtraction::default()
        }
    }
}

/// Find the JSON substring: a fenced ```json block first, else the widest
/// bare `{...}` or `[...]` span starting at the first opener.
fn locate_json(text: &str) -> Option<&str> {
    if let Some(caps) = FENCED_JSON_RE.captures(text)
        && let Some(body) = caps.get(1)
    {
        let body = body.as_str().trim();
        if !body.is_empty() {
            return Some(body);
        }
    }

    let start = text.find(['{', '['])?;
    let closer = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(closer)?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

/// One entry of the competitor-campaign array. Entries with a null
/// competitor name or a missing field are dropped.
fn competitor_campaign(entry: &Value) -> Option<Recommendation> {
    let obj = entry.as_object()?;
    if CAMPAIGN_FIELDS.iter().any(|f| !obj.contains_key(*f)) {
        return None;
    }

    if obj.get("competitor_name").is_some_and(Value::is_null) {
        return None;
    }

    let competitor = display_text(obj, "competitor_name")?;
    let alerts = display_text(obj, "threatening_alerts")?;
    let steps = display_text(obj, "optimization_steps")?;
    let results = display_text(obj, "results_and_predictions")?;

    let priority = obj
        .get("priority_level")
        .and_then(Value::as_str)
        .and_then(Priority::parse)
        .unwrap_or(Priority::High);

    let mut rec = Recommendation::from_text(&steps, priority, None);
    rec.title = format!("Respond to {competitor}");
    rec.competitor = Some(competitor);
    rec.reasoning = (!alerts.is_empty()).then_some(alerts);
    rec.prediction = (!results.is_empty()).then_some(results);
    Some(rec)
}

/// The `recommendations` object, if it carries at least one priority bucket.
fn priority_buckets(value: &Value) -> Option<&Map<String, Value>> {
    let obj = value.as_object()?;
    PRIORITY_KEYS
        .iter()
        .any(|(key, _)| obj.contains_key(*key))
        .then_some(obj)
}

/// Flatten priority buckets of `{campaign_name, action, reasoning}` entries.
fn campaign_actions(buckets: &Map<String, Value>) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for (key, priority) in PRIORITY_KEYS {
        let Some(entries) = buckets.get(key).and_then(Value::as_array) else {
            continue;
        };

        for entry in entries {
            let Some(obj) = entry.as_object() else {
                continue;
            };
            let (Some(campaign), Some(action), Some(reasoning)) = (
                field_text(obj, "campaign_name"),
                field_text(obj, "action"),
                field_text(obj, "reasoning"),
            ) else {
                log::debug!("dropping {key} entry with missing fields");
                continue;
            };

            let mut rec = Recommendation::from_text(&action, priority, Some(campaign));
            rec.reasoning = Some(reasoning);
            recommendations.push(rec);
        }
    }

    recommendations
}

/// Read a field as display text: strings as-is, arrays joined by newline,
/// other scalars and objects in their JSON form. Null and blank are `None`.
fn field_text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    display_text(obj, key).filter(|text| !text.is_empty())
}

/// Like [`field_text`] but only a missing key is `None`; null and empty
/// values read as empty text.
fn display_text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match obj.get(key)? {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    };
    Some(text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// Recommendation extraction from AI chat responses.
///
/// The AI panel of the dashboard receives a free-form completion and needs a
/// short, ordered list of structured [`Recommendation`]s to render. Two
/// parsers exist:
///
/// - [`json::parse_json_block`] — reads the JSON document the AI is prompted
///   to produce (authoritative when present)
/// - [`text::parse_text_sections`] — heuristic split on "High Priority" /
///   "Medium Priority" sections and numbered items
///
/// [`extract`] combines them according to the configured
/// [`ExtractionStrategy`], then sorts by priority and caps the list.
/// Extraction never fails: malformed input yields an empty list.
use serde::Serialize;
use serde_json::Value;

pub mod json;
pub mod model;
pub mod rules;
pub mod text;

pub use json::ResponseFormat;
pub use model::{ActionType, Level, Priority, Recommendation};

use crate::config::schema::{ExtractionStrategy, ExtractorConfig};

/// Which parser produced an [`Extraction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Json,
    Text,
    /// Input was too short or nothing was recovered.
    Empty,
}

/// Result of [`extract`].
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ResponseFormat>,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitive_analysis: Option<Value>,
}

impl Extraction {
    fn empty() -> Self {
        Self {
            source: Source::Empty,
            format: None,
            recommendations: Vec::new(),
            competitive_analysis: None,
        }
    }
}

/// Extract recommendations from an AI response.
///
/// Inputs shorter than `min_input_chars` (after trimming) are treated as
/// "no recommendations". With [`ExtractionStrategy::JsonThenText`] the text
/// parser only runs when the JSON parser recovers nothing.
pub fn extract(response: &str, config: &ExtractorConfig) -> Extraction {
    let response = response.trim();
    if response.chars().count() < config.min_input_chars {
        log::debug!(
            "response too short for extraction ({} chars)",
            response.chars().count()
        );
        return Extraction::empty();
    }

    let mut extraction = match config.strategy {
        ExtractionStrategy::JsonOnly => from_json(response),
        ExtractionStrategy::TextOnly => from_text(response),
        ExtractionStrategy::JsonThenText => {
            let parsed = from_json(response);
            if parsed.recommendations.is_empty() {
                log::debug!("JSON extraction found nothing, falling back to text sections");
                from_text(response)
            } else {
                parsed
            }
        }
    };

    finalize(&mut extraction.recommendations, config.max_recommendations);
    if extraction.recommendations.is_empty() {
        extraction.source = Source::Empty;
    }

    log::debug!(
        "extracted {} recommendations ({:?})",
        extraction.recommendations.len(),
        extraction.source
    );
    extraction
}

fn from_json(response: &str) -> Extraction {
    let parsed = json::parse_json_block(response);
    Extraction {
        source: Source::Json,
        format: parsed.format,
        recommendations: parsed.recommendations,
        competitive_analysis: parsed.competitive_analysis,
    }
}

fn from_text(response: &str) -> Extraction {
    Extraction {
        source: Source::Text,
        format: None,
        recommendations: text::parse_text_sections(response),
        competitive_analysis: None,
    }
}

/// Stable sort by priority weight (descending), cap, and assign ids.
fn finalize(recommendations: &mut Vec<Recommendation>, max: usize) {
    recommendations.sort_by_key(|r| std::cmp::Reverse(r.priority.weight()));
    recommendations.truncate(max);

    let stamp = chrono::Utc::now().timestamp_millis();
    for (i, rec) in recommendations.iter_mut().enumerate() {
        rec.id = format!("{}-{}-{}", rec.priority, i, stamp);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config(strategy: ExtractionStrategy) -> ExtractorConfig {
        ExtractorConfig {
            strategy,
            ..ExtractorConfig::default()
        }
    }

    const SECTIONS: &str = "High Priority\n1. CampaignA\n• Increase budget by 20%\n\nMedium Priority\n1. CampaignB\n• Review targeting";

    #[test]
    fn short_input_is_skipped() {
        let out = extract("High Priority\n1. A\n• Pause", &ExtractorConfig::default());
        assert_eq!(out.source, Source::Empty);
        assert!(out.recommendations.is_empty());
    }

    #[test]
    fn json_then_text_falls_back() {
        let out = extract(SECTIONS, &config(ExtractionStrategy::JsonThenText));
        assert_eq!(out.source, Source::Text);
        assert_eq!(out.recommendations.len(), 2);
    }

    #[test]
    fn json_only_does_not_fall_back() {
        let out = extract(SECTIONS, &config(ExtractionStrategy::JsonOnly));
        assert_eq!(out.source, Source::Empty);
        assert!(out.recommendations.is_empty());
    }

    #[test]
    fn results_are_sorted_and_capped() {
        let mut text = String::from("Low Priority\n");
        for i in 1..=6 {
            text.push_str(&format!("{i}. Low{i}\n• Adjust bids slightly on set {i}\n"));
        }
        text.push_str("High Priority\n");
        for i in 1..=4 {
            text.push_str(&format!("{i}. High{i}\n• Increase budget on set {i}\n"));
        }

        let out = extract(&text, &config(ExtractionStrategy::TextOnly));
        assert_eq!(out.recommendations.len(), 8);
        assert!(out.recommendations[..4].iter().all(|r| r.priority == Priority::High));
        assert!(out.recommendations[4..].iter().all(|r| r.priority == Priority::Low));
        assert_eq!(out.recommendations[0].campaign.as_deref(), Some("High1"));
    }

    #[test]
    fn ids_embed_priority_and_index() {
        let out = extract(SECTIONS, &ExtractorConfig::default());
        assert!(out.recommendations[0].id.starts_with("high-0-"));
        assert!(out.recommendations[1].id.starts_with("medium-1-"));
    }
}

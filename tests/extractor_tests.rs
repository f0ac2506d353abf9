use marketscope::config::schema::{ExtractionStrategy, ExtractorConfig};
use marketscope::recommendations::json::parse_json_block;
use marketscope::recommendations::rules::{
    categorize_recommendation, generate_recommendation_title, is_valid_recommendation,
};
use marketscope::recommendations::text::parse_text_sections;
use marketscope::recommendations::{self, ActionType, Priority, ResponseFormat, Source};

const SECTIONS: &str = "High Priority\n1. CampaignA\n• Increase budget by 20%\n\nMedium Priority\n1. CampaignB\n• Review targeting";

fn strategy(strategy: ExtractionStrategy) -> ExtractorConfig {
    ExtractorConfig {
        strategy,
        ..ExtractorConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Heuristic text parser
// ---------------------------------------------------------------------------

#[test]
fn text_sections_yield_campaign_records() {
    let recs = parse_text_sections(SECTIONS);
    assert_eq!(recs.len(), 2);

    assert_eq!(recs[0].priority, Priority::High);
    assert_eq!(recs[0].campaign.as_deref(), Some("CampaignA"));
    assert_eq!(recs[0].action_type, ActionType::Budget);

    assert_eq!(recs[1].priority, Priority::Medium);
    assert_eq!(recs[1].campaign.as_deref(), Some("CampaignB"));
    assert_eq!(recs[1].action_type, ActionType::Targeting);
}

#[test]
fn text_records_serialize_with_camel_case_keys() {
    let recs = parse_text_sections(SECTIONS);
    let value = serde_json::to_value(&recs[0]).unwrap();
    assert_eq!(value["priority"], "high");
    assert_eq!(value["actionType"], "budget");
    assert!(value.get("estimatedTime").is_some());
    assert!(value.get("reasoning").is_none());
}

#[test]
fn bullets_without_sections_use_last_header() {
    let text = "Here is what I found.\n\
                - Pause the underperforming retargeting ads\n\
                Low:\n\
                - Test a new creative variant for the spring launch";
    let recs = parse_text_sections(text);
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].priority, Priority::Medium);
    assert_eq!(recs[0].action_type, ActionType::Pausing);
    assert_eq!(recs[1].priority, Priority::Low);
}

#[test]
fn conversational_filler_is_not_a_recommendation() {
    assert!(!is_valid_recommendation(
        "Let me know if you want me to increase anything else"
    ));
    assert!(!is_valid_recommendation("Feel free to ask more questions"));
    assert!(!is_valid_recommendation("Pause"));
    assert!(is_valid_recommendation("Pause the Spring Sale campaign today"));
}

#[test]
fn rule_tables_classify_and_title() {
    let cat = categorize_recommendation("Consider a significant overhaul of the creative assets");
    assert_eq!(cat.action_type, ActionType::Creative);

    assert_eq!(
        generate_recommendation_title("Re-evaluate targeting for the lookalike audience"),
        "Optimize Audience Targeting"
    );
    let long = "x".repeat(80);
    let title = generate_recommendation_title(&long);
    assert!(title.ends_with("..."));
    assert_eq!(title.chars().count(), 63);
}

// ---------------------------------------------------------------------------
// JSON block parser
// ---------------------------------------------------------------------------

#[test]
fn no_json_span_yields_nothing() {
    let out = parse_json_block("Your campaigns look healthy, nothing to change this week.");
    assert!(out.recommendations.is_empty());
    assert!(out.format.is_none());
}

#[test]
fn null_competitor_names_are_all_dropped() {
    let text = r#"```json
[
  {"competitor_name": null, "threatening_alerts": "a", "optimization_steps": "Increase budget", "results_and_predictions": "c"},
  {"competitor_name": null, "threatening_alerts": "a", "optimization_steps": "Pause ads", "results_and_predictions": "c"}
]
```"#;
    let out = parse_json_block(text);
    assert_eq!(out.format, Some(ResponseFormat::CompetitorCampaign));
    assert!(out.recommendations.is_empty());
}

#[test]
fn competitor_campaign_format() {
    let text = r#"Analysis below.
```json
[
  {
    "competitor_name": "Acme",
    "threatening_alerts": ["Acme launched a 30% discount", "Acme doubled ad spend"],
    "optimization_steps": ["Increase budget on the brand campaign", "Test a price-match creative"],
    "results_and_predictions": "Recover 10% share of voice",
    "priority_level": "medium"
  },
  {
    "competitor_name": "Globex",
    "threatening_alerts": "New product video",
    "optimization_steps": "Review targeting overlap",
    "results_and_predictions": "Hold CTR",
    "priority_level": "urgent"
  }
]
```"#;
    let out = parse_json_block(text);
    assert_eq!(out.recommendations.len(), 2);

    let acme = &out.recommendations[0];
    assert_eq!(acme.competitor.as_deref(), Some("Acme"));
    assert_eq!(acme.priority, Priority::Medium);
    assert_eq!(
        acme.description,
        "Increase budget on the brand campaign\nTest a price-match creative"
    );
    assert_eq!(acme.prediction.as_deref(), Some("Recover 10% share of voice"));

    // Unknown priority levels default to high.
    assert_eq!(out.recommendations[1].priority, Priority::High);
}

#[test]
fn competitor_analysis_format_keeps_analysis() {
    let text = r#"{
  "competitive_analysis": {"summary": "Acme is outspending you on YouTube"},
  "recommendations": {
    "high_priority": [
      {"campaign_name": "Brand", "action": "Increase budget by 15%", "reasoning": "Losing impression share"}
    ],
    "medium_priority": []
  }
}"#;
    let out = parse_json_block(text);
    assert_eq!(out.format, Some(ResponseFormat::CompetitorAnalysis));
    assert_eq!(out.recommendations.len(), 1);
    assert_eq!(out.recommendations[0].campaign.as_deref(), Some("Brand"));
    assert_eq!(
        out.recommendations[0].reasoning.as_deref(),
        Some("Losing impression share")
    );
    assert!(out.competitive_analysis.is_some());
}

#[test]
fn standard_format_drops_incomplete_entries_and_sorts() {
    let text = r#"```json
{"recommendations": {
  "medium_priority": [
    {"campaign_name": "Retarget", "action": "Adjust bids on mobile", "reasoning": "CPC rising"}
  ],
  "high_priority": [
    {"campaign_name": "Spring", "reasoning": "no action given"},
    {"campaign_name": "Summer", "action": "Pause the Summer campaign", "reasoning": "ROAS below 1"}
  ]
}}
```"#;
    let out = recommendations::extract(text, &ExtractorConfig::default());
    assert_eq!(out.source, Source::Json);
    assert_eq!(out.format, Some(ResponseFormat::Standard));
    assert_eq!(out.recommendations.len(), 2);
    assert_eq!(out.recommendations[0].priority, Priority::High);
    assert_eq!(out.recommendations[0].campaign.as_deref(), Some("Summer"));
    assert_eq!(out.recommendations[1].priority, Priority::Medium);
}

#[test]
fn malformed_json_is_swallowed() {
    let out = parse_json_block("```json\n{\"recommendations\": {\"high_priority\": [\n```");
    assert!(out.recommendations.is_empty());
}

// ---------------------------------------------------------------------------
// Top-level extraction
// ---------------------------------------------------------------------------

#[test]
fn extraction_is_idempotent_apart_from_ids() {
    let config = ExtractorConfig::default();
    let first = recommendations::extract(SECTIONS, &config);
    let second = recommendations::extract(SECTIONS, &config);

    assert_eq!(first.recommendations.len(), second.recommendations.len());
    for (a, b) in first.recommendations.iter().zip(&second.recommendations) {
        assert_eq!(a.title, b.title);
        assert_eq!(a.description, b.description);
        assert_eq!(a.priority, b.priority);
        assert_eq!(a.action_type, b.action_type);
    }
}

#[test]
fn strategy_selects_parsers() {
    let fallback = recommendations::extract(SECTIONS, &strategy(ExtractionStrategy::JsonThenText));
    assert_eq!(fallback.recommendations.len(), 2);

    let json_only = recommendations::extract(SECTIONS, &strategy(ExtractionStrategy::JsonOnly));
    assert!(json_only.recommendations.is_empty());

    let text_only = recommendations::extract(SECTIONS, &strategy(ExtractionStrategy::TextOnly));
    assert_eq!(text_only.source, Source::Text);
}

#[test]
fn short_or_empty_input_yields_nothing() {
    let config = ExtractorConfig::default();
    assert!(recommendations::extract("", &config).recommendations.is_empty());
    assert!(
        recommendations::extract("High Priority\n1. A\n• Pause", &config)
            .recommendations
            .is_empty()
    );
}

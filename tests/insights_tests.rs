use marketscope::backend::types::unwrap_list;
use marketscope::backend::{Alert, Competitor, CompetitorPost};
use marketscope::insights::{self, sentiment_label};
use marketscope::settings::{CompanySize, Preferences, WizardStep};
use serde_json::json;

fn posts_from(value: serde_json::Value) -> Vec<CompetitorPost> {
    unwrap_list(value, &["posts", "data", "items"])
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

// ---------------------------------------------------------------------------
// Competitor aggregation
// ---------------------------------------------------------------------------

#[test]
fn averages_only_present_sentiment_scores() {
    let posts = posts_from(json!([
        {"id": 1, "competitor_name": "Acme", "platform": "instagram", "sentiment_score": 0.8},
        {"id": 2, "competitor_name": "Acme", "platform": "instagram", "sentiment_score": 0.2},
        {"id": 3, "competitor_name": "Acme", "platform": "instagram"}
    ]));

    let summary = &insights::summarize_by_competitor(&posts)[0];
    assert_eq!(summary.post_count, 3);
    assert!((summary.avg_sentiment.unwrap() - 0.5).abs() < 1e-9);
    assert_eq!(summary.sentiment_label, Some("positive"));
}

#[test]
fn competitors_without_scores_have_no_sentiment() {
    let posts = posts_from(json!({"data": [
        {"id": "a", "competitor_id": 9, "platform": "web", "likes": 3}
    ]}));

    let summaries = insights::summarize_by_competitor(&posts);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].competitor, "9");
    assert!(summaries[0].avg_sentiment.is_none());
    assert!(summaries[0].sentiment_label.is_none());
}

#[test]
fn competitors_sorted_by_activity_then_name() {
    let posts = posts_from(json!([
        {"competitor_name": "Zeta", "platform": "web"},
        {"competitor_name": "Beta", "platform": "web"},
        {"competitor_name": "Acme", "platform": "web"},
        {"competitor_name": "Acme", "platform": "tiktok", "views": 1500},
    ]));

    let names: Vec<_> = insights::summarize_by_competitor(&posts)
        .into_iter()
        .map(|s| (s.competitor, s.post_count))
        .collect();
    assert_eq!(
        names,
        vec![
            ("Acme".to_string(), 2),
            ("Beta".to_string(), 1),
            ("Zeta".to_string(), 1)
        ]
    );
}

#[test]
fn per_competitor_platform_breakdown() {
    let posts = posts_from(json!([
        {"competitor_name": "Acme", "platform": "YouTube", "likes": 10, "views": 100},
        {"competitor_name": "Acme", "platform": "youtube", "comments": 4, "views": 50},
        {"competitor_name": "Acme", "platform": "", "shares": 1}
    ]));

    let summary = &insights::summarize_by_competitor(&posts)[0];
    assert_eq!(summary.total_views, 150);
    assert_eq!(summary.platforms.len(), 2);
    assert_eq!(summary.platforms[0].platform, "youtube");
    assert_eq!(summary.platforms[0].avg_engagement, 7.0);
    assert_eq!(summary.platforms[1].platform, "unknown");
}

#[test]
fn huge_backend_counts_saturate() {
    let posts = posts_from(json!([
        {"competitor_name": "Acme", "platform": "web", "likes": u64::MAX, "comments": 1, "views": u64::MAX},
        {"competitor_name": "Acme", "platform": "web", "views": 10}
    ]));

    assert_eq!(posts[0].engagement(), u64::MAX);
    let summary = &insights::summarize_by_competitor(&posts)[0];
    assert_eq!(summary.total_views, u64::MAX);
    assert!(summary.avg_engagement > 0.0);
    assert_eq!(insights::summarize_by_platform(&posts)[0].post_count, 2);
}

#[test]
fn quiet_competitors_match_by_id_or_name() {
    let competitors: Vec<Competitor> = serde_json::from_value(json!([
        {"id": 1, "name": "Acme"},
        {"id": 2, "name": "Globex"},
        {"id": 3, "name": "Initech"},
        {"id": 4, "name": "Hooli", "is_active": false}
    ]))
    .unwrap();
    let posts = posts_from(json!([
        {"competitor_id": 1, "platform": "web"},
        {"competitor_name": "globex ", "platform": "web"}
    ]));

    assert_eq!(insights::quiet_competitors(&competitors, &posts), vec!["Initech"]);
    assert!(insights::quiet_competitors(&[], &posts).is_empty());
}

#[test]
fn sentiment_bands() {
    assert_eq!(sentiment_label(0.11), "positive");
    assert_eq!(sentiment_label(0.0), "neutral");
    assert_eq!(sentiment_label(-0.5), "negative");
}

#[test]
fn alert_digest_from_backend_payload() {
    let alerts: Vec<Alert> = unwrap_list(
        json!({"alerts": [
            {"id": 1, "severity": "critical", "message": "Ad spend spike"},
            {"id": 2, "priority": "Critical", "message": "New campaign", "is_read": true},
            {"id": 3, "message": "Mention"}
        ]}),
        &["alerts"],
    )
    .into_iter()
    .filter_map(|v| serde_json::from_value(v).ok())
    .collect();

    let digest = insights::digest_alerts(&alerts);
    assert_eq!(digest.total, 3);
    assert_eq!(digest.unread, 2);
    assert_eq!(digest.by_severity.get("critical"), Some(&2));
    assert_eq!(digest.by_severity.get("unknown"), Some(&1));
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[test]
fn placeholder_preferences_are_unset() {
    let prefs = Preferences::from_backend(&json!({
        "industry": "Not set",
        "company_size": "Unknown",
        "monthly_budget": "0",
        "competitors": ["N/A"]
    }));
    assert!(prefs.industry.is_none());
    assert!(prefs.company_size.is_none());
    assert!(prefs.monthly_budget.is_none());
    assert!(prefs.competitors.is_empty());
    assert!(!prefs.is_complete());
    assert_eq!(prefs.next_step(), WizardStep::Company);
}

#[test]
fn partial_preferences_resume_at_budget() {
    let prefs = Preferences::from_backend(&json!({
        "industry": "E-commerce",
        "company_size": "500-1000",
        "monthly_budget": null,
        "competitors": "Acme, Globex"
    }));
    assert_eq!(prefs.company_size, Some(CompanySize::Large));
    assert_eq!(prefs.next_step(), WizardStep::Budget);
    assert_eq!(prefs.missing_fields(), vec!["monthly_budget"]);
}

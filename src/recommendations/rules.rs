/// Keyword rule tables for classifying recommendation text.
///
/// Every table is an ordered slice: the first matching row wins. Matching is
/// a case-insensitive substring test against the full recommendation text.
///
/// - [`categorize_recommendation`] — action type, impact, effort
/// - [`generate_recommendation_title`] — short display title
/// - [`is_valid_recommendation`] — rejects chat pleasantries
use super::model::{ActionType, Level};

/// Maximum title length before the fallback title is truncated.
const TITLE_MAX_CHARS: usize = 60;

/// Minimum length (chars) for text to count as a recommendation.
const MIN_RECOMMENDATION_CHARS: usize = 10;

// ---------------------------------------------------------------------------
// Rule tables
// ---------------------------------------------------------------------------

/// Action-type keywords. Pausing is checked first so that "pause the
/// campaign and move its budget" reads as a pause, not a budget change.
const ACTION_RULES: &[(ActionType, &[&str])] = &[
    (
        ActionType::Pausing,
        &["pause", "stop running", "turn off", "disable", "halt", "deactivate"],
    ),
    (
        ActionType::Budget,
        &[
            "budget",
            "spend",
            "bid",
            "cost per",
            "cpc",
            "roas",
            "reallocate",
            "allocation",
        ],
    ),
    (
        ActionType::Creative,
        &[
            "creative",
            "ad copy",
            "headline",
            "image",
            "video",
            "visual",
            "messaging",
            "call to action",
        ],
    ),
    (
        ActionType::Targeting,
        &[
            "target",
            "audience",
            "demographic",
            "keyword",
            "geo",
            "segment",
            "lookalike",
        ],
    ),
    (
        ActionType::Analysis,
        &[
            "analyze",
            "analyse",
            "analysis",
            "review",
            "monitor",
            "investigate",
            "evaluate",
            "audit",
            "track",
        ],
    ),
];

const HIGH_IMPACT_WORDS: &[&str] = &[
    "significant",
    "major",
    "critical",
    "substantial",
    "dramatic",
    "urgent",
    "immediately",
];

const LOW_IMPACT_WORDS: &[&str] = &["minor", "slight", "small", "minimal", "marginal"];

const HIGH_EFFORT_WORDS: &[&str] = &[
    "overhaul",
    "restructure",
    "rebuild",
    "redesign",
    "comprehensive",
    "new campaign",
    "launch",
];

const LOW_EFFORT_WORDS: &[&str] = &[
    "pause", "adjust", "increase", "decrease", "reduce", "quick", "simple", "minor",
];

/// Known phrasings and the title they map to.
const TITLE_RULES: &[(&str, &str)] = &[
    ("re-evaluate targeting", "Optimize Audience Targeting"),
    ("refine targeting", "Optimize Audience Targeting"),
    ("review targeting", "Review Audience Targeting"),
    ("pause", "Pause Underperforming Campaign"),
    ("increase budget", "Increase Campaign Budget"),
    ("increase the budget", "Increase Campaign Budget"),
    ("increase daily budget", "Increase Campaign Budget"),
    ("reduce budget", "Reduce Campaign Budget"),
    ("decrease budget", "Reduce Campaign Budget"),
    ("reduce the budget", "Reduce Campaign Budget"),
    ("reallocate", "Reallocate Budget"),
    ("refresh creative", "Refresh Ad Creative"),
    ("new creative", "Refresh Ad Creative"),
    ("a/b test", "Run A/B Test"),
    ("ad copy", "Improve Ad Copy"),
    ("landing page", "Improve Landing Page"),
    ("bid", "Adjust Bidding Strategy"),
    ("keyword", "Refine Keyword Strategy"),
    ("analyze", "Analyze Campaign Performance"),
    ("monitor", "Monitor Campaign Performance"),
];

/// Conversational filler that marks chat pleasantries, not actions.
const FILLER_PHRASES: &[&str] = &[
    "let me know",
    "feel free to ask",
    "feel free to reach out",
    "happy to help",
    "hope this helps",
    "i hope this",
    "if you have any questions",
    "would you like me to",
    "do you want me to",
    "i can help",
    "here are some recommendations",
    "here's what i recommend",
];

/// At least one of these must appear for text to count as actionable.
const ACTION_KEYWORDS: &[&str] = &[
    "increase",
    "decrease",
    "reduce",
    "raise",
    "lower",
    "pause",
    "stop",
    "review",
    "test",
    "optimize",
    "optimise",
    "adjust",
    "reallocate",
    "shift",
    "launch",
    "refresh",
    "analyze",
    "analyse",
    "monitor",
    "target",
    "expand",
    "allocate",
    "scale",
    "improve",
    "update",
    "consider",
    "focus",
    "create",
    "implement",
    "refine",
    "re-evaluate",
    "budget",
];

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Output of [`categorize_recommendation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Categorization {
    pub action_type: ActionType,
    pub impact: Level,
    pub effort: Level,
}

/// Classify recommendation text into action type, impact, and effort.
pub fn categorize_recommendation(text: &str) -> Categorization {
    let lower = text.to_lowercase();

    let action_type = ACTION_RULES
        .iter()
        .find(|(_, words)| contains_any(&lower, words))
        .map(|(action, _)| *action)
        .unwrap_or(ActionType::Optimization);

    let impact = if contains_any(&lower, HIGH_IMPACT_WORDS) {
        Level::High
    } else if contains_any(&lower, LOW_IMPACT_WORDS) {
        Level::Low
    } else {
        Level::Medium
    };

    let effort = if contains_any(&lower, HIGH_EFFORT_WORDS) {
        Level::High
    } else if contains_any(&lower, LOW_EFFORT_WORDS) {
        Level::Low
    } else {
        Level::Medium
    };

    Categorization {
        action_type,
        impact,
        effort,
    }
}

/// Produce a short display title for recommendation text.
///
/// Known phrasings map to fixed titles; anything else uses the first line,
/// truncated to 60 characters.
pub fn generate_recommendation_title(text: &str) -> String {
    let lower = text.to_lowercase();

    if let Some((_, title)) = TITLE_RULES.iter().find(|(phrase, _)| lower.contains(phrase)) {
        return (*title).to_string();
    }

    let first_line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    truncate_chars(first_line, TITLE_MAX_CHARS)
}

/// Whether text reads like an actionable recommendation.
pub fn is_valid_recommendation(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_RECOMMENDATION_CHARS {
        return false;
    }

    let lower = trimmed.to_lowercase();
    if contains_any(&lower, FILLER_PHRASES) {
        return false;
    }

    contains_any(&lower, ACTION_KEYWORDS)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max).collect();
    format!("{}...", head.trim_end())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

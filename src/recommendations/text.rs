//! Heuristic parser for free-form recommendation text.
//!
//! Expects an AI chat response laid out as priority sections:
//!
//! ```text
//! High Priority
//! 1. Spring Sale
//! • Increase budget by 20%
//!
//! Medium Priority
//! 1. Brand Awareness
//! • Review targeting
//! ```
//!
//! Each numbered item becomes one recommendation: the first line names the
//! campaign, the remaining lines are the action text. When no section headers
//! are present the parser falls back to collecting bullet lines, tracking the
//! priority named by the most recent short header-like line.

use std::sync::LazyLock;

use regex::Regex;

use super::model::{Priority, Recommendation};
use super::rules::is_valid_recommendation;

/// A priority section header at line start, e.g. `High Priority`,
/// `### Medium Priority Recommendations:`, `**Low Priority:**`. Only the
/// header phrase is matched; text after it on the same line is section body.
static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:#{1,6}[ \t]*)?(?:\*\*|__)?(high|medium|low)[ -]priority\b(?:[ \t]+recommendations\b)?[ \t]*:?(?:\*\*|__)?[ \t]*:?",
    )
    .expect("section regex must compile")
});

/// A priority label leading a bullet, e.g. `High priority: ...`, `**Low:** ...`.
static INLINE_PRIORITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\*\*|__)?(high|medium|low)(?:[ -]priority)?[ \t]*:(?:\*\*|__)?[ \t]*")
        .expect("inline priority regex must compile")
});

/// The number prefix of a numbered item: `1.` or `1)` at line start.
static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*\d+[.)][ \t]+").expect("item regex must compile")
});

/// Bullet markers, including the en dash some chat UIs render for `-`.
const BULLETS: &[char] = &['•', '-', '*', '–'];

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Split `text` into recommendations by priority section and numbered item.
///
/// Returns records in section order; items that fail
/// [`is_valid_recommendation`] are dropped. Never fails: unrecognised input
/// yields an empty list.
pub fn parse_text_sections(text: &str) -> Vec<Recommendation> {
    let headers: Vec<_> = SECTION_RE.captures_iter(text).collect();

    if headers.is_empty() {
        log::debug!("no priority sections found, scanning bullet lines");
        return parse_bullets(text);
    }

    let mut recommendations = Vec::new();

    for (i, caps) in headers.iter().enumerate() {
        let Some(header) = caps.get(0) else {
            continue;
        };
        let priority = caps
            .get(1)
            .and_then(|m| Priority::parse(m.as_str()))
            .unwrap_or(Priority::Medium);

        let body_end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());
        let body = &text[header.end()..body_end];

        recommendations.extend(parse_section(body, priority));
    }

    recommendations
}

// ---------------------------------------------------------------------------
// Sections and items
// ---------------------------------------------------------------------------

fn parse_section(body: &str, priority: Priority) -> Vec<Recommendation> {
    let (same_line, rest) = body.split_once('\n').unwrap_or((body, ""));

    let mut recommendations = Vec::new();
    let inline = clean_markup(same_line);
    if is_valid_recommendation(inline) {
        recommendations.push(Recommendation::from_text(inline, priority, None));
    }
    recommendations.extend(section_items(rest, priority));
    recommendations
}

fn section_items(body: &str, priority: Priority) -> Vec<Recommendation> {
    let starts: Vec<_> = ITEM_RE.find_iter(body).collect();

    // A section without numbering still carries its bullets.
    if starts.is_empty() {
        return bullet_items(body, priority);
    }

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, m)| {
            let end = starts.get(i + 1).map(|n| n.start()).unwrap_or(body.len());
            parse_item(&body[m.end()..end], priority)
        })
        .collect()
}

/// Parse one numbered item: first line is the campaign, the rest the action.
fn parse_item(item: &str, priority: Priority) -> Option<Recommendation> {
    let mut lines = item.lines().map(str::trim).filter(|l| !l.is_empty());
    let first = lines.next()?;

    let action: Vec<&str> = lines.map(strip_bullet).filter(|l| !l.is_empty()).collect();

    let (campaign, text) = if action.is_empty() {
        (None, clean_markup(first).to_string())
    } else {
        (Some(clean_campaign(first)), action.join(" "))
    };

    if !is_valid_recommendation(&text) {
        log::debug!("skipping non-actionable item: {text}");
        return None;
    }

    Some(Recommendation::from_text(
        &text,
        priority,
        campaign.filter(|c| !c.is_empty()),
    ))
}

fn bullet_items(body: &str, priority: Priority) -> Vec<Recommendation> {
    body.lines()
        .map(str::trim)
        .filter(|l| l.starts_with(BULLETS))
        .filter_map(|l| bullet_item(l, priority))
        .collect()
}

/// One bullet line. A leading priority label overrides `priority`.
fn bullet_item(line: &str, priority: Priority) -> Option<Recommendation> {
    let item = strip_bullet(line);
    let (priority, text) = match INLINE_PRIORITY_RE.captures(item) {
        Some(caps) => {
            let labelled = caps
                .get(1)
                .and_then(|m| Priority::parse(m.as_str()))
                .unwrap_or(priority);
            let rest = caps.get(0).map_or(item, |m| &item[m.end()..]);
            (labelled, rest.trim())
        }
        None => (priority, item),
    };

    is_valid_recommendation(text).then(|| Recommendation::from_text(text, priority, None))
}

// ---------------------------------------------------------------------------
// Bullet fallback
// ---------------------------------------------------------------------------

/// Collect bullet lines, assigning the priority in effect at each line.
fn parse_bullets(text: &str) -> Vec<Recommendation> {
    let mut current = Priority::Medium;
    let mut recommendations = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with(BULLETS) {
            recommendations.extend(bullet_item(line, current));
        } else if let Some(priority) = header_priority(line) {
            current = priority;
        }
    }

    recommendations
}

/// A short non-bullet line that starts with a priority word, e.g. `High:` or
/// `**Low impact**`.
fn header_priority(line: &str) -> Option<Priority> {
    let cleaned = clean_markup(line);
    if cleaned.split_whitespace().count() > 4 {
        return None;
    }
    cleaned
        .split(|c: char| c.is_whitespace() || c == ':' || c == '-')
        .next()
        .and_then(Priority::parse)
}

// ---------------------------------------------------------------------------
// Line cleanup
// ---------------------------------------------------------------------------

fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(BULLETS).trim()
}

/// Strip markdown emphasis, heading marks, and trailing colons.
fn clean_markup(line: &str) -> &str {
    line.trim_matches(|c: char| matches!(c, '*' | '_' | '#' | '`' | ':') || c.is_whitespace())
}

fn clean_campaign(line: &str) -> String {
    let cleaned = clean_markup(line);
    let lower = cleaned.to_ascii_lowercase();
    let without_label = if lower.starts_with("campaign:") {
        &cleaned["campaign:".len()..]
    } else {
        cleaned
    };
    clean_markup(without_label).to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendations::model::ActionType;

    #[test]
    fn parses_numbered_items_per_section() {
        let text = "High Priority\n1. CampaignA\n• Increase budget by 20%\n\nMedium Priority\n1. CampaignB\n• Review targeting";
        let recs = parse_text_sections(text);

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[0].campaign.as_deref(), Some("CampaignA"));
        assert_eq!(recs[0].action_type, ActionType::Budget);
        assert_eq!(recs[0].description, "Increase budget by 20%");
        assert_eq!(recs[1].priority, Priority::Medium);
        assert_eq!(recs[1].campaign.as_deref(), Some("CampaignB"));
        assert_eq!(recs[1].action_type, ActionType::Targeting);
    }

    #[test]
    fn markdown_headers_and_campaign_emphasis_are_stripped() {
        let text = "## High Priority Recommendations:\n1. **Summer Promo**:\n- Pause the lowest performing ad set\n";
        let recs = parse_text_sections(text);

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].campaign.as_deref(), Some("Summer Promo"));
        assert_eq!(recs[0].action_type, ActionType::Pausing);
    }

    #[test]
    fn single_line_item_has_no_campaign() {
        let text = "Low Priority\n1. Refresh creative on the retargeting campaign\n";
        let recs = parse_text_sections(text);

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::Low);
        assert!(recs[0].campaign.is_none());
    }

    #[test]
    fn multi_line_action_is_joined() {
        let text = "High Priority\n1. Search Brand\n• Increase budget by 15%\n• then monitor CPA daily\n";
        let recs = parse_text_sections(text);

        assert_eq!(recs.len(), 1);
        assert_eq!(
            recs[0].description,
            "Increase budget by 15% then monitor CPA daily"
        );
    }

    #[test]
    fn section_without_numbering_uses_bullets() {
        let text = "Medium Priority\n• Reduce bids on mobile placements\n• Test a new headline\n";
        let recs = parse_text_sections(text);
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.priority == Priority::Medium));
    }

    #[test]
    fn bullet_fallback_tracks_last_header() {
        let text = "Some context first.\n• Review keyword match types\nHigh:\n• Pause the Display campaign today\n";
        let recs = parse_text_sections(text);

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].priority, Priority::Medium);
        assert_eq!(recs[1].priority, Priority::High);
    }

    #[test]
    fn en_dash_bullets_are_items() {
        let text = "Low:\n– Refresh the carousel creative next month\n";
        let recs = parse_text_sections(text);

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::Low);
        assert_eq!(recs[0].description, "Refresh the carousel creative next month");
    }

    #[test]
    fn action_on_header_line_is_kept() {
        let text = "**High Priority:** Pause the Display campaign immediately\n\n### Medium Priority: Review keyword match types for Search\n";
        let recs = parse_text_sections(text);

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[0].description, "Pause the Display campaign immediately");
        assert_eq!(recs[0].action_type, ActionType::Pausing);
        assert_eq!(recs[1].priority, Priority::Medium);
        assert_eq!(recs[1].description, "Review keyword match types for Search");
    }

    #[test]
    fn header_line_with_numbered_items_below() {
        let text = "## High Priority Recommendations:\n1. Spring Sale\n- Increase budget by 20%\n";
        let recs = parse_text_sections(text);

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].campaign.as_deref(), Some("Spring Sale"));
    }

    #[test]
    fn bullets_with_priority_prefix() {
        let text = "Here is what I suggest:\n- High priority: Pause the Display campaign immediately\n- Medium priority: Review keyword match types for Search\n- **Low:** Test a new headline on Brand";
        let recs = parse_text_sections(text);

        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[0].description, "Pause the Display campaign immediately");
        assert_eq!(recs[1].priority, Priority::Medium);
        assert_eq!(recs[1].description, "Review keyword match types for Search");
        assert_eq!(recs[2].priority, Priority::Low);
        assert_eq!(recs[2].description, "Test a new headline on Brand");
    }

    #[test]
    fn filler_items_are_dropped() {
        let text = "High Priority\n1. CampaignA\n• Increase budget by 20%\n2. Next steps\n• Let me know if you want more detail on budget\n";
        let recs = parse_text_sections(text);
        assert_eq!(recs.len(), 1);
    }

    #[test]
    fn unstructured_text_yields_nothing() {
        assert!(parse_text_sections("Thanks for the data, everything looks fine.").is_empty());
        assert!(parse_text_sections("").is_empty());
    }
}

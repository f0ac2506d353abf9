//! User preferences and the setup wizard's step order.
//!
//! The backend fills unknown preferences with placeholder literals ("Not
//! set", "N/A", a zero budget). Those are decoded into explicit unset states
//! (`None` / empty) so nothing downstream mistakes a placeholder for data.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Literal strings the backend uses for "no value".
const PLACEHOLDERS: &[&str] = &["", "not set", "n/a", "na", "none", "unknown", "null", "-"];

/// Company headcount bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanySize {
    Solo,
    Small,
    Medium,
    Large,
    Enterprise,
}

impl CompanySize {
    /// Parse a bucket name or a headcount range such as `"11-50"` / `"500+"`.
    pub fn parse(val: &str) -> Option<Self> {
        let lower = val.trim().to_ascii_lowercase();
        match lower.as_str() {
            "solo" | "1" | "just me" => return Some(Self::Solo),
            "small" | "startup" => return Some(Self::Small),
            "medium" | "mid" | "mid-size" => return Some(Self::Medium),
            "large" => return Some(Self::Large),
            "enterprise" => return Some(Self::Enterprise),
            _ => {}
        }

        // Headcount range: use the lower bound.
        let lower_bound: u32 = lower
            .split(['-', '+', ' '])
            .next()
            .and_then(|n| n.trim().parse().ok())?;
        Some(match lower_bound {
            0..=1 => Self::Solo,
            2..=50 => Self::Small,
            51..=250 => Self::Medium,
            251..=1000 => Self::Large,
            _ => Self::Enterprise,
        })
    }
}

/// Steps of the settings wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Company,
    Budget,
    Competitors,
    Review,
}

/// Marketing preferences of one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Preferences {
    pub industry: Option<String>,
    pub monthly_budget: Option<f64>,
    pub company_size: Option<CompanySize>,
    pub goals: Vec<String>,
    pub competitors: Vec<String>,
}

impl Preferences {
    /// Decode the backend's preferences object, mapping placeholders to unset.
    pub fn from_backend(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let field = |keys: &[&str]| keys.iter().find_map(|k| obj.get(*k));

        Self {
            industry: field(&["industry"]).and_then(text_value),
            monthly_budget: field(&["monthly_budget", "budget"]).and_then(budget_value),
            company_size: field(&["company_size"])
                .and_then(text_value)
                .and_then(|s| CompanySize::parse(&s)),
            goals: field(&["goals", "marketing_goals"])
                .map(list_value)
                .unwrap_or_default(),
            competitors: field(&["competitors"]).map(list_value).unwrap_or_default(),
        }
    }

    /// Names of the fields that are still unset.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.industry.is_none() {
            missing.push("industry");
        }
        if self.company_size.is_none() {
            missing.push("company_size");
        }
        if self.monthly_budget.is_none() {
            missing.push("monthly_budget");
        }
        if self.competitors.is_empty() {
            missing.push("competitors");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// First wizard step with unset fields, or `Review` when complete.
    pub fn next_step(&self) -> WizardStep {
        if self.industry.is_none() || self.company_size.is_none() {
            WizardStep::Company
        } else if self.monthly_budget.is_none() {
            WizardStep::Budget
        } else if self.competitors.is_empty() {
            WizardStep::Competitors
        } else {
            WizardStep::Review
        }
    }
}

fn is_placeholder(s: &str) -> bool {
    PLACEHOLDERS.contains(&s.trim().to_ascii_lowercase().as_str())
}

fn text_value(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    (!is_placeholder(s)).then(|| s.to_string())
}

/// Budgets arrive as numbers or strings such as `"$5,000"`.
fn budget_value(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s
            .trim()
            .trim_start_matches('$')
            .replace(',', "")
            .parse()
            .ok()?,
        _ => return None,
    };
    (amount > 0.0).then_some(amount)
}

/// Lists arrive as arrays of strings, arrays of `{name}` objects, or a
/// comma-separated string.
fn list_value(value: &Value) -> Vec<String> {
    let items: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(o) => o.get("name").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };

    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !is_placeholder(s))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholders_decode_to_unset() {
        let prefs = Preferences::from_backend(&json!({
            "industry": "Not set",
            "monthly_budget": 0,
            "company_size": "N/A",
            "goals": "",
            "competitors": []
        }));
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.next_step(), WizardStep::Company);
        assert_eq!(prefs.missing_fields().len(), 4);
    }

    #[test]
    fn full_preferences_reach_review() {
        let prefs = Preferences::from_backend(&json!({
            "industry": "Retail",
            "budget": "$5,000",
            "company_size": "11-50",
            "goals": "awareness, leads",
            "competitors": [{"name": "Acme"}, "Globex"]
        }));
        assert_eq!(prefs.industry.as_deref(), Some("Retail"));
        assert_eq!(prefs.monthly_budget, Some(5000.0));
        assert_eq!(prefs.company_size, Some(CompanySize::Small));
        assert_eq!(prefs.goals, vec!["awareness", "leads"]);
        assert_eq!(prefs.competitors, vec!["Acme", "Globex"]);
        assert!(prefs.is_complete());
        assert_eq!(prefs.next_step(), WizardStep::Review);
    }

    #[test]
    fn wizard_stops_at_first_gap() {
        let prefs = Preferences {
            industry: Some("SaaS".into()),
            company_size: Some(CompanySize::Medium),
            monthly_budget: Some(1200.0),
            ..Preferences::default()
        };
        assert_eq!(prefs.next_step(), WizardStep::Competitors);
        assert_eq!(prefs.missing_fields(), vec!["competitors"]);
    }

    #[test]
    fn company_size_parsing() {
        assert_eq!(CompanySize::parse("Enterprise"), Some(CompanySize::Enterprise));
        assert_eq!(CompanySize::parse("51-200"), Some(CompanySize::Medium));
        assert_eq!(CompanySize::parse("1000+"), Some(CompanySize::Large));
        assert_eq!(CompanySize::parse("5000+"), Some(CompanySize::Enterprise));
        assert_eq!(CompanySize::parse("lots"), None);
    }

    #[test]
    fn non_object_is_default() {
        assert_eq!(Preferences::from_backend(&json!(null)), Preferences::default());
    }
}

//! Recommendation record and its classification enums.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Priority bucket of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort weight: high 3, medium 2, low 1.
    pub fn weight(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    /// Parse a priority label, ignoring case and surrounding whitespace.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

// ---------------------------------------------------------------------------
// Action type
// ---------------------------------------------------------------------------

/// Coarse classification of what a recommendation asks the user to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Pausing,
    Budget,
    Creative,
    Targeting,
    Analysis,
    /// No keyword matched.
    Optimization,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pausing => write!(f, "pausing"),
            Self::Budget => write!(f, "budget"),
            Self::Creative => write!(f, "creative"),
            Self::Targeting => write!(f, "targeting"),
            Self::Analysis => write!(f, "analysis"),
            Self::Optimization => write!(f, "optimization"),
        }
    }
}

/// Three-step scale shared by impact and effort estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    Medium,
    Low,
}

impl Level {
    /// Fixed time estimate for an effort level.
    pub fn estimated_time(self) -> &'static str {
        match self {
            Self::Low => "15 minutes",
            Self::Medium => "1-2 hours",
            Self::High => "1-2 days",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// A structured suggestion recovered from an AI response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// `"{priority}-{index}-{unix_millis}"`, assigned after sorting.
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub action_type: ActionType,
    pub impact: Level,
    pub effort: Level,
    pub estimated_time: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub campaign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub competitor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub prediction: Option<String>,
}

impl Recommendation {
    /// Build a record from action text, classifying it with the rule tables.
    ///
    /// The id is left empty until the final ordering is known.
    pub fn from_text(description: &str, priority: Priority, campaign: Option<String>) -> Self {
        let description = description.trim().to_string();
        let class = super::rules::categorize_recommendation(&description);

        Self {
            id: String::new(),
            title: super::rules::generate_recommendation_title(&description),
            description,
            priority,
            action_type: class.action_type,
            impact: class.impact,
            effort: class.effort,
            estimated_time: class.effort.estimated_time().to_string(),
            campaign,
            competitor: None,
            reasoning: None,
            prediction: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

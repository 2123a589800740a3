//! Triage result model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confidence reported by the heuristic tier.
pub const HEURISTIC_CONFIDENCE: f32 = 0.5;

/// Event classification bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Email,
    Meeting,
    Task,
    Notification,
    Update,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Meeting => write!(f, "meeting"),
            Self::Task => write!(f, "task"),
            Self::Notification => write!(f, "notification"),
            Self::Update => write!(f, "update"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "meeting" => Ok(Self::Meeting),
            "task" => Ok(Self::Task),
            "notification" => Ok(Self::Notification),
            "update" => Ok(Self::Update),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Structured triage decision for one event. Produced once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageResult {
    /// 1 (ignorable) to 5 (drop everything). Out-of-range values are
    /// clamped at the boundary, not rejected.
    pub urgency: u8,
    /// Whether the event calls for work at all.
    pub actionable: bool,
    /// One-line summary.
    pub summary: String,
    /// Concrete action items, in the order they were extracted.
    pub action_items: Vec<String>,
    /// People mentioned or involved.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub key_people: BTreeSet<String>,
    /// Deadline, if one was detected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// Classification bucket.
    pub category: Category,
    /// Freeform tags.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Backend-reported confidence clamped to [0.1, 1.0]; fixed 0.5 for
    /// the heuristic tier.
    pub confidence: f32,
}

/// Clamp a raw urgency score into the valid range.
pub fn clamp_urgency(raw: i64) -> u8 {
    raw.clamp(1, 5) as u8
}

/// Clamp a backend-reported confidence into the valid range.
pub fn clamp_confidence(raw: f32) -> f32 {
    if raw.is_nan() {
        return 0.1;
    }
    raw.clamp(0.1, 1.0)
}

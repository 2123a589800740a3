//! Proposed-action model.

use serde::{Deserialize, Serialize};

/// The kind of follow-on effect an action performs.
///
/// Closed set plus an explicit forward-compatibility branch: an
/// unrecognized type string round-trips as `Other` and executes as a
/// successful no-op rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    /// Propose a meeting on the calendar.
    CalendarEvent,
    /// Sync the task to the external tracker.
    NotionSync,
    /// Schedule a follow-up reminder.
    FollowUp,
    /// Unknown/forward-compatible type, label preserved.
    Other(String),
}

impl From<String> for ActionType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "calendar_event" => Self::CalendarEvent,
            "notion_sync" => Self::NotionSync,
            "follow_up" => Self::FollowUp,
            _ => Self::Other(s),
        }
    }
}

impl From<ActionType> for String {
    fn from(t: ActionType) -> Self {
        t.to_string()
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CalendarEvent => write!(f, "calendar_event"),
            Self::NotionSync => write!(f, "notion_sync"),
            Self::FollowUp => write!(f, "follow_up"),
            Self::Other(label) => write!(f, "{}", label),
        }
    }
}

/// How important a proposed action is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    Low,
    Medium,
    High,
}

/// A follow-on action derived from a task. Lives only for the pipeline
/// invocation unless the caller persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedAction {
    /// What kind of effect this is.
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Importance tier.
    pub priority: ActionPriority,
    /// Human-readable description.
    pub description: String,
    /// Type-specific structured payload.
    pub data: serde_json::Value,
    /// Whether this action may run without human confirmation.
    pub auto_execute: bool,
}

/// Outcome of executing one proposed action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// Whether the effect was applied (or safely no-opped).
    pub success: bool,
    /// What happened.
    pub message: String,
    /// Failure detail, present only when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    /// A successful result.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
        }
    }

    /// A failed result. Failures are recorded, never thrown.
    pub fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_type_serializes_as_plain_string() {
        let json = serde_json::to_string(&ActionType::CalendarEvent).unwrap();
        assert_eq!(json, "\"calendar_event\"");
        let json = serde_json::to_string(&ActionType::NotionSync).unwrap();
        assert_eq!(json, "\"notion_sync\"");
    }

    #[test]
    fn unknown_type_round_trips_as_other() {
        let parsed: ActionType = serde_json::from_str("\"teleport\"").unwrap();
        assert_eq!(parsed, ActionType::Other("teleport".into()));
        let json = serde_json::to_string(&parsed).unwrap();
        assert_eq!(json, "\"teleport\"");
    }

    #[test]
    fn known_types_round_trip() {
        for t in [
            ActionType::CalendarEvent,
            ActionType::NotionSync,
            ActionType::FollowUp,
        ] {
            let json = serde_json::to_string(&t).unwrap();
            let parsed: ActionType = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, t);
        }
    }

    #[test]
    fn priority_ordering() {
        assert!(ActionPriority::High > ActionPriority::Medium);
        assert!(ActionPriority::Medium > ActionPriority::Low);
    }

    #[test]
    fn action_result_constructors() {
        let ok = ActionResult::ok("synced");
        assert!(ok.success);
        assert!(ok.error.is_none());

        let failed = ActionResult::failed("sync failed", "rejected by tracker");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("rejected by tracker"));
    }

    #[test]
    fn proposed_action_serde_uses_type_key() {
        let action = ProposedAction {
            action_type: ActionType::FollowUp,
            priority: ActionPriority::Low,
            description: "check back".into(),
            data: serde_json::json!({"delay_days": 14}),
            auto_execute: true,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "follow_up");
        assert_eq!(json["priority"], "low");
        assert_eq!(json["auto_execute"], true);
    }
}

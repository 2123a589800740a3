//! Event envelope model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// Chat message (Slack-style).
    Chat,
    /// Email arrival.
    Email,
    /// Calendar change.
    Calendar,
    /// Meeting transcript ready.
    Transcript,
    /// Document store change.
    Document,
}

impl std::fmt::Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chat => write!(f, "chat"),
            Self::Email => write!(f, "email"),
            Self::Calendar => write!(f, "calendar"),
            Self::Transcript => write!(f, "transcript"),
            Self::Document => write!(f, "document"),
        }
    }
}

impl std::str::FromStr for EventSource {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            "email" => Ok(Self::Email),
            "calendar" => Ok(Self::Calendar),
            "transcript" => Ok(Self::Transcript),
            "document" => Ok(Self::Document),
            _ => Err(format!("Unknown event source: {}", s)),
        }
    }
}

/// A normalized event record. Immutable once created; the orchestrator
/// appends it to its event log and nothing mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique ID, generated at normalization time.
    pub id: Uuid,
    /// Originating system.
    pub source: EventSource,
    /// Provider-specific event kind (e.g. "message", "transcript_ready").
    pub kind: String,
    /// Opaque key-value payload, size-bounded by the normalizer.
    pub payload: serde_json::Map<String, serde_json::Value>,
    /// When the event happened in the external system.
    pub occurred_at: DateTime<Utc>,
    /// When the hub received it.
    pub received_at: DateTime<Utc>,
    /// Payload fields the normalizer truncated. Non-empty means later
    /// stages operate on degraded context and should say so.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub truncated_fields: Vec<String>,
}

impl Event {
    /// Fetch a payload field as a string slice, if present and a string.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }

    /// Whether the normalizer had to truncate any payload field.
    pub fn degraded(&self) -> bool {
        !self.truncated_fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_source_serde_snake_case() {
        let json = serde_json::to_string(&EventSource::Transcript).unwrap();
        assert_eq!(json, "\"transcript\"");

        let parsed: EventSource = serde_json::from_str("\"email\"").unwrap();
        assert_eq!(parsed, EventSource::Email);
    }

    #[test]
    fn event_source_round_trips_display() {
        for source in [
            EventSource::Chat,
            EventSource::Email,
            EventSource::Calendar,
            EventSource::Transcript,
            EventSource::Document,
        ] {
            let parsed: EventSource = source.to_string().parse().unwrap();
            assert_eq!(parsed, source);
        }
    }

    #[test]
    fn unknown_source_rejected() {
        assert!("webhook".parse::<EventSource>().is_err());
    }

    #[test]
    fn payload_str_reads_string_fields_only() {
        let mut payload = serde_json::Map::new();
        payload.insert("subject".into(), serde_json::json!("Status update"));
        payload.insert("count".into(), serde_json::json!(3));

        let event = Event {
            id: Uuid::new_v4(),
            source: EventSource::Email,
            kind: "message".into(),
            payload,
            occurred_at: Utc::now(),
            received_at: Utc::now(),
            truncated_fields: vec![],
        };

        assert_eq!(event.payload_str("subject"), Some("Status update"));
        assert!(event.payload_str("count").is_none());
        assert!(event.payload_str("missing").is_none());
        assert!(!event.degraded());
    }
}

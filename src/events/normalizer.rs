//! Event normalizer — raw provider payloads in, bounded envelopes out.
//!
//! The normalizer is a pure transform: no I/O, no stored state beyond its
//! config. Malformed-but-parseable input never errors; missing fields get
//! defaults and oversized fields get a truncation marker. The only rejection
//! is a payload that is not a JSON object at all.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::NormalizerConfig;
use crate::error::PipelineError;
use crate::events::model::{Event, EventSource};

/// Marker substituted for payload fields that exceed the byte cap.
pub const TRUNCATION_MARKER: &str = "[truncated: field exceeded payload cap]";

/// Payload keys consulted for the event's external timestamp, in order.
const OCCURRED_AT_KEYS: [&str; 3] = ["occurred_at", "timestamp", "date"];

/// Payload keys consulted for the event kind, in order.
const KIND_KEYS: [&str; 2] = ["kind", "type"];

/// Converts raw provider payloads into uniform [`Event`] records.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Create a normalizer with the given config.
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalize a raw payload into an [`Event`].
    ///
    /// Errors only when `raw` is not a JSON object — anything object-shaped
    /// always produces an event.
    pub fn normalize(
        &self,
        source: EventSource,
        raw: serde_json::Value,
    ) -> Result<Event, PipelineError> {
        let serde_json::Value::Object(mut payload) = raw else {
            return Err(PipelineError::MalformedEvent(json_type_name(&raw).into()));
        };

        let received_at = Utc::now();
        let kind = extract_kind(&payload, source);
        let occurred_at = extract_occurred_at(&payload).unwrap_or(received_at);

        // Bound every field so downstream prompt building and logging see a
        // capped payload. Truncation is recorded, never silent.
        let mut truncated_fields = Vec::new();
        for (key, value) in payload.iter_mut() {
            if field_byte_len(value) > self.config.max_field_bytes {
                *value = serde_json::Value::String(TRUNCATION_MARKER.to_string());
                truncated_fields.push(key.clone());
            }
        }

        if !truncated_fields.is_empty() {
            warn!(
                source = %source,
                fields = ?truncated_fields,
                cap = self.config.max_field_bytes,
                "Truncated oversized payload fields"
            );
        }

        let event = Event {
            id: Uuid::new_v4(),
            source,
            kind,
            payload,
            occurred_at,
            received_at,
            truncated_fields,
        };

        debug!(
            id = %event.id,
            source = %event.source,
            kind = %event.kind,
            "Normalized event"
        );

        Ok(event)
    }
}

/// Event kind from payload, falling back to a per-source default.
fn extract_kind(payload: &serde_json::Map<String, serde_json::Value>, source: EventSource) -> String {
    for key in KIND_KEYS {
        if let Some(kind) = payload.get(key).and_then(|v| v.as_str())
            && !kind.is_empty()
        {
            return kind.to_string();
        }
    }
    match source {
        EventSource::Chat => "message".into(),
        EventSource::Email => "message".into(),
        EventSource::Calendar => "calendar_change".into(),
        EventSource::Transcript => "transcript_ready".into(),
        EventSource::Document => "document_change".into(),
    }
}

/// External timestamp from payload, if any field parses as RFC 3339.
fn extract_occurred_at(
    payload: &serde_json::Map<String, serde_json::Value>,
) -> Option<DateTime<Utc>> {
    for key in OCCURRED_AT_KEYS {
        if let Some(raw) = payload.get(key).and_then(|v| v.as_str())
            && let Ok(parsed) = DateTime::parse_from_rfc3339(raw)
        {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    None
}

/// Approximate byte size of a payload field.
///
/// Strings are measured directly; structured values by their serialized
/// length (attachment blobs usually arrive as base64 strings or nested maps).
fn field_byte_len(value: &serde_json::Value) -> usize {
    match value {
        serde_json::Value::String(s) => s.len(),
        other => serde_json::to_string(other).map(|s| s.len()).unwrap_or(0),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

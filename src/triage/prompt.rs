//! Prompt construction and response parsing for backend triage tiers.
//!
//! The prompt is built deterministically from the event's source, kind,
//! payload, and timestamp. The response must match a fixed schema; anything
//! that fails validation is a `MalformedResponse` tier failure — missing
//! required fields are never guessed.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::error::TriageError;
use crate::events::model::Event;
use crate::triage::model::{clamp_confidence, clamp_urgency, Category, TriageResult};

/// Max bytes of any single payload field included in the prompt.
const PROMPT_FIELD_MAX_CHARS: usize = 1000;

// ── Prompt construction ─────────────────────────────────────────────

/// Build the triage prompt for an event.
///
/// Deterministic: same event, same prompt. Payload fields are emitted in
/// the map's key order with values truncated for token efficiency.
pub fn build_triage_prompt(event: &Event) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str(
        "You are an event triage engine for a productivity hub. \
         Classify the event below.\n\n\
         Respond with ONLY a JSON object of this shape:\n\
         {\"urgency\": 1-5, \"actionable\": true/false, \"summary\": \"...\", \
         \"action_items\": [\"...\"], \"key_people\": [\"...\"], \
         \"deadline\": \"RFC3339 timestamp or omit\", \
         \"category\": \"email|meeting|task|notification|update\", \
         \"tags\": [\"...\"], \"confidence\": 0.0-1.0}\n\n\
         Rules:\n\
         - Summaries are one sentence\n\
         - action_items are concrete and imperative; empty list if nothing to do\n\
         - Omit deadline unless one is stated or strongly implied\n\
         - urgency 5 means drop-everything, 1 means ignorable\n\n",
    );

    prompt.push_str(&format!("Source: {}\n", event.source));
    prompt.push_str(&format!("Kind: {}\n", event.kind));
    prompt.push_str(&format!("Occurred: {}\n", event.occurred_at.to_rfc3339()));
    if event.degraded() {
        prompt.push_str(&format!(
            "Note: fields truncated at intake: {}\n",
            event.truncated_fields.join(", ")
        ));
    }

    prompt.push_str("\nPayload:\n");
    for (key, value) in &event.payload {
        let rendered = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let preview: String = rendered.chars().take(PROMPT_FIELD_MAX_CHARS).collect();
        prompt.push_str(&format!("  {}: {}\n", key, preview));
    }

    prompt
}

// ── Response parsing ────────────────────────────────────────────────

/// Backend triage response schema. Six required fields; people, deadline,
/// and tags may be omitted.
#[derive(Debug, serde::Deserialize)]
struct TriageResponse {
    urgency: i64,
    actionable: bool,
    summary: String,
    action_items: Vec<String>,
    #[serde(default)]
    key_people: Vec<String>,
    #[serde(default)]
    deadline: Option<String>,
    category: String,
    #[serde(default)]
    tags: Vec<String>,
    confidence: f32,
}

/// Parse a backend response into a [`TriageResult`].
///
/// Out-of-range numerics are clamped per the data model; everything else is
/// strict and fails as [`TriageError::MalformedResponse`].
pub fn parse_triage_response(provider: &str, raw: &str) -> Result<TriageResult, TriageError> {
    let malformed = |reason: String| TriageError::MalformedResponse {
        provider: provider.to_string(),
        reason,
    };

    let json_str = extract_json_object(raw);
    let response: TriageResponse = serde_json::from_str(&json_str)
        .map_err(|e| malformed(format!("JSON parse error: {e}")))?;

    let category: Category = response
        .category
        .parse()
        .map_err(|e: String| malformed(e))?;

    let deadline = match response.deadline.as_deref() {
        None | Some("") => None,
        Some(raw_deadline) => Some(
            DateTime::parse_from_rfc3339(raw_deadline)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| malformed(format!("bad deadline '{raw_deadline}': {e}")))?,
        ),
    };

    Ok(TriageResult {
        urgency: clamp_urgency(response.urgency),
        actionable: response.actionable,
        summary: response.summary,
        action_items: response.action_items,
        key_people: BTreeSet::from_iter(response.key_people),
        deadline,
        category,
        tags: BTreeSet::from_iter(response.tags),
        confidence: clamp_confidence(response.confidence),
    })
}

/// Extract a JSON object from backend output (handles markdown wrapping).
fn extract_json_object(text: &str) -> String {
    let trimmed = text.trim();

    // Already a JSON object
    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    // Wrapped in markdown code block
    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        if let Some(end) = after.find("```") {
            return after[..end].trim().to_string();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return inner.to_string();
            }
        }
    }

    // Try to find object bounds
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && end > start
    {
        return trimmed[start..=end].to_string();
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::model::EventSource;
    use uuid::Uuid;

    fn make_event(payload: serde_json::Value) -> Event {
        let serde_json::Value::Object(payload) = payload else {
            panic!("test payload must be an object");
        };
        Event {
            id: Uuid::new_v4(),
            source: EventSource::Email,
            kind: "message".into(),
            payload,
            occurred_at: "2025-06-01T10:30:00Z".parse().unwrap(),
            received_at: Utc::now(),
            truncated_fields: vec![],
        }
    }

    // ── Prompt construction tests ───────────────────────────────────

    #[test]
    fn prompt_includes_envelope_metadata() {
        let event = make_event(serde_json::json!({
            "subject": "Re: Launch plan",
            "from": "alice@company.com",
        }));
        let prompt = build_triage_prompt(&event);
        assert!(prompt.contains("Source: email"));
        assert!(prompt.contains("Kind: message"));
        assert!(prompt.contains("2025-06-01T10:30:00"));
        assert!(prompt.contains("Re: Launch plan"));
        assert!(prompt.contains("alice@company.com"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let event = make_event(serde_json::json!({
            "subject": "Weekly sync",
            "body": "Agenda attached",
        }));
        assert_eq!(build_triage_prompt(&event), build_triage_prompt(&event));
    }

    #[test]
    fn prompt_truncates_long_fields() {
        let event = make_event(serde_json::json!({"body": "y".repeat(5000)}));
        let prompt = build_triage_prompt(&event);
        assert!(prompt.len() < 3000);
    }

    #[test]
    fn prompt_reports_degraded_context() {
        let mut event = make_event(serde_json::json!({"subject": "hi"}));
        event.truncated_fields = vec!["attachment".into()];
        let prompt = build_triage_prompt(&event);
        assert!(prompt.contains("truncated at intake: attachment"));
    }

    // ── Response parsing tests ──────────────────────────────────────

    #[test]
    fn parse_full_response() {
        let raw = r#"{
            "urgency": 4, "actionable": true,
            "summary": "Outage needs a fix",
            "action_items": ["Restart the ingest service", "Write incident report"],
            "key_people": ["Alice", "Bob"],
            "deadline": "2025-06-02T09:00:00Z",
            "category": "task", "tags": ["incident"], "confidence": 0.9
        }"#;
        let result = parse_triage_response("anthropic", raw).unwrap();
        assert_eq!(result.urgency, 4);
        assert!(result.actionable);
        assert_eq!(result.action_items.len(), 2);
        assert_eq!(result.action_items[0], "Restart the ingest service");
        assert!(result.key_people.contains("Alice"));
        assert!(result.deadline.is_some());
        assert_eq!(result.category, Category::Task);
        assert!((result.confidence - 0.9).abs() < 0.01);
    }

    #[test]
    fn parse_minimal_response_defaults_optionals() {
        let raw = r#"{"urgency": 1, "actionable": false, "summary": "Newsletter",
                      "action_items": [], "category": "notification", "confidence": 0.8}"#;
        let result = parse_triage_response("anthropic", raw).unwrap();
        assert!(result.key_people.is_empty());
        assert!(result.tags.is_empty());
        assert!(result.deadline.is_none());
    }

    #[test]
    fn parse_clamps_out_of_range_numerics() {
        let raw = r#"{"urgency": 11, "actionable": true, "summary": "x",
                      "action_items": ["do it"], "category": "task", "confidence": 2.0}"#;
        let result = parse_triage_response("openai", raw).unwrap();
        assert_eq!(result.urgency, 5);
        assert!((result.confidence - 1.0).abs() < 0.01);

        let raw = r#"{"urgency": -2, "actionable": true, "summary": "x",
                      "action_items": ["do it"], "category": "task", "confidence": 0.0}"#;
        let result = parse_triage_response("openai", raw).unwrap();
        assert_eq!(result.urgency, 1);
        assert!((result.confidence - 0.1).abs() < 0.01);
    }

    #[test]
    fn parse_missing_required_field_fails() {
        // No urgency
        let raw = r#"{"actionable": true, "summary": "x", "action_items": [],
                      "category": "task", "confidence": 0.5}"#;
        assert!(matches!(
            parse_triage_response("anthropic", raw),
            Err(TriageError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn parse_unknown_category_fails() {
        let raw = r#"{"urgency": 2, "actionable": false, "summary": "x",
                      "action_items": [], "category": "spam", "confidence": 0.5}"#;
        assert!(matches!(
            parse_triage_response("anthropic", raw),
            Err(TriageError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn parse_bad_deadline_fails() {
        let raw = r#"{"urgency": 2, "actionable": true, "summary": "x",
                      "action_items": ["y"], "deadline": "next tuesday",
                      "category": "task", "confidence": 0.5}"#;
        assert!(matches!(
            parse_triage_response("anthropic", raw),
            Err(TriageError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn parse_empty_deadline_treated_as_absent() {
        let raw = r#"{"urgency": 2, "actionable": true, "summary": "x",
                      "action_items": ["y"], "deadline": "",
                      "category": "task", "confidence": 0.5}"#;
        let result = parse_triage_response("anthropic", raw).unwrap();
        assert!(result.deadline.is_none());
    }

    #[test]
    fn parse_response_wrapped_in_markdown() {
        let raw = "Here's my classification:\n```json\n{\"urgency\": 3, \"actionable\": true, \"summary\": \"Review PR\", \"action_items\": [\"Review PR #42\"], \"category\": \"task\", \"confidence\": 0.7}\n```";
        let result = parse_triage_response("anthropic", raw).unwrap();
        assert_eq!(result.urgency, 3);
        assert_eq!(result.action_items, vec!["Review PR #42".to_string()]);
    }

    #[test]
    fn parse_response_with_surrounding_text() {
        let raw = "Based on the event: {\"urgency\": 1, \"actionable\": false, \"summary\": \"FYI\", \"action_items\": [], \"category\": \"update\", \"confidence\": 0.6} as requested.";
        let result = parse_triage_response("anthropic", raw).unwrap();
        assert!(!result.actionable);
    }

    #[test]
    fn parse_non_json_fails() {
        assert!(parse_triage_response("anthropic", "I cannot classify this.").is_err());
    }

    // ── JSON extraction tests ───────────────────────────────────────

    #[test]
    fn extract_json_direct_object() {
        let input = r#"{"urgency": 1}"#;
        assert_eq!(extract_json_object(input), input);
    }

    #[test]
    fn extract_json_from_markdown_block() {
        let input = "```json\n{\"urgency\": 2}\n```";
        let result = extract_json_object(input);
        assert!(result.starts_with('{'));
        assert!(result.contains("urgency"));
    }

    #[test]
    fn extract_json_embedded_in_text() {
        let input = "My analysis: {\"urgency\": 3} done.";
        let result = extract_json_object(input);
        assert!(result.starts_with('{'));
        assert!(result.ends_with('}'));
    }
}

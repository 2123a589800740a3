//! Deterministic heuristic triage — the tier that never fails.
//!
//! Keyword lexicons over the event's text fields decide urgency and
//! actionability. No network, no model, no failure mode. This is the
//! guaranteed floor under the backend tiers: availability over accuracy.

use std::collections::BTreeSet;

use regex::Regex;

use crate::events::model::{Event, EventSource};
use crate::triage::model::{Category, TriageResult, HEURISTIC_CONFIDENCE};

/// Payload fields scanned for triage text, in order.
const TEXT_KEYS: [&str; 8] = [
    "subject",
    "title",
    "body",
    "text",
    "content",
    "message",
    "summary",
    "description",
];

/// Payload fields holding a single person.
const PERSON_KEYS: [&str; 3] = ["from", "sender", "organizer"];

/// Payload fields holding a list of people.
const PERSON_LIST_KEYS: [&str; 3] = ["attendees", "participants", "to"];

/// Max chars of scanned text used for the fallback summary.
const SUMMARY_MAX_CHARS: usize = 140;

/// Keyword-based triage with fixed confidence.
pub struct HeuristicAnalyzer {
    critical: Regex,
    request: Regex,
    meeting: Regex,
}

impl Default for HeuristicAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicAnalyzer {
    /// Build the analyzer with its compiled lexicons.
    pub fn new() -> Self {
        Self {
            // Urgency lexicon — any hit pins urgency to 5.
            critical: Regex::new(r"(?i)\b(urgent|asap|critical|emergency)\b")
                .expect("critical lexicon is a valid regex"),
            // Request language — somebody is asking for work.
            request: Regex::new(
                r"(?i)(\bcan you\b|\bcould you\b|\bplease\b|\baction required\b|\bneeds? to\b|\bby (eod|end of day|tomorrow|monday|friday)\b|\breview\b|\bfollow[- ]?up\b|\?)",
            )
            .expect("request lexicon is a valid regex"),
            // Meeting language — tags the result so scheduling rules fire.
            meeting: Regex::new(r"(?i)\b(meeting|sync|standup|stand-up|1:1|call|huddle)\b")
                .expect("meeting lexicon is a valid regex"),
        }
    }

    /// Analyze an event. Never fails, never calls out.
    pub fn analyze(&self, event: &Event) -> TriageResult {
        let text = gather_text(event);

        let (urgency, actionable) = if self.critical.is_match(&text) {
            (5, true)
        } else if self.request.is_match(&text) {
            (3, true)
        } else {
            (1, false)
        };

        let summary = summarize(event, &text);
        let action_items = if actionable {
            vec![summary.clone()]
        } else {
            Vec::new()
        };

        let mut tags = BTreeSet::new();
        if self.meeting.is_match(&text) {
            tags.insert("meeting".to_string());
        }

        TriageResult {
            urgency,
            actionable,
            summary,
            action_items,
            key_people: gather_people(event),
            deadline: None,
            category: category_for(event.source),
            tags,
            confidence: HEURISTIC_CONFIDENCE,
        }
    }
}

/// Concatenate the event's known text fields.
fn gather_text(event: &Event) -> String {
    let mut parts = Vec::new();
    for key in TEXT_KEYS {
        if let Some(value) = event.payload_str(key)
            && !value.is_empty()
        {
            parts.push(value);
        }
    }
    parts.join("\n")
}

/// People from single-person and list-shaped payload fields.
fn gather_people(event: &Event) -> BTreeSet<String> {
    let mut people = BTreeSet::new();
    for key in PERSON_KEYS {
        if let Some(person) = event.payload_str(key)
            && !person.is_empty()
        {
            people.insert(person.to_string());
        }
    }
    for key in PERSON_LIST_KEYS {
        if let Some(list) = event.payload.get(key).and_then(|v| v.as_array()) {
            for entry in list {
                if let Some(person) = entry.as_str()
                    && !person.is_empty()
                {
                    people.insert(person.to_string());
                }
            }
        }
    }
    people
}

/// Subject/title if present, otherwise a prefix of the gathered text.
fn summarize(event: &Event, text: &str) -> String {
    for key in ["subject", "title"] {
        if let Some(value) = event.payload_str(key)
            && !value.is_empty()
        {
            return value.to_string();
        }
    }
    if text.is_empty() {
        return format!("{} {}", event.source, event.kind);
    }
    text.lines()
        .next()
        .unwrap_or(text)
        .chars()
        .take(SUMMARY_MAX_CHARS)
        .collect()
}

fn category_for(source: EventSource) -> Category {
    match source {
        EventSource::Email => Category::Email,
        EventSource::Calendar | EventSource::Transcript => Category::Meeting,
        EventSource::Chat => Category::Notification,
        EventSource::Document => Category::Update,
    }
}

//! Triage engine — ordered tier chain over strategy-typed tiers.
//!
//! Tiers are tried in configuration order; the first well-formed result
//! wins outright. A tier failure (timeout, transport error, malformed
//! response) falls through immediately — zero retries within a tier, by
//! design: reasoning calls are expensive, and the heuristic floor makes
//! availability cheap.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::backends::ReasoningBackend;
use crate::config::TriageConfig;
use crate::error::{BackendError, TriageError};
use crate::events::model::Event;
use crate::triage::heuristic::HeuristicAnalyzer;
use crate::triage::model::TriageResult;
use crate::triage::prompt::{build_triage_prompt, parse_triage_response};

/// One candidate triage strategy in the fallback chain.
#[async_trait]
pub trait TriageTier: Send + Sync {
    /// Tier label for logging.
    fn name(&self) -> &str;

    /// Attempt to triage the event. An `Err` means "fall through".
    async fn analyze(&self, event: &Event) -> Result<TriageResult, TriageError>;
}

/// A tier backed by a reasoning backend: prompt → complete → strict parse.
pub struct BackendTier {
    backend: Arc<dyn ReasoningBackend>,
    timeout: Duration,
}

impl BackendTier {
    /// Wrap a reasoning backend with the per-call timeout.
    pub fn new(backend: Arc<dyn ReasoningBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }
}

#[async_trait]
impl TriageTier for BackendTier {
    fn name(&self) -> &str {
        self.backend.name()
    }

    async fn analyze(&self, event: &Event) -> Result<TriageResult, TriageError> {
        let prompt = build_triage_prompt(event);

        let raw = match tokio::time::timeout(self.timeout, self.backend.complete(&prompt)).await {
            Err(_) => {
                return Err(TriageError::Backend(BackendError::Timeout {
                    provider: self.backend.name().to_string(),
                    timeout: self.timeout,
                }));
            }
            Ok(result) => result?,
        };

        parse_triage_response(self.backend.name(), &raw)
    }
}

/// The fallback chain: backend tiers in configuration order, then the
/// heuristic floor. `analyze` is total — the caller never sees an error.
pub struct TriageEngine {
    tiers: Vec<Box<dyn TriageTier>>,
    fallback: HeuristicAnalyzer,
}

impl TriageEngine {
    /// Build the engine from optional primary/secondary backends.
    ///
    /// Tier order is decided purely by configuration presence: an
    /// unconfigured backend is simply absent from the chain.
    pub fn new(
        config: &TriageConfig,
        primary: Option<Arc<dyn ReasoningBackend>>,
        secondary: Option<Arc<dyn ReasoningBackend>>,
    ) -> Self {
        let mut tiers: Vec<Box<dyn TriageTier>> = Vec::new();
        for backend in [primary, secondary].into_iter().flatten() {
            tiers.push(Box::new(BackendTier::new(backend, config.call_timeout)));
        }
        Self {
            tiers,
            fallback: HeuristicAnalyzer::new(),
        }
    }

    /// Build the engine from explicit tiers (used by tests).
    pub fn with_tiers(tiers: Vec<Box<dyn TriageTier>>) -> Self {
        Self {
            tiers,
            fallback: HeuristicAnalyzer::new(),
        }
    }

    /// Triage an event. Always returns a result.
    pub async fn analyze(&self, event: &Event) -> TriageResult {
        for tier in &self.tiers {
            match tier.analyze(event).await {
                Ok(result) => {
                    info!(
                        event_id = %event.id,
                        tier = tier.name(),
                        urgency = result.urgency,
                        actionable = result.actionable,
                        "Triage complete"
                    );
                    return result;
                }
                Err(e) => {
                    warn!(
                        event_id = %event.id,
                        tier = tier.name(),
                        error = %e,
                        "Triage tier failed, falling through"
                    );
                }
            }
        }

        debug!(event_id = %event.id, "All backend tiers exhausted, using heuristic");
        self.fallback.analyze(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::model::EventSource;
    use chrono::Utc;
    use uuid::Uuid;

    const VALID_RESPONSE: &str = r#"{"urgency": 4, "actionable": true,
        "summary": "Review the draft", "action_items": ["Review the draft"],
        "category": "task", "confidence": 0.85}"#;

    /// Scripted backend: fixed response, fixed failure, or a stall.
    struct ScriptedBackend {
        name: &'static str,
        behavior: Behavior,
    }

    enum Behavior {
        Respond(String),
        Fail,
        Stall(Duration),
    }

    #[async_trait]
    impl ReasoningBackend for ScriptedBackend {
        fn name(&self) -> &str {
            self.name
        }

        async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
            match &self.behavior {
                Behavior::Respond(text) => Ok(text.clone()),
                Behavior::Fail => Err(BackendError::Request {
                    provider: self.name.to_string(),
                    reason: "connection refused".into(),
                }),
                Behavior::Stall(duration) => {
                    tokio::time::sleep(*duration).await;
                    Ok(VALID_RESPONSE.to_string())
                }
            }
        }
    }

    fn backend(name: &'static str, behavior: Behavior) -> Arc<dyn ReasoningBackend> {
        Arc::new(ScriptedBackend { name, behavior })
    }

    fn make_event(payload: serde_json::Value) -> Event {
        let serde_json::Value::Object(payload) = payload else {
            panic!("test payload must be an object");
        };
        Event {
            id: Uuid::new_v4(),
            source: EventSource::Email,
            kind: "message".into(),
            payload,
            occurred_at: Utc::now(),
            received_at: Utc::now(),
            truncated_fields: vec![],
        }
    }

    fn config_with_timeout(ms: u64) -> TriageConfig {
        TriageConfig {
            call_timeout: Duration::from_millis(ms),
        }
    }

    #[tokio::test]
    async fn primary_result_wins() {
        let engine = TriageEngine::new(
            &TriageConfig::default(),
            Some(backend("primary", Behavior::Respond(VALID_RESPONSE.into()))),
            Some(backend(
                "secondary",
                Behavior::Respond(
                    r#"{"urgency": 1, "actionable": false, "summary": "other",
                        "action_items": [], "category": "update", "confidence": 0.2}"#
                        .into(),
                ),
            )),
        );

        let result = engine.analyze(&make_event(serde_json::json!({"body": "hi"}))).await;
        assert_eq!(result.urgency, 4);
        assert_eq!(result.summary, "Review the draft");
    }

    #[tokio::test]
    async fn failed_primary_falls_through_to_secondary() {
        let engine = TriageEngine::new(
            &TriageConfig::default(),
            Some(backend("primary", Behavior::Fail)),
            Some(backend("secondary", Behavior::Respond(VALID_RESPONSE.into()))),
        );

        let result = engine.analyze(&make_event(serde_json::json!({"body": "hi"}))).await;
        assert_eq!(result.urgency, 4);
        assert!(result.actionable);
    }

    #[tokio::test]
    async fn timed_out_primary_falls_through_to_secondary() {
        let engine = TriageEngine::new(
            &config_with_timeout(50),
            Some(backend(
                "primary",
                Behavior::Stall(Duration::from_millis(500)),
            )),
            Some(backend("secondary", Behavior::Respond(VALID_RESPONSE.into()))),
        );

        let result = engine.analyze(&make_event(serde_json::json!({"body": "hi"}))).await;
        // Secondary's output, and no error ever reached us.
        assert_eq!(result.urgency, 4);
        assert_eq!(result.summary, "Review the draft");
    }

    #[tokio::test]
    async fn malformed_response_falls_through() {
        let engine = TriageEngine::new(
            &TriageConfig::default(),
            Some(backend(
                "primary",
                Behavior::Respond("I'd rather chat about the weather.".into()),
            )),
            Some(backend("secondary", Behavior::Respond(VALID_RESPONSE.into()))),
        );

        let result = engine.analyze(&make_event(serde_json::json!({"body": "hi"}))).await;
        assert_eq!(result.summary, "Review the draft");
    }

    #[tokio::test]
    async fn no_backends_means_heuristic_result() {
        let engine = TriageEngine::new(&TriageConfig::default(), None, None);

        let result = engine
            .analyze(&make_event(
                serde_json::json!({"subject": "URGENT: fix outage"}),
            ))
            .await;
        assert_eq!(result.urgency, 5);
        assert!(result.actionable);
        assert!((result.confidence - 0.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn all_backends_failing_still_yields_result() {
        let engine = TriageEngine::new(
            &TriageConfig::default(),
            Some(backend("primary", Behavior::Fail)),
            Some(backend("secondary", Behavior::Fail)),
        );

        let result = engine
            .analyze(&make_event(serde_json::json!({"body": "nothing special"})))
            .await;
        assert!(result.urgency >= 1 && result.urgency <= 5);
        assert!(result.confidence >= 0.1 && result.confidence <= 1.0);
    }
}

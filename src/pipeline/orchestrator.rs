//! Pipeline orchestrator.
//!
//! Wires the components into one call per event:
//! normalize → triage (tier chain) → synthesize tasks → propose actions →
//! execute auto-actions → result bundle. The stage progression is linear and
//! terminal-only; there is no retry or backtracking. The only rejection is a
//! raw event that cannot be normalized at all — everything downstream
//! degrades instead of failing.
//!
//! Cancellation is cooperative the async-Rust way: dropping the `run` future
//! (e.g. via `tokio::select!` on client disconnect) aborts outbound calls at
//! the next await point. Tasks already inserted stay inserted — task
//! creation is deliberately not transactional with the rest of the pipeline.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::actions::engine::ActionEngine;
use crate::actions::model::{ActionResult, ProposedAction};
use crate::backends::{CalendarClient, NotifierClient, ReasoningBackend, TrackerClient};
use crate::config::HubConfig;
use crate::error::PipelineError;
use crate::events::model::{Event, EventSource};
use crate::events::normalizer::Normalizer;
use crate::tasks::model::{Task, TaskStatus};
use crate::tasks::store::TaskStore;
use crate::tasks::synthesizer::TaskSynthesizer;
use crate::triage::engine::TriageEngine;
use crate::triage::model::TriageResult;

/// Per-event stage progression. Linear, terminal-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Received,
    Normalized,
    Triaged,
    TasksSynthesized,
    ActionsProposed,
    ActionsExecuted,
    Done,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Received => write!(f, "received"),
            Self::Normalized => write!(f, "normalized"),
            Self::Triaged => write!(f, "triaged"),
            Self::TasksSynthesized => write!(f, "tasks_synthesized"),
            Self::ActionsProposed => write!(f, "actions_proposed"),
            Self::ActionsExecuted => write!(f, "actions_executed"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// A raw event as handed to the hub by a provider adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    /// Which external system this came from.
    pub source: EventSource,
    /// Provider-native payload, normalized on intake.
    pub payload: serde_json::Value,
}

/// Everything one pipeline invocation produced. Every field is present
/// even when empty.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub event: Event,
    pub triage: TriageResult,
    pub tasks: Vec<Task>,
    pub proposed_actions: Vec<ProposedAction>,
    pub action_results: Vec<ActionResult>,
}

/// External collaborators injected into the pipeline.
pub struct PipelineDeps {
    /// Primary reasoning backend, if configured.
    pub primary: Option<Arc<dyn ReasoningBackend>>,
    /// Secondary reasoning backend, if configured.
    pub secondary: Option<Arc<dyn ReasoningBackend>>,
    /// External tracker for task-board sync.
    pub tracker: Arc<dyn TrackerClient>,
    /// Calendar collaborator.
    pub calendar: Arc<dyn CalendarClient>,
    /// Notification/storage collaborator.
    pub notifier: Arc<dyn NotifierClient>,
}

/// The event pipeline. Owns the event log and the task store; components
/// are wired once at construction.
pub struct Pipeline {
    normalizer: Normalizer,
    triage: TriageEngine,
    synthesizer: TaskSynthesizer,
    actions: ActionEngine,
    store: Arc<TaskStore>,
    event_log: RwLock<Vec<Event>>,
}

impl Pipeline {
    /// Build a pipeline from config and collaborators.
    pub fn new(config: HubConfig, deps: PipelineDeps) -> Self {
        let store = TaskStore::new();
        let triage = TriageEngine::new(&config.triage, deps.primary, deps.secondary);
        let synthesizer = TaskSynthesizer::new(Arc::clone(&store));
        let actions = ActionEngine::new(
            config.actions,
            Arc::clone(&store),
            deps.tracker,
            deps.calendar,
            deps.notifier,
        );

        Self {
            normalizer: Normalizer::new(config.normalizer),
            triage,
            synthesizer,
            actions,
            store,
            event_log: RwLock::new(Vec::new()),
        }
    }

    /// Run one event through the full pipeline.
    pub async fn run(&self, raw: RawEvent) -> Result<PipelineResult, PipelineError> {
        debug!(source = %raw.source, stage = %PipelineStage::Received, "Event received");

        let event = self.normalizer.normalize(raw.source, raw.payload)?;
        {
            let mut log = self.event_log.write().await;
            log.push(event.clone());
        }
        debug!(event_id = %event.id, stage = %PipelineStage::Normalized, "Event normalized");

        let triage = self.triage.analyze(&event).await;
        debug!(event_id = %event.id, stage = %PipelineStage::Triaged, "Event triaged");

        let tasks = self.synthesizer.synthesize(&event, &triage).await;
        debug!(
            event_id = %event.id,
            tasks = tasks.len(),
            stage = %PipelineStage::TasksSynthesized,
            "Tasks synthesized"
        );

        let mut proposed_actions = Vec::new();
        for task in &tasks {
            proposed_actions.extend(self.actions.propose(task, &triage));
        }
        debug!(
            event_id = %event.id,
            proposals = proposed_actions.len(),
            stage = %PipelineStage::ActionsProposed,
            "Actions proposed"
        );

        // Auto-execute actions one at a time; a failure is recorded in its
        // ActionResult and the remaining actions still run.
        let mut action_results = Vec::new();
        for action in proposed_actions.iter().filter(|a| a.auto_execute) {
            action_results.push(self.actions.execute(action).await);
        }
        debug!(
            event_id = %event.id,
            executed = action_results.len(),
            stage = %PipelineStage::ActionsExecuted,
            "Actions executed"
        );

        info!(
            event_id = %event.id,
            source = %event.source,
            urgency = triage.urgency,
            tasks = tasks.len(),
            stage = %PipelineStage::Done,
            "Pipeline complete"
        );

        Ok(PipelineResult {
            event,
            triage,
            tasks,
            proposed_actions,
            action_results,
        })
    }

    /// Run a batch of events. Each event is processed independently; a
    /// rejected event is logged and does not fail the batch.
    pub async fn run_batch(&self, raws: Vec<RawEvent>) -> Vec<PipelineResult> {
        let count = raws.len();
        info!(count, "Processing event batch");

        let mut results = Vec::with_capacity(count);
        for raw in raws {
            match self.run(raw).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!(error = %e, "Failed to process event in batch");
                }
            }
        }

        info!(
            processed = results.len(),
            total = count,
            "Batch processing complete"
        );
        results
    }

    /// Snapshot of the ordered event log.
    pub async fn events(&self) -> Vec<Event> {
        self.event_log.read().await.clone()
    }

    /// Ranked pending tasks, highest urgency first.
    pub async fn ranked_tasks(&self, limit: usize) -> Vec<Task> {
        self.store.rank(limit).await
    }

    /// Transition a task's status. `None` means the id is unknown.
    pub async fn update_task_status(&self, id: uuid::Uuid, status: TaskStatus) -> Option<Task> {
        self.store.update_status(id, status).await
    }

    /// The shared task store.
    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }
}

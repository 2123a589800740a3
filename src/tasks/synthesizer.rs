//! Task synthesizer — expands triage action items into task records.

use std::sync::Arc;

use tracing::{debug, info};

use super::model::Task;
use super::store::TaskStore;
use crate::events::model::Event;
use crate::triage::model::TriageResult;

/// Materializes tasks from a triage result into the shared store.
pub struct TaskSynthesizer {
    store: Arc<TaskStore>,
}

impl TaskSynthesizer {
    /// Create a synthesizer writing into the given store.
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self { store }
    }

    /// Synthesize tasks for one event.
    ///
    /// Non-actionable triage, or triage with no action items, yields no
    /// tasks at all. Otherwise exactly one task per action item, in item
    /// order, each inheriting the shared triage metadata.
    pub async fn synthesize(&self, event: &Event, triage: &TriageResult) -> Vec<Task> {
        if !triage.actionable || triage.action_items.is_empty() {
            debug!(
                event_id = %event.id,
                actionable = triage.actionable,
                "No tasks to synthesize"
            );
            return Vec::new();
        }

        let mut tasks = Vec::with_capacity(triage.action_items.len());
        for item in &triage.action_items {
            let task = Task::from_action_item(item, event.id, triage);
            self.store.insert(task.clone()).await;
            tasks.push(task);
        }

        info!(
            event_id = %event.id,
            count = tasks.len(),
            urgency = triage.urgency,
            "Synthesized tasks"
        );
        tasks
    }
}

//! Task data model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::triage::model::{Category, TriageResult};

/// Task lifecycle status. Two states only: completion is trivially
/// reversible, nothing else exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// A unit of work synthesized from one triage action item.
///
/// Tasks live in the process-wide [`store::TaskStore`](crate::tasks::store)
/// and are never deleted — history is retained for audit. Mutation happens
/// only through store status/external-ref calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique ID, generated at synthesis time.
    pub id: Uuid,
    /// The action item text.
    pub title: String,
    /// The event this task came from. Always present in the pipeline's
    /// event log.
    pub source_event_id: Uuid,
    /// Inherited triage urgency, 1–5.
    pub urgency: u8,
    /// Inherited triage category.
    pub category: Category,
    /// Inherited triage summary.
    pub summary: String,
    /// Inherited people.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub key_people: BTreeSet<String>,
    /// Inherited tags.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Inherited deadline, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// Inherited triage confidence.
    pub confidence: f32,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// Stamped on every store mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Stamped only on the transition into `Completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Whether the pipeline synthesized this task (vs. manual entry).
    pub ai_generated: bool,
    /// Id of the mirrored record in an external tracker, once synced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
}

impl Task {
    /// Create a pipeline-synthesized task from one action item, inheriting
    /// the shared triage metadata.
    pub fn from_action_item(
        title: impl Into<String>,
        source_event_id: Uuid,
        triage: &TriageResult,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            source_event_id,
            urgency: triage.urgency.clamp(1, 5),
            category: triage.category,
            summary: triage.summary.clone(),
            key_people: triage.key_people.clone(),
            tags: triage.tags.clone(),
            deadline: triage.deadline,
            confidence: triage.confidence,
            created_at: Utc::now(),
            updated_at: None,
            completed_at: None,
            status: TaskStatus::Pending,
            ai_generated: true,
            external_ref: None,
        }
    }
}

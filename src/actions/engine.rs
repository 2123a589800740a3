//! Action engine — derives follow-on actions from tasks and executes the
//! auto-executable ones.
//!
//! Proposal rules run independently; a task may yield zero, one, or several
//! proposals. Execution isolates failures: a collaborator error becomes a
//! failed [`ActionResult`], never a propagated error, so one bad sync can't
//! take down the rest of the pipeline invocation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::model::{ActionPriority, ActionResult, ActionType, ProposedAction};
use crate::backends::{CalendarClient, NotifierClient, TrackerClient};
use crate::config::ActionConfig;
use crate::error::BackendError;
use crate::tasks::model::Task;
use crate::tasks::store::TaskStore;
use crate::triage::model::{Category, TriageResult};

/// Proposes and executes follow-on actions.
pub struct ActionEngine {
    config: ActionConfig,
    store: Arc<TaskStore>,
    tracker: Arc<dyn TrackerClient>,
    calendar: Arc<dyn CalendarClient>,
    notifier: Arc<dyn NotifierClient>,
}

impl ActionEngine {
    /// Create an engine over the given collaborators.
    pub fn new(
        config: ActionConfig,
        store: Arc<TaskStore>,
        tracker: Arc<dyn TrackerClient>,
        calendar: Arc<dyn CalendarClient>,
        notifier: Arc<dyn NotifierClient>,
    ) -> Self {
        Self {
            config,
            store,
            tracker,
            calendar,
            notifier,
        }
    }

    // ── Proposal rules ──────────────────────────────────────────────

    /// Derive proposals for one task in its triage context.
    pub fn propose(&self, task: &Task, context: &TriageResult) -> Vec<ProposedAction> {
        let mut proposals = Vec::new();

        // Meetings with more than one person get a scheduling proposal.
        // Never auto-executed: booking time has external side effects with
        // no easy undo, so a human confirms.
        let is_meeting =
            task.category == Category::Meeting || task.tags.contains("meeting");
        if is_meeting && task.key_people.len() > 1 {
            let times = self.calendar.propose_times();
            proposals.push(ProposedAction {
                action_type: ActionType::CalendarEvent,
                priority: ActionPriority::Medium,
                description: format!(
                    "Schedule \"{}\" with {}",
                    task.title,
                    task.key_people.iter().cloned().collect::<Vec<_>>().join(", ")
                ),
                data: serde_json::json!({
                    "task_id": task.id,
                    "title": task.title,
                    "attendees": task.key_people,
                    "proposed_times": times,
                }),
                auto_execute: false,
            });
        }

        // A deadline inside the imminence window gets a prep reminder.
        // Reminders are cheap and reversible, safe to auto-fire.
        let mut follow_up_proposed = false;
        if let Some(deadline) = task.deadline
            && deadline <= Utc::now() + Duration::days(self.config.imminent_deadline_days)
        {
            proposals.push(ProposedAction {
                action_type: ActionType::FollowUp,
                priority: ActionPriority::High,
                description: format!("Prepare for deadline: {}", task.title),
                data: serde_json::json!({
                    "task_id": task.id,
                    "deadline": deadline,
                    "reason": "deadline_imminent",
                }),
                auto_execute: true,
            });
            follow_up_proposed = true;
        }

        // High-urgency tasks sync to the tracker without confirmation —
        // staleness there costs more than the occasional false positive.
        if task.urgency >= self.config.notion_sync_min_urgency {
            proposals.push(ProposedAction {
                action_type: ActionType::NotionSync,
                priority: ActionPriority::High,
                description: format!("Sync \"{}\" to tracker", task.title),
                data: sync_properties(task, context),
                auto_execute: true,
            });
        }

        // Every task gets a follow-up unless the deadline rule already
        // scheduled one; the delay scales down with urgency.
        if !follow_up_proposed {
            let delay_days = self.config.follow_up_delay_days(task.urgency);
            proposals.push(ProposedAction {
                action_type: ActionType::FollowUp,
                priority: if task.urgency >= self.config.notion_sync_min_urgency {
                    ActionPriority::Medium
                } else {
                    ActionPriority::Low
                },
                description: format!("Follow up on \"{}\" in {} days", task.title, delay_days),
                data: serde_json::json!({
                    "task_id": task.id,
                    "due": Utc::now() + Duration::days(delay_days),
                    "reason": "routine_follow_up",
                }),
                auto_execute: true,
            });
        }

        info!(
            task_id = %task.id,
            proposals = proposals.len(),
            "Proposed actions"
        );
        proposals
    }

    // ── Execution dispatch ──────────────────────────────────────────

    /// Execute one action. Never errors past this boundary.
    pub async fn execute(&self, action: &ProposedAction) -> ActionResult {
        match &action.action_type {
            ActionType::CalendarEvent => {
                self.notifier
                    .persist(serde_json::json!({
                        "record": "calendar_proposal",
                        "data": action.data,
                    }))
                    .await;
                ActionResult::ok("Scheduling proposal recorded, awaiting confirmation")
            }
            ActionType::NotionSync => self.execute_sync(action).await,
            ActionType::FollowUp => {
                self.notifier
                    .persist(serde_json::json!({
                        "record": "reminder",
                        "data": action.data,
                    }))
                    .await;
                ActionResult::ok("Reminder scheduled")
            }
            ActionType::Other(label) => {
                // Forward-compatibility signal, not a defect.
                info!(label = %label, "Unknown action type, treating as no-op");
                ActionResult::ok(format!("No handler for '{label}', skipped"))
            }
        }
    }

    /// Sync a task to the external tracker, recording the external id.
    ///
    /// The task is re-checked in the store first: a sync must never fire
    /// for a task that no longer exists.
    async fn execute_sync(&self, action: &ProposedAction) -> ActionResult {
        let Some(task_id) = action
            .data
            .get("task_id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
        else {
            return ActionResult::failed("Tracker sync skipped", "action data has no task id");
        };

        if self.store.get(task_id).await.is_none() {
            warn!(task_id = %task_id, "Tracker sync skipped, task not found");
            return ActionResult::failed("Tracker sync skipped", "task not found");
        }

        let call = self.tracker.create_or_update(action.data.clone());
        let outcome = match tokio::time::timeout(self.config.call_timeout, call).await {
            Err(_) => Err(BackendError::Timeout {
                provider: "tracker".into(),
                timeout: self.config.call_timeout,
            }),
            Ok(result) => result,
        };

        match outcome {
            Ok(external_id) => {
                self.store.set_external_ref(task_id, &external_id).await;
                info!(task_id = %task_id, external_id = %external_id, "Task synced to tracker");
                ActionResult::ok(format!("Synced to tracker as {external_id}"))
            }
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "Tracker sync failed");
                ActionResult::failed("Tracker sync failed", e.to_string())
            }
        }
    }
}

/// Full property payload for a tracker sync.
fn sync_properties(task: &Task, context: &TriageResult) -> serde_json::Value {
    let people: Vec<String> = context.key_people.iter().cloned().collect();
    let context_summary = if people.is_empty() {
        format!("{} ({})", task.summary, task.category)
    } else {
        format!("{} ({}; involves {})", task.summary, task.category, people.join(", "))
    };

    serde_json::json!({
        "task_id": task.id,
        "title": task.title,
        "status": task.status,
        "priority": priority_tier(task.urgency),
        "source": task.source_event_id,
        "confidence": task.confidence,
        "deadline": task.deadline,
        "context": context_summary,
    })
}

/// Map numeric urgency onto the tracker's priority tiers.
fn priority_tier(urgency: u8) -> &'static str {
    match urgency {
        5.. => "urgent",
        4 => "high",
        3 => "medium",
        _ => "low",
    }
}

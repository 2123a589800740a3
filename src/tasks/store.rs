//! Task store — the process-wide task table.
//!
//! One explicit store object, constructed at startup and injected wherever
//! tasks are written or ranked (no hidden global). Writers take the lock;
//! ranking copies under the read guard and sorts the snapshot, so a
//! concurrent insert can never produce a partially-sorted view. Tasks are
//! never deleted — history is retained for audit.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::model::{Task, TaskStatus};

/// In-memory task table keyed by id.
pub struct TaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl TaskStore {
    /// Create a new, empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tasks: RwLock::new(HashMap::new()),
        })
    }

    /// Insert a task.
    pub async fn insert(&self, task: Task) {
        debug!(
            task_id = %task.id,
            urgency = task.urgency,
            title = %task.title,
            "Task inserted"
        );
        let mut tasks = self.tasks.write().await;
        tasks.insert(task.id, task);
    }

    /// Fetch a task by id.
    pub async fn get(&self, id: Uuid) -> Option<Task> {
        self.tasks.read().await.get(&id).cloned()
    }

    /// Number of tasks, all statuses.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Whether the store holds no tasks.
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    /// Snapshot of every task, in no particular order.
    pub async fn all(&self) -> Vec<Task> {
        self.tasks.read().await.values().cloned().collect()
    }

    /// Ranked pending tasks: `(urgency desc, created_at desc)`, truncated
    /// to `limit`. Ties break on recency, never on insertion order.
    pub async fn rank(&self, limit: usize) -> Vec<Task> {
        let mut pending: Vec<Task> = {
            let tasks = self.tasks.read().await;
            tasks
                .values()
                .filter(|t| t.status == TaskStatus::Pending)
                .cloned()
                .collect()
        };

        pending.sort_by(|a, b| {
            b.urgency
                .cmp(&a.urgency)
                .then(b.created_at.cmp(&a.created_at))
        });
        pending.truncate(limit);
        pending
    }

    /// Transition a task's status. Returns the updated task, or `None` if
    /// the id is unknown — the not-found signal callers must check before
    /// driving external-sync decisions.
    ///
    /// `updated_at` is stamped on every call; `completed_at` only on the
    /// transition into `Completed`, and cleared again on reopen.
    pub async fn update_status(&self, id: Uuid, status: TaskStatus) -> Option<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id)?;

        let now = Utc::now();
        match (task.status, status) {
            (TaskStatus::Pending, TaskStatus::Completed) => {
                task.completed_at = Some(now);
            }
            (TaskStatus::Completed, TaskStatus::Pending) => {
                task.completed_at = None;
            }
            _ => {}
        }
        task.status = status;
        task.updated_at = Some(now);

        info!(task_id = %id, status = %status, "Task status updated");
        Some(task.clone())
    }

    /// Record the external tracker id for a task. Returns `None` if the id
    /// is unknown.
    pub async fn set_external_ref(&self, id: Uuid, external_ref: &str) -> Option<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id)?;
        task.external_ref = Some(external_ref.to_string());
        task.updated_at = Some(Utc::now());
        debug!(task_id = %id, external_ref, "External ref recorded");
        Some(task.clone())
    }
}

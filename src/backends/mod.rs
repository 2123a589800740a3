//! External collaborator interfaces.
//!
//! The pipeline core never talks to a vendor API directly — it calls through
//! these narrow traits. Transport, auth, and schema belong to the adapters
//! behind them. Tests run the full pipeline against stub implementations.

pub mod reasoning;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::BackendError;

pub use reasoning::{ReasoningConfig, ReasoningProvider, create_reasoning_backend};

/// A reasoning backend (primary or secondary triage tier).
///
/// One call, one prompt, one raw response. Retries are deliberately not part
/// of this contract — a failure falls through to the next triage tier.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Provider label for logging and error reporting.
    fn name(&self) -> &str;

    /// Send a prompt, return the raw response text.
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

/// External tracker (task-board sync, e.g. a Notion database).
#[async_trait]
pub trait TrackerClient: Send + Sync {
    /// Create or update a record from a property payload.
    /// Returns the external record id.
    async fn create_or_update(
        &self,
        properties: serde_json::Value,
    ) -> Result<String, BackendError>;
}

/// A proposed meeting slot.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Timeslot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Calendar collaborator. Pure/local at this layer — proposing times needs
/// no network call; booking them is an adapter concern.
pub trait CalendarClient: Send + Sync {
    /// Candidate meeting slots, soonest first.
    fn propose_times(&self) -> Vec<Timeslot>;
}

/// Notification/storage collaborator. Fire-and-forget from the core's
/// perspective: failures are the adapter's to log, never the pipeline's.
#[async_trait]
pub trait NotifierClient: Send + Sync {
    /// Persist a record (reminder, audit entry, proposal).
    async fn persist(&self, record: serde_json::Value);
}

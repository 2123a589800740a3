//! Configuration types.
//!
//! Product-tuned constants (urgency cut-offs, follow-up delay ladder,
//! payload caps) live here as configuration with defaults, not as
//! hard-coded values at the call sites.

use std::time::Duration;

/// Top-level hub configuration.
#[derive(Debug, Clone, Default)]
pub struct HubConfig {
    /// Event normalization settings.
    pub normalizer: NormalizerConfig,
    /// Triage engine settings.
    pub triage: TriageConfig,
    /// Action engine settings.
    pub actions: ActionConfig,
}

/// Normalizer settings.
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Maximum byte length of a single payload field. Larger fields are
    /// replaced with a truncation marker and recorded on the event.
    pub max_field_bytes: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_field_bytes: 4096,
        }
    }
}

/// Triage engine settings.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Per-call timeout for reasoning-backend requests. Exceeding it is a
    /// tier failure, not a crash.
    pub call_timeout: Duration,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(20),
        }
    }
}

/// Action engine settings.
#[derive(Debug, Clone)]
pub struct ActionConfig {
    /// Minimum urgency at which a task is synced to the external tracker
    /// without confirmation.
    pub notion_sync_min_urgency: u8,
    /// A deadline within this many days triggers a high-priority
    /// preparation reminder.
    pub imminent_deadline_days: i64,
    /// Follow-up delay for urgency 5 tasks.
    pub follow_up_days_critical: i64,
    /// Follow-up delay for urgency 4 tasks.
    pub follow_up_days_high: i64,
    /// Follow-up delay for urgency 3 tasks.
    pub follow_up_days_medium: i64,
    /// Follow-up delay for everything below urgency 3.
    pub follow_up_days_default: i64,
    /// Per-call timeout for external action execution.
    pub call_timeout: Duration,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            notion_sync_min_urgency: 4,
            imminent_deadline_days: 2,
            follow_up_days_critical: 1,
            follow_up_days_high: 3,
            follow_up_days_medium: 7,
            follow_up_days_default: 14,
            call_timeout: Duration::from_secs(15),
        }
    }
}

impl ActionConfig {
    /// Follow-up delay in days for a given urgency.
    pub fn follow_up_delay_days(&self, urgency: u8) -> i64 {
        match urgency {
            5.. => self.follow_up_days_critical,
            4 => self.follow_up_days_high,
            3 => self.follow_up_days_medium,
            _ => self.follow_up_days_default,
        }
    }
}

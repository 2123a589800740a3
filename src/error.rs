//! Error types for Triage Hub.

use std::time::Duration;

/// Top-level error type for the hub.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Triage error: {0}")]
    Triage(#[from] TriageError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures from external collaborators (reasoning backends, trackers).
///
/// A `NotConfigured` collaborator is skipped, not retried. Every other
/// variant is transient from the pipeline's point of view: it triggers
/// fallback (triage) or a failed `ActionResult` (actions), never an abort.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend {provider} is not configured")]
    NotConfigured { provider: String },

    #[error("Backend {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("Backend {provider} request failed: {reason}")]
    Request { provider: String, reason: String },

    #[error("Backend {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },
}

/// Per-tier triage failures.
///
/// A tier failure never reaches the pipeline caller — the engine falls
/// through to the next tier, and the final heuristic tier cannot fail.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("Backend failure: {0}")]
    Backend(#[from] BackendError),

    #[error("Malformed response from {provider}: {reason}")]
    MalformedResponse { provider: String, reason: String },
}

/// Pipeline-level errors. The only rejection path for a pipeline call is a
/// raw event that cannot be parsed into an `Event` at all.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Raw event payload is not a JSON object (got {0})")]
    MalformedEvent(String),
}

/// Result type alias for the hub.
pub type Result<T> = std::result::Result<T, Error>;

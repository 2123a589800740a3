//! Pipeline orchestration — one call from raw event to result bundle.
//!
//! Every event flows through:
//! 1. `Normalizer::normalize()` — raw payload to bounded envelope
//! 2. `TriageEngine::analyze()` — tier chain, always yields a result
//! 3. `TaskSynthesizer::synthesize()` — action items to task records
//! 4. `ActionEngine::propose()` + auto-execution — follow-on effects
//!
//! Component failures below the orchestrator become fallback behavior or
//! per-item records; only an unnormalizable raw event rejects the call.

pub mod orchestrator;

pub use orchestrator::{Pipeline, PipelineDeps, PipelineResult, PipelineStage, RawEvent};

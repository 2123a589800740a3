//! Event triage — urgency, actionability, and action-item extraction.
//!
//! Every event flows through an ordered chain of triage tiers:
//! 1. Primary reasoning backend (if configured)
//! 2. Secondary reasoning backend (if configured)
//! 3. Deterministic heuristic — never fails
//!
//! Tier order is decided purely by configuration presence; once a tier
//! returns a well-formed result there is no quality arbitration, and a tier
//! failure falls through immediately (no retries). The caller always gets a
//! [`model::TriageResult`].

pub mod engine;
pub mod heuristic;
pub mod model;
pub mod prompt;

pub use engine::{BackendTier, TriageEngine, TriageTier};
pub use heuristic::HeuristicAnalyzer;
pub use model::{Category, TriageResult};

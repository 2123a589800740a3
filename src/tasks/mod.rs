//! Task records — synthesis, storage, ranking, status transitions.

pub mod model;
pub mod store;
pub mod synthesizer;

pub use model::{Task, TaskStatus};
pub use store::TaskStore;
pub use synthesizer::TaskSynthesizer;

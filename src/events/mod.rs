//! Event intake — uniform envelopes for everything external tools send us.
//!
//! Provider adapters hand the pipeline a source tag plus a raw JSON payload;
//! the normalizer turns that into an immutable [`model::Event`] with bounded
//! payload size. Nothing downstream ever sees provider-native shapes.

pub mod model;
pub mod normalizer;

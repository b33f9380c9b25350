//! Guitar technique and pitch inference.
//!
//! This crate turns raw audio segments into per-segment decisions:
//!
//! - `technique`: the fixed playing-technique vocabulary and per-segment
//!   label outcomes
//! - `pitch`: the three-way pitch outcome (voiced / unvoiced / failed)
//!   and its wire sentinel encoding
//! - `model`: black-box capability traits for the classifier and the two
//!   pitch trackers
//! - `endpoint`: the [`InferenceEndpoint`] orchestrator binding the
//!   feature transform to the models, one independent decision per segment
//! - `types`: shared JSON request shape

pub mod endpoint;
pub mod error;
pub mod model;
pub mod pitch;
pub mod technique;
pub mod types;

pub use endpoint::InferenceEndpoint;
pub use error::ModelError;
pub use model::{PitchFrame, PitchTracker, TechniqueClassifier, VoicedFrame, VoicedTracker};
pub use pitch::PitchOutcome;
pub use technique::{Technique, TechniqueOutcome, TECHNIQUES};
pub use types::InferenceRequest;

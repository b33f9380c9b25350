use crate::error::ModelError;
use crate::technique::TECHNIQUES;

/// Scores a normalized spectrogram against the technique vocabulary.
///
/// The input is a row-major `[n_mels * n_frames]` matrix with values in
/// `[0, 1]`; a model that wants a trailing singleton channel dimension
/// reshapes internally. The output must contain exactly
/// [`TECHNIQUES`]`.len()` probabilities, one per vocabulary entry in
/// vocabulary order.
///
/// Implementations must be safe for concurrent use.
pub trait TechniqueClassifier: Send + Sync {
    fn scores(
        &self,
        input: &[f32],
        n_mels: usize,
        n_frames: usize,
    ) -> Result<Vec<f32>, ModelError>;

    /// Number of scores an implementation must return.
    fn vocabulary_size(&self) -> usize {
        TECHNIQUES.len()
    }
}

/// One time frame from a confidence-based pitch tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchFrame {
    pub frequency: f32,
    pub confidence: f32,
}

/// A neural pitch tracker producing per-frame frequency and confidence
/// (CREPE-style contract).
pub trait PitchTracker: Send + Sync {
    fn track(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<PitchFrame>, ModelError>;
}

/// One time frame from a voicing-based pitch tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoicedFrame {
    pub frequency: f32,
    pub voiced: bool,
}

/// A statistical pitch tracker producing per-frame frequency and a
/// voicing flag (pYIN-style contract).
pub trait VoicedTracker: Send + Sync {
    fn track(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<VoicedFrame>, ModelError>;
}

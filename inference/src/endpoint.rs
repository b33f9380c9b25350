use std::sync::Arc;

use fretwise_audio::{SpectrogramConfig, SpectrogramExtractor};
use tracing::{error, info, warn};

use crate::error::ModelError;
use crate::model::{PitchTracker, TechniqueClassifier, VoicedTracker};
use crate::pitch::{mean_confident, mean_voiced, PitchOutcome};
use crate::technique::{Technique, TechniqueOutcome, TECHNIQUES};

/// Probability threshold above which a technique label is emitted.
const TECHNIQUE_THRESHOLD: f32 = 0.5;

/// Orchestrates the feature transform and the model backends.
///
/// Each operation iterates its input segments in order and produces
/// exactly one outcome per segment; outcomes are never reordered or
/// dropped, and one segment's failure never aborts the rest.
///
/// The endpoint is stateless across calls. The classifier is optional:
/// `None` means the model failed to load at process start, and every
/// technique call fails fast without touching the transform.
pub struct InferenceEndpoint {
    classifier: Option<Arc<dyn TechniqueClassifier>>,
    pitch_tracker: Arc<dyn PitchTracker>,
    voiced_tracker: Arc<dyn VoicedTracker>,
}

impl InferenceEndpoint {
    pub fn new(
        classifier: Option<Arc<dyn TechniqueClassifier>>,
        pitch_tracker: Arc<dyn PitchTracker>,
        voiced_tracker: Arc<dyn VoicedTracker>,
    ) -> Self {
        if classifier.is_none() {
            warn!("technique classifier unavailable; technique calls will fail fast");
        }
        Self {
            classifier,
            pitch_tracker,
            voiced_tracker,
        }
    }

    /// Predicts technique label sets, one per segment.
    pub fn predict_techniques(
        &self,
        segments: &[Vec<f32>],
        sample_rate: u32,
    ) -> Vec<TechniqueOutcome> {
        info!(segments = segments.len(), sample_rate, "technique prediction requested");

        let Some(classifier) = &self.classifier else {
            error!("technique classifier not loaded, failing all segments");
            return vec![TechniqueOutcome::Failed; segments.len()];
        };

        let extractor = match SpectrogramExtractor::new(SpectrogramConfig::new(sample_rate)) {
            Ok(e) => e,
            Err(e) => {
                error!(error = %e, "spectrogram config rejected, failing all segments");
                return vec![TechniqueOutcome::Failed; segments.len()];
            }
        };

        segments
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                if is_degenerate(segment, sample_rate) {
                    return TechniqueOutcome::Degenerate;
                }
                match classify_segment(classifier.as_ref(), &extractor, segment) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(segment = i, error = %e, "technique prediction failed");
                        TechniqueOutcome::Failed
                    }
                }
            })
            .collect()
    }

    /// Estimates pitch with the neural (confidence-based) tracker.
    pub fn pitch_with_tracker(&self, segments: &[Vec<f32>], sample_rate: u32) -> Vec<PitchOutcome> {
        info!(segments = segments.len(), sample_rate, "neural pitch extraction requested");
        segments
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                if is_degenerate(segment, sample_rate) {
                    return PitchOutcome::Unvoiced;
                }
                match self.pitch_tracker.track(segment, sample_rate) {
                    Ok(frames) => mean_confident(&frames),
                    Err(e) => {
                        warn!(segment = i, error = %e, "neural pitch extraction failed");
                        PitchOutcome::Failed
                    }
                }
            })
            .collect()
    }

    /// Estimates pitch with the statistical (voicing-based) tracker.
    pub fn pitch_with_voicing(&self, segments: &[Vec<f32>], sample_rate: u32) -> Vec<PitchOutcome> {
        info!(segments = segments.len(), sample_rate, "statistical pitch extraction requested");
        segments
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                if is_degenerate(segment, sample_rate) {
                    return PitchOutcome::Unvoiced;
                }
                match self.voiced_tracker.track(segment, sample_rate) {
                    Ok(frames) => mean_voiced(&frames),
                    Err(e) => {
                        warn!(segment = i, error = %e, "statistical pitch extraction failed");
                        PitchOutcome::Failed
                    }
                }
            })
            .collect()
    }
}

/// A segment shorter than 10 ms at the given sample rate carries too
/// little signal for any model.
fn is_degenerate(segment: &[f32], sample_rate: u32) -> bool {
    (segment.len() as u64) * 100 < sample_rate as u64
}

fn classify_segment(
    classifier: &dyn TechniqueClassifier,
    extractor: &SpectrogramExtractor,
    segment: &[f32],
) -> Result<TechniqueOutcome, ModelError> {
    let spec = extractor.extract(segment);
    let input = spec.normalized();
    let scores = classifier.scores(&input, spec.n_mels(), spec.n_frames())?;
    if scores.len() != TECHNIQUES.len() {
        return Err(ModelError::ScoreCount {
            expected: TECHNIQUES.len(),
            got: scores.len(),
        });
    }

    let labels: Vec<Technique> = TECHNIQUES
        .iter()
        .zip(&scores)
        .filter(|&(_, &score)| score > TECHNIQUE_THRESHOLD)
        .map(|(&t, _)| t)
        .collect();

    // A segment is never left with an empty label set.
    Ok(TechniqueOutcome::Labels(if labels.is_empty() {
        vec![Technique::Normal]
    } else {
        labels
    }))
}

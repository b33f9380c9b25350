use crate::model::{PitchFrame, VoicedFrame};

/// Per-segment pitch estimation outcome.
///
/// The three cases are distinct on purpose: a caller must be able to
/// tell "nothing to hear" from "something went wrong".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PitchOutcome {
    /// A representative fundamental frequency in Hz (> 0).
    Voiced(f32),
    /// No voiced pitch detected (or segment too short).
    Unvoiced,
    /// Estimation failed for this segment.
    Failed,
}

impl PitchOutcome {
    /// Wire sentinel encoding: frequency, 0.0 for unvoiced, -1.0 for failed.
    pub fn to_hz(self) -> f32 {
        match self {
            Self::Voiced(hz) => hz,
            Self::Unvoiced => 0.0,
            Self::Failed => -1.0,
        }
    }

    /// Decodes the wire sentinel back into the outcome.
    pub fn from_hz(hz: f32) -> Self {
        if hz < 0.0 {
            Self::Failed
        } else if hz == 0.0 {
            Self::Unvoiced
        } else {
            Self::Voiced(hz)
        }
    }
}

/// Threshold above which a tracker frame counts toward the estimate.
pub(crate) const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Averages frequency over frames whose confidence exceeds the threshold.
/// No qualifying frame, or a non-finite average, collapses to `Unvoiced`.
pub(crate) fn mean_confident(frames: &[PitchFrame]) -> PitchOutcome {
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for f in frames {
        if f.confidence > CONFIDENCE_THRESHOLD {
            sum += f.frequency as f64;
            count += 1;
        }
    }
    finish_mean(sum, count)
}

/// Averages frequency over frames flagged as voiced.
pub(crate) fn mean_voiced(frames: &[VoicedFrame]) -> PitchOutcome {
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for f in frames {
        if f.voiced {
            sum += f.frequency as f64;
            count += 1;
        }
    }
    finish_mean(sum, count)
}

fn finish_mean(sum: f64, count: usize) -> PitchOutcome {
    if count == 0 {
        return PitchOutcome::Unvoiced;
    }
    let mean = (sum / count as f64) as f32;
    if mean.is_finite() && mean > 0.0 {
        PitchOutcome::Voiced(mean)
    } else {
        PitchOutcome::Unvoiced
    }
}

//! Audio feature extraction for guitar technique inference.
//!
//! The only front-end here is `spectrogram`: a mel-scaled, dB-converted
//! time-frequency representation with a fixed output shape, suitable as
//! direct input to a technique classification model.

pub mod spectrogram;

pub use spectrogram::{Spectrogram, SpectrogramConfig, SpectrogramError, SpectrogramExtractor};

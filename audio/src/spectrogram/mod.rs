//! Fixed-shape mel spectrogram extraction from raw audio segments.
//!
//! Front-end for the guitar technique classifier. Output is an
//! `[n_mels, target_frames]` f32 matrix in decibels, referenced to the
//! segment's own peak magnitude, so scaling is segment-relative.
//!
//! Default parameters:
//! - FFTSize: 512
//! - HopSize: 20
//! - NumMels: 128
//! - TargetFrames: 960
//! - TopDb: 80.0
//!
//! Shape is deterministic regardless of input length: shorter segments
//! are padded on the time axis with the dB floor, longer segments are
//! truncated (trailing frames dropped).

mod fft;
mod mel;

use thiserror::Error;

/// Errors raised when constructing a [`SpectrogramExtractor`].
#[derive(Debug, Error)]
pub enum SpectrogramError {
    #[error("spectrogram: sample rate must be positive")]
    ZeroSampleRate,

    #[error("spectrogram: fft size {0} is not a power of two")]
    FftSizeNotPowerOfTwo(usize),

    #[error("spectrogram: hop size must be positive")]
    ZeroHop,

    #[error("spectrogram: mel band count must be positive")]
    ZeroMels,
}

/// Configuration for mel spectrogram extraction.
#[derive(Debug, Clone)]
pub struct SpectrogramConfig {
    pub sample_rate: u32,
    pub n_fft: usize,
    pub hop: usize,
    pub n_mels: usize,
    pub target_frames: usize,
    /// Dynamic range below the peak, in dB. Values are floored at `-top_db`.
    pub top_db: f32,
}

impl SpectrogramConfig {
    /// Default extraction parameters at the given sample rate.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            n_fft: 512,
            hop: 20,
            n_mels: 128,
            target_frames: 960,
            top_db: 80.0,
        }
    }
}

/// A dB-scaled mel spectrogram with fixed dimensions.
///
/// Row-major `[n_mels][n_frames]`. Values lie in `[-top_db, 0]` with the
/// segment's peak at 0 dB; padded frames sit at the `-top_db` floor.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    data: Vec<f32>,
    n_mels: usize,
    n_frames: usize,
}

impl Spectrogram {
    pub fn n_mels(&self) -> usize {
        self.n_mels
    }

    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// Row-major view of the matrix, `n_mels * n_frames` long.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Value at mel band `m`, time frame `t`.
    pub fn get(&self, m: usize, t: usize) -> f32 {
        self.data[m * self.n_frames + t]
    }

    /// Min-max normalizes the matrix to `[0, 1]` for model consumption.
    ///
    /// Uses the matrix's own min/max with a small epsilon so a flat
    /// matrix (min == max) divides cleanly. The model's trailing
    /// singleton channel dimension is a layout concern of the consumer;
    /// the returned buffer is the same row-major `n_mels * n_frames`.
    pub fn normalized(&self) -> Vec<f32> {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in &self.data {
            min = min.min(v);
            max = max.max(v);
        }
        let range = max - min + 1e-8;
        self.data.iter().map(|&v| (v - min) / range).collect()
    }
}

/// Mel spectrogram extractor with precomputed window and filterbank.
pub struct SpectrogramExtractor {
    cfg: SpectrogramConfig,
    window: Vec<f64>,
    mel_bank: Vec<Vec<f64>>,
}

impl SpectrogramExtractor {
    /// Creates an extractor, validating the config.
    pub fn new(cfg: SpectrogramConfig) -> Result<Self, SpectrogramError> {
        if cfg.sample_rate == 0 {
            return Err(SpectrogramError::ZeroSampleRate);
        }
        if !cfg.n_fft.is_power_of_two() {
            return Err(SpectrogramError::FftSizeNotPowerOfTwo(cfg.n_fft));
        }
        if cfg.hop == 0 {
            return Err(SpectrogramError::ZeroHop);
        }
        if cfg.n_mels == 0 {
            return Err(SpectrogramError::ZeroMels);
        }

        let window = mel::hann_window(cfg.n_fft);
        let mel_bank = mel::mel_filter_bank(
            cfg.n_mels,
            cfg.n_fft,
            cfg.sample_rate as usize,
            0.0,
            cfg.sample_rate as f64 / 2.0,
        );
        Ok(Self { cfg, window, mel_bank })
    }

    pub fn config(&self) -> &SpectrogramConfig {
        &self.cfg
    }

    /// Extracts a fixed-shape dB mel spectrogram from f32 PCM samples.
    ///
    /// Framing is centered: the signal is zero-padded by `n_fft / 2` on
    /// both ends, giving `len / hop + 1` computed frames. The computed
    /// matrix is then padded with the `-top_db` floor or truncated on
    /// the time axis to exactly `target_frames` columns.
    ///
    /// Deterministic: the same samples always produce a bit-identical
    /// matrix.
    pub fn extract(&self, samples: &[f32]) -> Spectrogram {
        let cfg = &self.cfg;
        let nfft = cfg.n_fft;
        let half_fft = nfft / 2 + 1;
        let num_frames = samples.len() / cfg.hop + 1;

        // Mel power matrix, column-major scratch: power[t][m].
        let mut power = Vec::with_capacity(num_frames.min(cfg.target_frames));
        let mut real = vec![0.0f64; nfft];
        let mut imag = vec![0.0f64; nfft];
        let mut spec = vec![0.0f64; half_fft];

        for t in 0..num_frames.min(cfg.target_frames) {
            // Frame start in the conceptually padded signal; sample index
            // i maps back to samples[i - n_fft/2] when in range.
            let start = t as isize * cfg.hop as isize - (nfft / 2) as isize;

            for i in 0..nfft {
                let idx = start + i as isize;
                let s = if idx >= 0 && (idx as usize) < samples.len() {
                    samples[idx as usize] as f64
                } else {
                    0.0
                };
                real[i] = s * self.window[i];
            }
            for v in imag.iter_mut() {
                *v = 0.0;
            }
            fft::fft(&mut real, &mut imag);

            for i in 0..half_fft {
                spec[i] = real[i] * real[i] + imag[i] * imag[i];
            }

            let mut mels = vec![0.0f64; cfg.n_mels];
            for (m, filter) in self.mel_bank.iter().enumerate() {
                let mut sum = 0.0f64;
                for (k, &w) in filter.iter().enumerate() {
                    sum += w * spec[k];
                }
                mels[m] = sum;
            }
            power.push(mels);
        }

        // dB conversion referenced to the matrix's own peak.
        let amin = 1e-10f64;
        let peak = power
            .iter()
            .flat_map(|col| col.iter().copied())
            .fold(amin, f64::max);
        let ref_db = 10.0 * peak.log10();
        let floor = -(cfg.top_db as f64);

        // Fixed-shape output, pre-filled with the dB floor so short
        // segments come out padded on the right.
        let mut data = vec![floor as f32; cfg.n_mels * cfg.target_frames];
        for (t, col) in power.iter().enumerate() {
            for (m, &p) in col.iter().enumerate() {
                let db = (10.0 * p.max(amin).log10() - ref_db).max(floor);
                data[m * cfg.target_frames + t] = db as f32;
            }
        }

        Spectrogram {
            data,
            n_mels: cfg.n_mels,
            n_frames: cfg.target_frames,
        }
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use fretwise_inference::PitchOutcome;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Timeout for the lightweight `/livez` probe. Independent of the
/// configurable request timeout; a liveness check must answer fast.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Request body for one chunk. Field names are the wire contract shared
/// with the service (`InferenceRequest` on the server side).
#[derive(Serialize)]
struct ChunkRequest<'a> {
    segments: &'a [Vec<f32>],
    sample_rate: u32,
}

/// Availability-gated, chunking client for the inference service.
///
/// Segment collections larger than the configured batch size are split
/// into contiguous chunks issued strictly sequentially; chunk results
/// are concatenated in chunk order, so the final collection matches the
/// input element-for-element. If any chunk fails, the whole call fails
/// and prior chunk results are discarded: partial results without known
/// missing indices are worse than an explicit failure.
///
/// The availability flag starts false and is refreshed lazily: a call
/// finding it false re-probes `/livez` first and short-circuits without
/// issuing any inference request if the probe fails. A connection-level
/// failure flips the flag back to false. Concurrent callers may race on
/// the flag; the race is benign (at worst one redundant probe).
pub struct BatchingClient {
    http: reqwest::Client,
    config: ClientConfig,
    available: AtomicBool,
}

impl BatchingClient {
    /// Creates a client from the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if config.batch_size == 0 {
            return Err(ClientError::Config("batch size must be at least 1".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout.as_secs(),
            batch_size = config.batch_size,
            "inference client created"
        );
        Ok(Self {
            http,
            config,
            available: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Last-known availability without probing.
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    /// Probes `/livez` and refreshes the availability flag.
    pub async fn check_availability(&self) -> bool {
        let url = format!("{}/livez", self.config.base_url.trim_end_matches('/'));
        let up = match self.http.get(&url).timeout(PROBE_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!(url = %url, error = %e, "liveness probe failed");
                false
            }
        };
        self.available.store(up, Ordering::Relaxed);
        up
    }

    /// Predicts technique label sets for all segments, in input order.
    pub async fn predict_techniques(
        &self,
        segments: &[Vec<f32>],
        sample_rate: u32,
    ) -> Result<Vec<Vec<String>>, ClientError> {
        self.dispatch("predict_techniques", segments, sample_rate)
            .await
    }

    /// Extracts pitch with the neural tracker, one outcome per segment.
    pub async fn extract_pitch_with_crepe(
        &self,
        segments: &[Vec<f32>],
        sample_rate: u32,
    ) -> Result<Vec<PitchOutcome>, ClientError> {
        let hz: Vec<f32> = self
            .dispatch("extract_pitch_with_crepe", segments, sample_rate)
            .await?;
        Ok(hz.into_iter().map(PitchOutcome::from_hz).collect())
    }

    /// Extracts pitch with the statistical tracker, one outcome per segment.
    pub async fn extract_pitch_with_pyin(
        &self,
        segments: &[Vec<f32>],
        sample_rate: u32,
    ) -> Result<Vec<PitchOutcome>, ClientError> {
        let hz: Vec<f32> = self
            .dispatch("extract_pitch_with_pyin", segments, sample_rate)
            .await?;
        Ok(hz.into_iter().map(PitchOutcome::from_hz).collect())
    }

    /// Gates on availability, then issues one request per chunk,
    /// sequentially, concatenating results in chunk order.
    async fn dispatch<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        segments: &[Vec<f32>],
        sample_rate: u32,
    ) -> Result<Vec<R>, ClientError> {
        // Zero segments is not an error and contacts nothing.
        if segments.is_empty() {
            return Ok(Vec::new());
        }

        if !self.is_available() && !self.check_availability().await {
            warn!(
                base_url = %self.config.base_url,
                endpoint,
                "service unavailable, not sending request"
            );
            return Err(ClientError::Unavailable {
                url: self.config.base_url.clone(),
            });
        }

        let total = segments.len();
        let batch = self.config.batch_size;
        if total > batch {
            info!(total, batch, "segment count exceeds batch size, chunking");
        }

        let mut results = Vec::with_capacity(total);
        for (i, chunk) in segments.chunks(batch).enumerate() {
            let part: Vec<R> = self
                .post_chunk(endpoint, chunk, sample_rate)
                .await
                .inspect_err(|_| {
                    // Whole call aborts; partial results are discarded.
                    error!(endpoint, chunk = i, total, "chunk failed, aborting call");
                })?;
            results.extend(part);
        }
        Ok(results)
    }

    /// Posts one chunk and decodes the response body.
    async fn post_chunk<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        segments: &[Vec<f32>],
        sample_rate: u32,
    ) -> Result<Vec<R>, ClientError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let body = ChunkRequest { segments, sample_rate };

        info!(endpoint, segments = segments.len(), sample_rate, "sending inference request");
        let start = Instant::now();

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    // Connection-level failure: mark the service down so
                    // subsequent calls short-circuit until a probe succeeds.
                    self.available.store(false, Ordering::Relaxed);
                    error!(url = %url, error = %e, "connection failed, marking service unavailable");
                } else {
                    error!(url = %url, error = %e, "request failed");
                }
                ClientError::Transport {
                    endpoint: endpoint.to_string(),
                    source: e,
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            error!(url = %url, status = status.as_u16(), "inference request rejected");
            return Err(ClientError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let decoded: Vec<R> = resp.json().await.map_err(|e| ClientError::Decode {
            endpoint: endpoint.to_string(),
            source: e,
        })?;

        info!(
            endpoint,
            results = decoded.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "inference response received"
        );
        Ok(decoded)
    }
}

use std::env;
use std::time::Duration;

use crate::error::ClientError;

/// Default inference service base URL (SSH port-forwarded local address).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8888";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default maximum number of segments per request.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "FRETWISE_INFERENCE_URL";

/// Environment variable overriding the request timeout (seconds).
pub const ENV_TIMEOUT: &str = "FRETWISE_REQUEST_TIMEOUT";

/// Environment variable overriding the batch size (segment count).
pub const ENV_BATCH_SIZE: &str = "FRETWISE_BATCH_SIZE";

/// Builder-style configuration for [`crate::BatchingClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub batch_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ClientConfig {
    /// Reads configuration from the environment, falling back to the
    /// defaults for unset variables. Set-but-unparsable values are a
    /// configuration error, not a silent fallback.
    pub fn from_env() -> Result<Self, ClientError> {
        let mut cfg = Self::default();
        if let Ok(url) = env::var(ENV_BASE_URL) {
            cfg.base_url = url;
        }
        if let Ok(raw) = env::var(ENV_TIMEOUT) {
            let secs: u64 = raw
                .parse()
                .map_err(|_| ClientError::Config(format!("{ENV_TIMEOUT}={raw} is not a number")))?;
            cfg.timeout = Duration::from_secs(secs);
        }
        if let Ok(raw) = env::var(ENV_BATCH_SIZE) {
            cfg.batch_size = raw
                .parse()
                .map_err(|_| ClientError::Config(format!("{ENV_BATCH_SIZE}={raw} is not a number")))?;
        }
        Ok(cfg)
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

use thiserror::Error;

/// Errors returned by [`crate::BatchingClient`].
///
/// Any of these means the caller got no results at all: per-segment
/// problems never surface here (they come back as sentinel outcomes in
/// the result list), while transport-level problems always abort the
/// whole call.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("inference service at {url} is unavailable")]
    Unavailable { url: String },

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid client configuration: {0}")]
    Config(String),
}

use thiserror::Error;

/// Errors returned by model backends.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model inference failed: {0}")]
    Inference(String),

    #[error("model returned {got} scores, expected {expected}")]
    ScoreCount { expected: usize, got: usize },
}

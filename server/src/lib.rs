//! HTTP inference service.
//!
//! API endpoints:
//! - POST /predict_techniques        - [[String,...],...], one label set per segment
//! - POST /extract_pitch_with_crepe  - [f32,...], neural pitch per segment
//! - POST /extract_pitch_with_pyin   - [f32,...], statistical pitch per segment
//! - GET  /livez                     - liveness probe
//!
//! All POST bodies share the [`InferenceRequest`] shape. Responses keep
//! input order and length; per-segment failures surface as the sentinel
//! values, never as HTTP errors.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::{extract::State, response::Json, routing::{get, post}, Router};
use fretwise_inference::{InferenceEndpoint, InferenceRequest};
use tracing::info;

/// Shared handler state.
#[derive(Clone)]
struct ServerState {
    endpoint: Arc<InferenceEndpoint>,
}

/// Builds the inference router over the given endpoint.
pub fn router(endpoint: Arc<InferenceEndpoint>) -> Router {
    let state = ServerState { endpoint };
    Router::new()
        .route("/predict_techniques", post(predict_techniques))
        .route("/extract_pitch_with_crepe", post(extract_pitch_with_crepe))
        .route("/extract_pitch_with_pyin", post(extract_pitch_with_pyin))
        .route("/livez", get(livez))
        .with_state(state)
}

/// Binds `addr` and serves the inference router until shutdown.
pub async fn serve(addr: SocketAddr, endpoint: Arc<InferenceEndpoint>) -> Result<()> {
    let app = router(endpoint);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "inference service listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn livez() -> &'static str {
    "ok"
}

async fn predict_techniques(
    State(state): State<ServerState>,
    Json(req): Json<InferenceRequest>,
) -> Json<Vec<Vec<String>>> {
    let start = Instant::now();
    let outcomes = state
        .endpoint
        .predict_techniques(&req.segments, req.sample_rate);
    let labels: Vec<Vec<String>> = outcomes.iter().map(|o| o.wire_labels()).collect();
    info!(
        endpoint = "predict_techniques",
        segments = req.segments.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request served"
    );
    Json(labels)
}

async fn extract_pitch_with_crepe(
    State(state): State<ServerState>,
    Json(req): Json<InferenceRequest>,
) -> Json<Vec<f32>> {
    let start = Instant::now();
    let pitches: Vec<f32> = state
        .endpoint
        .pitch_with_tracker(&req.segments, req.sample_rate)
        .into_iter()
        .map(|o| o.to_hz())
        .collect();
    info!(
        endpoint = "extract_pitch_with_crepe",
        segments = req.segments.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request served"
    );
    Json(pitches)
}

async fn extract_pitch_with_pyin(
    State(state): State<ServerState>,
    Json(req): Json<InferenceRequest>,
) -> Json<Vec<f32>> {
    let start = Instant::now();
    let pitches: Vec<f32> = state
        .endpoint
        .pitch_with_voicing(&req.segments, req.sample_rate)
        .into_iter()
        .map(|o| o.to_hz())
        .collect();
    info!(
        endpoint = "extract_pitch_with_pyin",
        segments = req.segments.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request served"
    );
    Json(pitches)
}

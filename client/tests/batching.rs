//! Integration tests running the real inference router with fake model
//! backends behind an ephemeral listener.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use fretwise_client::{BatchingClient, ClientConfig, ClientError};
use fretwise_inference::{
    InferenceEndpoint, ModelError, PitchFrame, PitchOutcome, PitchTracker, TechniqueClassifier,
    VoicedFrame, VoicedTracker,
};

/// Classifier scoring bend and pull above threshold for every segment.
struct BendPull;

impl TechniqueClassifier for BendPull {
    fn scores(&self, _: &[f32], _: usize, _: usize) -> Result<Vec<f32>, ModelError> {
        Ok(vec![0.9, 0.1, 0.2, 0.7, 0.1, 0.1])
    }
}

/// Tracker that reports the segment's first sample as its frequency, so
/// tests can verify ordering end to end.
struct IdentityTracker;

impl PitchTracker for IdentityTracker {
    fn track(&self, samples: &[f32], _: u32) -> Result<Vec<PitchFrame>, ModelError> {
        Ok(vec![PitchFrame { frequency: samples[0], confidence: 1.0 }])
    }
}

impl VoicedTracker for IdentityTracker {
    fn track(&self, samples: &[f32], _: u32) -> Result<Vec<VoicedFrame>, ModelError> {
        Ok(vec![VoicedFrame { frequency: samples[0], voiced: true }])
    }
}

fn fake_endpoint() -> Arc<InferenceEndpoint> {
    Arc::new(InferenceEndpoint::new(
        Some(Arc::new(BendPull)),
        Arc::new(IdentityTracker),
        Arc::new(IdentityTracker),
    ))
}

async fn spawn(app: Router) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

fn client_for(addr: SocketAddr, batch_size: usize) -> BatchingClient {
    let cfg = ClientConfig::default()
        .with_base_url(&format!("http://{addr}"))
        .with_timeout(Duration::from_secs(5))
        .with_batch_size(batch_size);
    BatchingClient::new(cfg).unwrap()
}

/// A segment of 300 samples whose first sample encodes its index.
fn indexed_segments(n: usize) -> Vec<Vec<f32>> {
    (0..n)
        .map(|i| {
            let mut seg = vec![0.001f32; 300];
            seg[0] = (i + 1) as f32;
            seg
        })
        .collect()
}

/// Counting backend whose pitch endpoint starts failing after a set
/// number of requests. `/livez` hits are tracked separately.
#[derive(Clone)]
struct FlakyState {
    requests: Arc<AtomicUsize>,
    probes: Arc<AtomicUsize>,
    fail_after: usize,
}

async fn flaky_pyin(
    State(state): State<FlakyState>,
    Json(req): Json<serde_json::Value>,
) -> Response {
    let seen = state.requests.fetch_add(1, Ordering::SeqCst);
    if seen >= state.fail_after {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let count = req["segments"].as_array().map(|a| a.len()).unwrap_or(0);
    Json(vec![100.0f32; count]).into_response()
}

async fn flaky_livez(State(state): State<FlakyState>) -> &'static str {
    state.probes.fetch_add(1, Ordering::SeqCst);
    "ok"
}

fn flaky_router(state: FlakyState) -> Router {
    Router::new()
        .route("/extract_pitch_with_pyin", post(flaky_pyin))
        .route("/livez", get(flaky_livez))
        .with_state(state)
}

fn flaky_state(fail_after: usize) -> FlakyState {
    FlakyState {
        requests: Arc::new(AtomicUsize::new(0)),
        probes: Arc::new(AtomicUsize::new(0)),
        fail_after,
    }
}

#[tokio::test]
async fn chunked_and_single_shot_dispatch_agree() {
    let (addr, _server) = spawn(fretwise_server::router(fake_endpoint())).await;
    let segments = indexed_segments(250);

    let chunked = client_for(addr, 100)
        .extract_pitch_with_crepe(&segments, 22050)
        .await
        .unwrap();
    let single = client_for(addr, 1000)
        .extract_pitch_with_crepe(&segments, 22050)
        .await
        .unwrap();

    assert_eq!(chunked.len(), 250);
    assert_eq!(chunked, single);
    for (i, outcome) in chunked.iter().enumerate() {
        assert_eq!(*outcome, PitchOutcome::Voiced((i + 1) as f32), "index {i}");
    }
}

#[tokio::test]
async fn two_hundred_fifty_segments_make_three_chunks() {
    let state = flaky_state(usize::MAX);
    let (addr, _server) = spawn(flaky_router(state.clone())).await;

    let results = client_for(addr, 100)
        .extract_pitch_with_pyin(&indexed_segments(250), 22050)
        .await
        .unwrap();

    assert_eq!(results.len(), 250);
    assert_eq!(state.requests.load(Ordering::SeqCst), 3, "expected chunks of 100/100/50");
}

#[tokio::test]
async fn technique_prediction_over_the_wire() {
    let (addr, _server) = spawn(fretwise_server::router(fake_endpoint())).await;
    let client = client_for(addr, 10);

    let mut segments = indexed_segments(2);
    segments.push(vec![0.0f32; 50]); // degenerate: under 10 ms at 22050 Hz

    let labels = client.predict_techniques(&segments, 22050).await.unwrap();
    assert_eq!(
        labels,
        vec![
            vec!["bend".to_string(), "pull".to_string()],
            vec!["bend".to_string(), "pull".to_string()],
            vec!["unknown".to_string()],
        ]
    );
}

#[tokio::test]
async fn degenerate_segments_are_unvoiced_for_both_pitch_endpoints() {
    let (addr, _server) = spawn(fretwise_server::router(fake_endpoint())).await;
    let client = client_for(addr, 10);
    let segments = vec![vec![0.5f32; 50]];

    let crepe = client.extract_pitch_with_crepe(&segments, 22050).await.unwrap();
    let pyin = client.extract_pitch_with_pyin(&segments, 22050).await.unwrap();
    assert_eq!(crepe, vec![PitchOutcome::Unvoiced]);
    assert_eq!(pyin, vec![PitchOutcome::Unvoiced]);
}

#[tokio::test]
async fn empty_input_contacts_nothing() {
    let state = flaky_state(usize::MAX);
    let (addr, _server) = spawn(flaky_router(state.clone())).await;
    let client = client_for(addr, 100);

    let out = client.extract_pitch_with_pyin(&[], 22050).await.unwrap();
    assert!(out.is_empty());
    assert_eq!(state.requests.load(Ordering::SeqCst), 0);
    assert_eq!(state.probes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn chunk_failure_aborts_the_whole_call() {
    // First chunk succeeds, second gets HTTP 500.
    let state = flaky_state(1);
    let (addr, _server) = spawn(flaky_router(state.clone())).await;
    let client = client_for(addr, 2);

    let err = client
        .extract_pitch_with_pyin(&indexed_segments(6), 22050)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Status { status: 500, .. }), "got {err:?}");
    // The third chunk is never attempted.
    assert_eq!(state.requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn http_error_does_not_downgrade_availability() {
    let state = flaky_state(0);
    let (addr, _server) = spawn(flaky_router(state.clone())).await;
    let client = client_for(addr, 10);

    let err = client
        .extract_pitch_with_pyin(&indexed_segments(1), 22050)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Status { .. }));
    // An HTTP error response means the service is up; only connection
    // failures flip the flag.
    assert!(client.is_available());
}

#[tokio::test]
async fn connection_failure_downgrades_and_gates_the_next_call() {
    let state = flaky_state(usize::MAX);
    let (addr, server) = spawn(flaky_router(state.clone())).await;
    let client = client_for(addr, 10);

    client
        .extract_pitch_with_pyin(&indexed_segments(1), 22050)
        .await
        .unwrap();
    assert!(client.is_available());

    server.abort();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Flag is still true, so the request goes out and hits a refused
    // connection, downgrading availability.
    let err = client
        .extract_pitch_with_pyin(&indexed_segments(1), 22050)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }), "got {err:?}");
    assert!(!client.is_available());

    // Next call is gated: the re-probe fails and no request is issued.
    let err = client
        .extract_pitch_with_pyin(&indexed_segments(1), 22050)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unavailable { .. }), "got {err:?}");
}

#[tokio::test]
async fn unreachable_service_is_gated_from_the_start() {
    // Nothing listens here; the initial probe fails and no inference
    // request is ever attempted.
    let client = client_for("127.0.0.1:1".parse().unwrap(), 10);
    let err = client
        .extract_pitch_with_pyin(&indexed_segments(1), 22050)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unavailable { .. }), "got {err:?}");
}

#[tokio::test]
async fn successful_probe_restores_availability() {
    let client = client_for("127.0.0.1:1".parse().unwrap(), 10);
    assert!(!client.check_availability().await);

    let state = flaky_state(usize::MAX);
    let (addr, _server) = spawn(flaky_router(state.clone())).await;
    let client = client_for(addr, 10);
    assert!(client.check_availability().await);
    assert!(client.is_available());
}

//! fretcheck - connectivity and functional check for the inference service.
//!
//! Verifies that the service answers its liveness probe and, with
//! `--test`, that all three inference endpoints respond to a short
//! synthetic segment. Exits 0 when everything requested passed, 1
//! otherwise, so it can gate deploy scripts and port-forward setup.

use std::f64::consts::PI;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use fretwise_client::{BatchingClient, ClientConfig};

/// Check the fretwise inference service.
#[derive(Parser)]
#[command(name = "fretcheck")]
#[command(about = "Check the fretwise inference service", version)]
struct Cli {
    /// Service base URL (default: $FRETWISE_INFERENCE_URL or http://localhost:8888)
    #[arg(long)]
    url: Option<String>,

    /// Also run a functional test against all three inference endpoints
    #[arg(long)]
    test: bool,

    /// Print response samples
    #[arg(short, long)]
    verbose: bool,

    /// Request timeout in seconds (inference calls get 3x this)
    #[arg(long, default_value_t = 15)]
    timeout: u64,
}

/// A quarter second of an E4 (329.63 Hz) sine: enough signal for every
/// endpoint without a heavyweight payload.
fn test_segment(sample_rate: u32) -> Vec<f32> {
    let len = sample_rate as usize / 4;
    (0..len)
        .map(|i| (2.0 * PI * 329.63 * i as f64 / sample_rate as f64).sin() as f32 * 0.5)
        .collect()
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("fretcheck: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<bool> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.url {
        config = config.with_base_url(url);
    }
    config = config.with_timeout(Duration::from_secs(cli.timeout));
    let base_url = config.base_url.clone();

    println!("Checking inference service at {base_url} ...");

    let probe_client = BatchingClient::new(config.clone())?;
    let start = Instant::now();
    let available = probe_client.check_availability().await;
    let elapsed = start.elapsed().as_millis();

    if !available {
        println!("Service unreachable ({elapsed} ms). Things to check:");
        println!("  1. Is the SSH port forward to the GPU box up?");
        println!("  2. Is the inference service running on the remote end?");
        println!("  3. Is {} pointing at the right address?", fretwise_client::config::ENV_BASE_URL);
        return Ok(false);
    }
    println!("Liveness OK ({elapsed} ms)");

    if !cli.test {
        return Ok(true);
    }

    // Inference is heavier than a probe; give it triple the timeout.
    let test_client = BatchingClient::new(
        config.with_timeout(Duration::from_secs(cli.timeout * 3)),
    )?;
    let sample_rate = 22050;
    let segments = vec![test_segment(sample_rate)];
    let mut all_ok = true;

    let start = Instant::now();
    match test_client.predict_techniques(&segments, sample_rate).await {
        Ok(labels) => {
            println!("predict_techniques OK ({} ms)", start.elapsed().as_millis());
            if cli.verbose {
                println!("  response: {labels:?}");
            }
        }
        Err(e) => {
            println!("predict_techniques FAILED: {e}");
            all_ok = false;
        }
    }

    let start = Instant::now();
    match test_client.extract_pitch_with_crepe(&segments, sample_rate).await {
        Ok(pitches) => {
            println!("extract_pitch_with_crepe OK ({} ms)", start.elapsed().as_millis());
            if cli.verbose {
                println!("  response: {pitches:?}");
            }
        }
        Err(e) => {
            println!("extract_pitch_with_crepe FAILED: {e}");
            all_ok = false;
        }
    }

    let start = Instant::now();
    match test_client.extract_pitch_with_pyin(&segments, sample_rate).await {
        Ok(pitches) => {
            println!("extract_pitch_with_pyin OK ({} ms)", start.elapsed().as_millis());
            if cli.verbose {
                println!("  response: {pitches:?}");
            }
        }
        Err(e) => {
            println!("extract_pitch_with_pyin FAILED: {e}");
            all_ok = false;
        }
    }

    if all_ok {
        println!("All endpoints functional.");
    } else {
        println!("Some endpoints failed.");
    }
    Ok(all_ok)
}

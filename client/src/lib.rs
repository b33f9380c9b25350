//! Client for the fretwise inference service.
//!
//! [`BatchingClient`] presents the three inference operations to callers
//! holding large segment collections. It bounds per-request payload size
//! by splitting the collection into contiguous chunks dispatched
//! sequentially, gates calls on a cached availability flag refreshed via
//! the `/livez` probe, and aborts the whole call if any chunk fails —
//! partial results are never returned.

pub mod client;
pub mod config;
pub mod error;

pub use client::BatchingClient;
pub use config::ClientConfig;
pub use error::ClientError;

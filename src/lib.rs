//! Synthetic metrics server.
//!
//! Serves numeric values that appear to evolve over time. Values come from
//! pre-rendered shift registers advanced by a background ticker, plus
//! randomized snapshots regenerated on every tick.

use std::sync::Arc;
use std::time::Duration;

pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod series;
pub mod server;

pub use error::{Result, SynthError};

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// All series; the ticker mutates them, handlers read and reset them.
    pub registry: Arc<series::Registry>,

    /// Push period of `/api/snapshot/stream`.
    pub stream_interval: Duration,
}

impl AppState {
    pub fn new(registry: Arc<series::Registry>, stream_interval: Duration) -> Self {
        Self {
            registry,
            stream_interval,
        }
    }
}

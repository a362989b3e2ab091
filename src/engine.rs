use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;
use tracing::{debug, info};

use crate::series::Registry;

// ─── Public entry point ──────────────────────────────────────────

/// Handle to the background task that drives `Registry::tick`.
pub struct Ticker {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Spawn the engine loop: one `tick()` per `period`, first one a full
/// period after start.
pub fn spawn(registry: Arc<Registry>, period: Duration) -> Ticker {
    let running = Arc::new(AtomicBool::new(true));
    let handle = tokio::spawn(run(registry, period, running.clone()));
    info!(period_ms = period.as_millis() as u64, "engine started");
    Ticker { running, handle }
}

impl Ticker {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst) && !self.handle.is_finished()
    }

    /// Suppress all future ticks. A tick already in progress runs to the end
    /// because `tick()` never yields.
    pub async fn stop(self) {
        self.running.store(false, Ordering::SeqCst);
        self.handle.abort();
        // Ignore JoinError — cancellation is the expected outcome
        let _ = self.handle.await;
        info!("engine stopped");
    }
}

// ─── Loop ────────────────────────────────────────────────────────

async fn run(registry: Arc<Registry>, period: Duration, running: Arc<AtomicBool>) {
    let start = tokio::time::Instant::now() + period;
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks = IntervalStream::new(interval);

    while ticks.next().await.is_some() {
        if !running.load(Ordering::Relaxed) {
            break;
        }
        registry.tick();
    }
    debug!(ticks = registry.tick_count(), "engine loop exited");
}

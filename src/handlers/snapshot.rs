use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::{Stream, StreamExt};
use tracing::warn;

use crate::series::RegistrySnapshot;
use crate::AppState;

const SNAPSHOT_EVENT: &str = "snapshot";
const KEEP_ALIVE: Duration = Duration::from_secs(15);

// ─── GET /api/snapshot ───────────────────────────────────────────
/// Every buffer with its cursor, plus the randomized snapshots, as JSON.

pub async fn get_snapshot(State(state): State<Arc<AppState>>) -> Json<RegistrySnapshot> {
    Json(state.registry.snapshot())
}

// ─── GET /api/snapshot/stream ────────────────────────────────────
/// Server-Sent Events, one `snapshot` event per registry tick.
///
/// The registry is polled every `stream_interval`; a poll that sees the same
/// tick count as the previous push sends nothing. The event id is the tick
/// count so a client can spot skipped ticks.

pub async fn snapshot_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let polls = IntervalStream::new(tokio::time::interval(state.stream_interval));

    let mut last_pushed: Option<u64> = None;
    let events = polls.filter_map(move |_| {
        let snapshot = state.registry.snapshot();
        if last_pushed == Some(snapshot.ticks) {
            return None;
        }
        let event = snapshot_event(&snapshot)?;
        last_pushed = Some(snapshot.ticks);
        Some(Ok(event))
    });

    Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE).text("keep-alive"))
}

fn snapshot_event(snapshot: &RegistrySnapshot) -> Option<Event> {
    match serde_json::to_string(snapshot) {
        Ok(json) => Some(
            Event::default()
                .event(SNAPSHOT_EVENT)
                .id(snapshot.ticks.to_string())
                .data(json),
        ),
        Err(e) => {
            warn!(error = %e, ticks = snapshot.ticks, "snapshot serialization failed, skipping push");
            None
        }
    }
}

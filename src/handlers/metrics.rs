use axum::extract::State;
use std::fmt::Write;
use std::sync::Arc;

use crate::AppState;

// ─── GET /metrics ────────────────────────────────────────────────
/// One `Metric_{type}_{algorithm}: {value}` line per served series,
/// ordered by type then algorithm.

pub async fn all_series(State(state): State<Arc<AppState>>) -> String {
    let mut body = String::new();
    for mt in state.registry.types() {
        for register in mt.registers() {
            let _ = writeln!(
                body,
                "Metric_{}_{}: {}",
                mt.name(),
                register.algorithm(),
                register.current()
            );
        }
    }
    body
}

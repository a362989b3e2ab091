use axum::extract::State;
use std::fmt::Write;
use std::sync::Arc;

use crate::AppState;

// ─── GET /rand/all ───────────────────────────────────────────────
/// Current randomized value of every numeric type, e.g. `ExpMetric: 1.2e3`.

pub async fn all_random(State(state): State<Arc<AppState>>) -> String {
    let mut body = String::new();
    for mt in state.registry.types() {
        let _ = writeln!(body, "{}: {}", mt.name().label(), mt.random_value());
    }
    body
}

use axum::{middleware as axum_mw, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ── Series ──────────────────────────────────────────────
        .route("/series", get(handlers::series::missing_segments))
        .route("/series/", get(handlers::series::missing_segments))
        .route("/series/*path", get(handlers::series::get_series))
        .route("/metrics", get(handlers::metrics::all_series))
        .route("/rand/all", get(handlers::random::all_random))
        // ── Reconfiguration ─────────────────────────────────────
        .route("/reset", get(handlers::reset::missing_segments))
        .route("/reset/", get(handlers::reset::missing_segments))
        .route("/reset/*path", get(handlers::reset::reset_param))
        // ── Static fixtures ─────────────────────────────────────
        .route("/ep/kv", get(handlers::fixtures::kv))
        .route("/ep/json", get(handlers::fixtures::json))
        // ── Snapshots ───────────────────────────────────────────
        .route("/api/snapshot", get(handlers::snapshot::get_snapshot))
        .route(
            "/api/snapshot/stream",
            get(handlers::snapshot::snapshot_stream),
        )
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn(timing::timing_middleware))
        .layer(CorsLayer::permissive())
}

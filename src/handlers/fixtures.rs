//! Static endpoints for checking that a scraper can parse the basic formats.

use axum::Json;
use serde_json::{json, Value};

// ─── GET /ep/kv ──────────────────────────────────────────────────

pub async fn kv() -> &'static str {
    "HelloWorld: 69"
}

// ─── GET /ep/json ────────────────────────────────────────────────

pub async fn json() -> Json<Value> {
    Json(json!({ "HelloWorld": "69" }))
}

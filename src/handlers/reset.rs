use axum::extract::{Path, State};
use std::sync::Arc;

use crate::AppState;

use super::two_segments;
use crate::error::{Result, SynthError};

// ─── GET /reset/{PARAM_NAME}/{value} ─────────────────────────────
/// Rewrites one parameter (`INT_SIZE`, `RAND_MOD`, ...) and rebuilds the
/// buffers it shapes. Responds with one confirmation line per buffer.

pub async fn reset_param(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<String> {
    let (name, value) = two_segments(&path)?;
    let outcomes = state.registry.reset(name, value)?;

    Ok(outcomes.iter().map(|o| format!("{o}\n")).collect())
}

// ─── GET /reset, /reset/ ────────────────────────────────────────

pub async fn missing_segments() -> SynthError {
    SynthError::InvalidPath("expected /reset/{PARAM_NAME}/{value}".into())
}

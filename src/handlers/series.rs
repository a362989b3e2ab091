use axum::extract::{Path, State};
use std::sync::Arc;
use tracing::debug;

use crate::AppState;

use super::two_segments;
use crate::error::{Result, SynthError};

// ─── GET /series/{type}/{algorithm} ──────────────────────────────

pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<String> {
    let (type_name, algorithm) = two_segments(&path)?;
    let register = state.registry.resolve(type_name, algorithm)?;
    let value = register.current();

    debug!(
        numeric_type = %register.numeric_type(),
        algorithm = %register.algorithm(),
        cursor = register.cursor(),
        %value,
        "series lookup"
    );

    Ok(format!(
        "Metric_{}_{}: {value}\n",
        register.numeric_type(),
        register.algorithm()
    ))
}

// ─── GET /series, /series/ ──────────────────────────────────────

pub async fn missing_segments() -> SynthError {
    SynthError::InvalidPath("expected /series/{type}/{algorithm}".into())
}

pub mod fixtures;
pub mod metrics;
pub mod random;
pub mod reset;
pub mod series;
pub mod snapshot;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::{Result, SynthError};

// ─── Error mapping ───────────────────────────────────────────────

/// Every user-facing failure is a plain-text 400.
impl IntoResponse for SynthError {
    fn into_response(self) -> Response {
        warn!(error = %self, "request rejected");
        (StatusCode::BAD_REQUEST, format!("{self}\n")).into_response()
    }
}

// ─── Path helpers ────────────────────────────────────────────────

/// Split the tail of a catch-all route into exactly two non-empty segments.
pub(crate) fn two_segments(path: &str) -> Result<(&str, &str)> {
    let mut parts = path.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) if !a.is_empty() && !b.is_empty() => Ok((a, b)),
        _ => Err(SynthError::InvalidPath(format!(
            "expected two segments, got '{path}'"
        ))),
    }
}

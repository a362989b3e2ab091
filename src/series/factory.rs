//! Builds populated shift registers and randomized snapshots.
//!
//! Nothing is cached: every call draws a fresh distribution.

use rand::Rng;

use super::buffer::ShiftRegister;
use super::format::{self, Algorithm, NumericType};
use crate::config::SeriesParams;
use crate::error::{Result, SynthError};

/// Render `params.size` values for one (type, algorithm) pair.
pub fn generate<R: Rng + ?Sized>(
    numeric: NumericType,
    algorithm: Algorithm,
    params: &SeriesParams,
    rng: &mut R,
) -> Vec<String> {
    (0..params.size)
        .map(|i| format::progression(numeric, algorithm, i, params, rng))
        .collect()
}

/// A register positioned at its first value.
pub fn build(numeric: NumericType, algorithm: Algorithm, params: &SeriesParams) -> Result<ShiftRegister> {
    let values = generate(numeric, algorithm, params, &mut rand::thread_rng());
    ShiftRegister::new(numeric, algorithm, values)
}

/// Values for a randomized snapshot. Errors on a zero size instead of
/// handing back an empty sequence.
pub fn random_snapshot(numeric: NumericType, params: &SeriesParams) -> Result<Vec<String>> {
    if params.size == 0 {
        return Err(SynthError::EmptyBuffer);
    }
    Ok(generate(numeric, Algorithm::Random, params, &mut rand::thread_rng()))
}

use parking_lot::Mutex;
use serde::Serialize;

use super::format::{Algorithm, NumericType};
use crate::error::{Result, SynthError};

/// Cyclical shift register: pre-rendered values plus a cursor.
///
/// All state sits behind one mutex owned by the register; callers never
/// lock it themselves. Each `advance()` moves the cursor exactly one step.
pub struct ShiftRegister {
    numeric_type: NumericType,
    algorithm: Algorithm,
    inner: Mutex<Ring>,
}

struct Ring {
    values: Vec<String>,
    cursor: usize,
}

/// Read-only copy of a register for the JSON snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterSnapshot {
    pub algorithm: Algorithm,
    pub cursor: usize,
    pub current: String,
    pub values: Vec<String>,
}

// Never empty: `new` and `replace_values` reject empty sequences.
#[allow(clippy::len_without_is_empty)]
impl ShiftRegister {
    pub fn new(numeric_type: NumericType, algorithm: Algorithm, values: Vec<String>) -> Result<Self> {
        if values.is_empty() {
            return Err(SynthError::EmptyBuffer);
        }
        Ok(Self {
            numeric_type,
            algorithm,
            inner: Mutex::new(Ring { values, cursor: 0 }),
        })
    }

    pub fn numeric_type(&self) -> NumericType {
        self.numeric_type
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Move to the next value, wrapping at the end, and return it.
    pub fn advance(&self) -> String {
        let mut ring = self.inner.lock();
        ring.cursor = (ring.cursor + 1) % ring.values.len();
        ring.values[ring.cursor].clone()
    }

    pub fn current(&self) -> String {
        let ring = self.inner.lock();
        ring.values[ring.cursor].clone()
    }

    /// Swap in a new value sequence. The cursor is kept when the length is
    /// unchanged and reset to 0 otherwise.
    pub fn replace_values(&self, values: Vec<String>) -> Result<()> {
        if values.is_empty() {
            return Err(SynthError::EmptyBuffer);
        }
        let mut ring = self.inner.lock();
        if values.len() != ring.values.len() {
            ring.cursor = 0;
        }
        ring.values = values;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().values.len()
    }

    pub fn cursor(&self) -> usize {
        self.inner.lock().cursor
    }

    pub fn values(&self) -> Vec<String> {
        self.inner.lock().values.clone()
    }

    pub fn snapshot(&self) -> RegisterSnapshot {
        let ring = self.inner.lock();
        RegisterSnapshot {
            algorithm: self.algorithm,
            cursor: ring.cursor,
            current: ring.values[ring.cursor].clone(),
            values: ring.values.clone(),
        }
    }
}

//! LIFO log of manual time corrections.

use serde::{Deserialize, Serialize};

/// Stack of signed second deltas applied to the current segment.
///
/// Only deltas that were actually applied are recorded, so popping one and
/// subtracting it always restores the previous countdown value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentStack {
    deltas: Vec<i64>,
}

impl AdjustmentStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delta: i64) {
        self.deltas.push(delta);
    }

    pub fn pop(&mut self) -> Option<i64> {
        self.deltas.pop()
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Net correction currently applied.
    pub fn net(&self) -> i64 {
        self.deltas.iter().sum()
    }

    pub fn clear(&mut self) {
        self.deltas.clear();
    }
}

//! Monotonic identifier allocation

use std::sync::atomic::{AtomicI64, Ordering};

use crate::error::PersistenceError;

/// Hands out strictly increasing identifiers starting at 1
#[derive(Debug)]
pub(crate) struct IdSequence {
    table: &'static str,
    last: AtomicI64,
}

impl IdSequence {
    pub(crate) fn new(table: &'static str) -> Self {
        Self {
            table,
            last: AtomicI64::new(0),
        }
    }

    /// Allocate the next identifier
    pub(crate) fn next(&self) -> Result<i64, PersistenceError> {
        self.last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .map(|previous| previous + 1)
            .map_err(|_| PersistenceError::SequenceExhausted(self.table))
    }

    /// Make sure ids saved from outside the sequence are never handed out again
    pub(crate) fn observe(&self, id: i64) {
        self.last.fetch_max(id, Ordering::SeqCst);
    }
}

//! Buffer for messages issued before the logger is ready.

use crate::level::Severity;

/// FIFO of records accepted before initialization completes.
///
/// Replayed once, in arrival order, through the active gating rules after a
/// successful open; discarded wholesale if open fails.
#[derive(Debug, Default)]
pub struct DelayedBuffer {
    entries: Vec<(Severity, String)>,
}

impl DelayedBuffer {
    pub fn push(&mut self, severity: Severity, message: String) {
        self.entries.push((severity, message));
    }

    /// Remove and return all buffered records in arrival order.
    pub fn drain(&mut self) -> Vec<(Severity, String)> {
        std::mem::take(&mut self.entries)
    }

    /// Drop all buffered records without writing them anywhere.
    pub fn discard(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

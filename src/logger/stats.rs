//! Running log statistics.

use serde::Serialize;

use crate::level::Severity;

/// Mutable counters, guarded by the shared output lock.
///
/// Created at process start, updated on every visible emit, reported (never
/// reset) at close and at the start of each reload.
#[derive(Debug, Default)]
pub struct Stats {
    fatal_count: u64,
    error_count: u64,
    warn_count: u64,
    info_count: u64,
    debug_count: u64,
    line_count: u64,
    byte_size: u64,
}

impl Stats {
    /// Account one emitted record of `line_len` bytes.
    pub fn record(&mut self, severity: Severity, line_len: usize) {
        match severity {
            Severity::Fatal => self.fatal_count += 1,
            Severity::Error => self.error_count += 1,
            Severity::Warn => self.warn_count += 1,
            Severity::Info => self.info_count += 1,
            Severity::Debug => self.debug_count += 1,
        }
        self.line_count += 1;
        self.byte_size += line_len as u64;
    }

    /// Immutable view of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            fatal_count: self.fatal_count,
            error_count: self.error_count,
            warn_count: self.warn_count,
            info_count: self.info_count,
            debug_count: self.debug_count,
            line_count: self.line_count,
            byte_size: self.byte_size,
        }
    }
}

/// Point-in-time view of the running counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub fatal_count: u64,
    pub error_count: u64,
    pub warn_count: u64,
    pub info_count: u64,
    pub debug_count: u64,
    pub line_count: u64,
    pub byte_size: u64,
}

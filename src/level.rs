//! Log severity levels.

/// Severity of a log record, ordered from least to most verbose.
///
/// `Fatal` records are always emitted. `Error`, `Warn`, and `Info` are
/// gated by the configured threshold. `Debug` is gated by per-call-site
/// flags instead of the plain threshold comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
}

impl Severity {
    /// Short label used in formatted log lines.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Fatal => "FATAL",
            Severity::Error => "ERR",
            Severity::Warn => "WARN",
            Severity::Info => "INFO",
            Severity::Debug => "DBUG",
        }
    }

    /// Parse a configured level string.
    ///
    /// Only the first character is significant and case is ignored.
    /// Anything unrecognized, including the empty string, falls back to
    /// `Warn`.
    pub fn parse_config(value: &str) -> Severity {
        match value.chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('F') => Severity::Fatal,
            Some('E') => Severity::Error,
            Some('W') => Severity::Warn,
            Some('I') => Severity::Info,
            Some('D') => Severity::Debug,
            _ => Severity::Warn,
        }
    }
}

//! Log line destinations and the shared output critical section.
//!
//! # Data Flow
//! ```text
//! formatted line
//!     → Output::write_record (under the single shared lock)
//!         → console destination   (if enabled for this snapshot)
//!         → file destination      (if configured at open)
//!         → remote destination    (provenance-tagged copy, if configured)
//!         → statistics update
//! ```
//!
//! # Design Decisions
//! - One long-lived lock guards all destinations and the statistics, giving
//!   a total order of writes that matches the order counters are updated
//! - Destination write failures never propagate to the log caller; they are
//!   reported once and then swallowed
//! - The remote destination is its own transport abstraction, not a second
//!   handle on the file writer

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::level::Severity;
use crate::logger::stats::Stats;

/// A destination capable of durably receiving formatted log lines.
pub trait Destination: Send {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// Console destination (stdout).
#[derive(Debug, Default)]
pub struct ConsoleDestination;

impl Destination for ConsoleDestination {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}

const FILE_BUFFER_SIZE: usize = 16 * 1024;

/// Buffered file destination.
pub struct FileDestination {
    writer: BufWriter<File>,
}

impl FileDestination {
    /// Create (truncating) the log file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::with_capacity(FILE_BUFFER_SIZE, file),
        })
    }
}

impl Destination for FileDestination {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Upper bound on spooled remote lines; oldest lines are dropped first.
const SPOOL_LIMIT: usize = 4096;

/// Remote destination.
///
/// Each line is tagged with the system id (`{system_id} <line>`) and held in
/// a bounded spool for the embedding application's shipper to drain; the
/// wire transport itself is not part of this crate.
pub struct RemoteDestination {
    url: String,
    system_id: String,
    spool: VecDeque<String>,
}

impl RemoteDestination {
    pub fn new(url: String, system_id: String) -> Self {
        Self {
            url,
            system_id,
            spool: VecDeque::new(),
        }
    }

    /// Remote server address this destination was configured with.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Drain all spooled lines, oldest first.
    pub fn drain(&mut self) -> Vec<String> {
        self.spool.drain(..).collect()
    }
}

impl Destination for RemoteDestination {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        if self.spool.len() == SPOOL_LIMIT {
            self.spool.pop_front();
        }
        self.spool
            .push_back(format!("{{{}}} {}", self.system_id, line));
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// State guarded by the single shared output lock: every destination handle
/// plus the running statistics.
pub struct Output {
    pub(crate) console: ConsoleDestination,
    pub(crate) file: Option<FileDestination>,
    pub(crate) remote: Option<RemoteDestination>,

    /// Forces console output after a file-open failure, regardless of the
    /// configured `stdout` switch.
    pub(crate) console_fallback: bool,

    pub(crate) stats: Stats,

    write_warned: bool,
}

impl Output {
    pub fn new() -> Self {
        Self {
            console: ConsoleDestination,
            file: None,
            remote: None,
            console_fallback: false,
            stats: Stats::default(),
            write_warned: false,
        }
    }

    /// Write one record to every active destination and update statistics.
    ///
    /// The byte size is accounted once per logical record, before fan-out.
    /// Write failures are reported once and swallowed thereafter.
    pub fn write_record(&mut self, line: &str, severity: Severity, use_console: bool) {
        self.stats.record(severity, line.len());

        let mut failed = false;
        if use_console || self.console_fallback {
            failed |= self.console.write_line(line).is_err();
        }
        if let Some(file) = &mut self.file {
            failed |= file.write_line(line).is_err();
        }
        if let Some(remote) = &mut self.remote {
            failed |= remote.write_line(line).is_err();
        }

        if failed && !self.write_warned {
            self.write_warned = true;
            let _ = self
                .console
                .write_line("relog: log destination write failed; further failures suppressed");
        }
    }

    /// Flush and release every destination handle.
    pub fn close_destinations(&mut self) {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }
        if let Some(mut remote) = self.remote.take() {
            let _ = remote.flush();
        }
        let _ = self.console.flush();
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

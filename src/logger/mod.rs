//! Logger orchestration.
//!
//! # Data Flow
//! ```text
//! open(path)
//!     → loader builds the first ConfigSnapshot
//!     → destinations open, store installs the snapshot
//!     → DelayedBuffer replays through the active gating
//!     → ChangeDetector starts polling
//!
//! emit (any caller thread)
//!     → visibility: threshold gate or per-call-site flag resolution
//!     → format line, write + count under the single shared output lock
//!     → pending-change flag checked; if set, reload runs inline before
//!       the emit call returns
//! ```
//!
//! # Design Decisions
//! - Reload piggy-backs on the emit path: no extra reload thread, but an
//!   idle logger can carry a stale configuration indefinitely
//! - The engine logs its own lifecycle through itself, via an internal
//!   call site; pre-open messages ride the DelayedBuffer
//! - Emit never returns an error and never panics the caller

pub mod delayed;
pub mod stats;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{SecondsFormat, Utc};

use crate::callsite::{CallSiteKey, FlagCache};
use crate::config::loader::{load_snapshot, ConfigError};
use crate::config::schema::ConfigSnapshot;
use crate::config::store::ConfigStore;
use crate::config::watcher::{ChangeDetector, POLL_INTERVAL};
use crate::level::Severity;
use crate::sink::{FileDestination, Output, RemoteDestination};
use delayed::DelayedBuffer;
use stats::StatsSnapshot;

/// Call site used for the engine's own lifecycle messages.
const SELF_SITE: CallSiteKey = CallSiteKey::new("relog", "logger");

/// Lock that survives a poisoned mutex: a panicking emit elsewhere must not
/// take the whole logger down with it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Self-reconfiguring logger.
///
/// Created uninitialized; every emit before a successful [`open`] is held in
/// the delayed buffer. After `open`, verbosity and debug flags follow the
/// configuration file without a restart, while the file and remote
/// destinations stay fixed for the logger's lifetime.
///
/// [`open`]: Logger::open
pub struct Logger {
    store: ConfigStore,
    cache: FlagCache,
    output: Mutex<Output>,
    delayed: Mutex<DelayedBuffer>,
    pending: Arc<AtomicBool>,
    detector: Mutex<Option<ChangeDetector>>,
    config_path: Mutex<Option<PathBuf>>,
    poll_interval: Duration,
    closed: AtomicBool,
}

impl Logger {
    /// New uninitialized logger with the default 5 s poll interval.
    pub fn new() -> Self {
        Self::with_poll_interval(POLL_INTERVAL)
    }

    /// New uninitialized logger with a custom change-poll interval.
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self {
            store: ConfigStore::new(),
            cache: FlagCache::new(),
            output: Mutex::new(Output::new()),
            delayed: Mutex::new(DelayedBuffer::default()),
            pending: Arc::new(AtomicBool::new(false)),
            detector: Mutex::new(None),
            config_path: Mutex::new(None),
            poll_interval,
            closed: AtomicBool::new(false),
        }
    }

    /// Load the configuration file and initialize the logger.
    ///
    /// On error the logger stays uninitialized and all buffered pre-open
    /// messages are discarded. On success the delayed buffer is replayed
    /// through the now-active gating rules and change detection starts.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        self.delay(
            Severity::Info,
            format!("Open logger from config file '{}'.", path.display()),
        );

        let mut snapshot = match load_snapshot(path) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                lock(&self.delayed).discard();
                return Err(err);
            }
        };
        // generation is strictly increasing across the process lifetime,
        // even across close/reopen cycles
        snapshot.generation = self
            .store
            .load()
            .map(|prev| prev.generation + 1)
            .unwrap_or(0);

        self.delay(
            Severity::Info,
            format!(
                "SiteID '{}', SystemID '{}'.",
                snapshot.site_id, snapshot.system_id
            ),
        );
        if snapshot.remote_url.is_empty() {
            self.delay(
                Severity::Info,
                "No log server url was specified in configuration.".to_string(),
            );
        } else {
            self.delay(
                Severity::Info,
                format!("Logs going to log server at '{}'.", snapshot.remote_url),
            );
        }

        {
            let mut out = lock(&self.output);
            out.close_destinations();
            out.console_fallback = false;
            if !snapshot.log_file.is_empty() {
                match FileDestination::create(Path::new(&snapshot.log_file)) {
                    Ok(dest) => out.file = Some(dest),
                    Err(err) => {
                        // degrade to console-only, not fatal
                        out.console_fallback = true;
                        self.delay(
                            Severity::Warn,
                            format!(
                                "Failed to open output log '{}': {}.",
                                snapshot.log_file, err
                            ),
                        );
                        self.delay(Severity::Warn, "Logs will go to the console.".to_string());
                    }
                }
            }
            if !snapshot.remote_url.is_empty() {
                out.remote = Some(RemoteDestination::new(
                    snapshot.remote_url.clone(),
                    snapshot.system_id.clone(),
                ));
            }
        }

        self.store.replace(snapshot);
        self.closed.store(false, Ordering::Release);
        *lock(&self.config_path) = Some(path.to_path_buf());

        // the logger is usable from here on
        self.flush_delayed();
        self.log_flag_summary();

        // nothing is pending until the file changes from here; the detector
        // reads its baseline marker before its polling thread starts
        self.pending.store(false, Ordering::Release);
        match ChangeDetector::start(path, Arc::clone(&self.pending), self.poll_interval) {
            Ok(detector) => {
                *lock(&self.detector) = Some(detector);
                self.info(
                    &SELF_SITE,
                    &format!("log config file '{}' is monitored.", path.display()),
                );
            }
            Err(err) => {
                self.warn(
                    &SELF_SITE,
                    &format!(
                        "log config file '{}' cannot be monitored: {}.",
                        path.display(),
                        err
                    ),
                );
            }
        }
        Ok(())
    }

    /// Stop change detection, report statistics, and flush and close every
    /// destination. A second call is a no-op.
    pub fn close(&self) {
        if self.store.load().is_none() {
            return;
        }
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        // stop the detector first: once destinations start closing, no
        // reload may run
        if let Some(detector) = lock(&self.detector).take() {
            detector.stop();
            if let Some(path) = lock(&self.config_path).as_ref() {
                self.info(
                    &SELF_SITE,
                    &format!("log config file '{}' is no longer monitored.", path.display()),
                );
            }
        }

        self.report_stats();
        self.info(&SELF_SITE, "Log file is being closed.");

        lock(&self.output).close_destinations();
    }

    /// Current statistics.
    pub fn stats(&self) -> StatsSnapshot {
        lock(&self.output).stats.snapshot()
    }

    /// Generation of the active configuration, if the logger is open.
    pub fn current_generation(&self) -> Option<u64> {
        self.store.generation()
    }

    /// Drain lines spooled for the remote destination, oldest first.
    /// Empty when no remote destination is configured.
    pub fn drain_remote(&self) -> Vec<String> {
        lock(&self.output)
            .remote
            .as_mut()
            .map(|remote| remote.drain())
            .unwrap_or_default()
    }

    /// Log a fatal message. Always visible.
    pub fn fatal(&self, key: &CallSiteKey, message: &str) {
        self.log(Severity::Fatal, key, message);
    }

    /// Log an error message if the threshold allows.
    pub fn error(&self, key: &CallSiteKey, message: &str) {
        self.log(Severity::Error, key, message);
    }

    /// Log a warning message if the threshold allows.
    pub fn warn(&self, key: &CallSiteKey, message: &str) {
        self.log(Severity::Warn, key, message);
    }

    /// Log an informational message if the threshold allows.
    pub fn info(&self, key: &CallSiteKey, message: &str) {
        self.log(Severity::Info, key, message);
    }

    /// Log a debug message if this call site's debug flag resolves enabled.
    pub fn debug(&self, key: &CallSiteKey, message: &str) {
        self.log(Severity::Debug, key, message);
    }

    /// Log a debug message if any requested bit is set in this call site's
    /// resolved expert mask.
    pub fn debug_with_mask(&self, key: &CallSiteKey, mask: u32, message: &str) {
        let Some(snapshot) = self.store.load() else {
            self.delay(Severity::Debug, message.to_string());
            return;
        };
        let flags = self.cache.resolve(*key, &snapshot);
        if flags.expert_mask & mask == 0 {
            return;
        }
        self.write_line(&snapshot, Severity::Debug, "DBGX", key, message);
        self.maybe_reload();
    }

    fn log(&self, severity: Severity, key: &CallSiteKey, message: &str) {
        let Some(snapshot) = self.store.load() else {
            self.delay(severity, message.to_string());
            return;
        };
        let visible = match severity {
            Severity::Fatal => true,
            Severity::Debug => self.cache.resolve(*key, &snapshot).debug_enabled,
            level => snapshot.threshold >= level,
        };
        if !visible {
            return;
        }
        self.write_line(&snapshot, severity, severity.label(), key, message);
        self.maybe_reload();
    }

    fn write_line(
        &self,
        snapshot: &ConfigSnapshot,
        severity: Severity,
        label: &str,
        key: &CallSiteKey,
        message: &str,
    ) {
        let line = format!(
            "{} {}[{}:{}] {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            label,
            key.component,
            key.unit,
            message
        );
        lock(&self.output).write_record(&line, severity, snapshot.use_console);
    }

    fn delay(&self, severity: Severity, message: String) {
        lock(&self.delayed).push(severity, message);
    }

    /// Replay everything buffered before initialization, in FIFO order,
    /// through the now-active gating rules.
    fn flush_delayed(&self) {
        let entries = lock(&self.delayed).drain();
        for (severity, message) in entries {
            match severity {
                Severity::Debug => self.debug(&SELF_SITE, &message),
                Severity::Info => self.info(&SELF_SITE, &message),
                Severity::Warn => self.warn(&SELF_SITE, &message),
                Severity::Error => self.error(&SELF_SITE, &message),
                Severity::Fatal => self.fatal(&SELF_SITE, &message),
            }
        }
    }

    /// Log the active flags so verification can be done from the log alone.
    fn log_flag_summary(&self) {
        let Some(snapshot) = self.store.load() else {
            return;
        };
        if snapshot.debug_all {
            self.info(&SELF_SITE, "All debug flags are enabled.");
        } else {
            let names = snapshot.debug_flag_names();
            if names.is_empty() {
                self.info(&SELF_SITE, "No debug flags are enabled.");
            } else {
                let mut message = String::from("Debug flags:");
                for name in names {
                    message.push_str(&format!("\n  flag:'{name}'"));
                }
                self.info(&SELF_SITE, &message);
            }
        }

        let entries = snapshot.expert_flag_entries();
        if !entries.is_empty() {
            let mut message = String::from("Expert flags:");
            for (name, mask) in entries {
                message.push_str(&format!("\n  xflag:'{name}', value:'{mask:x}'"));
            }
            self.info(&SELF_SITE, &message);
        }
    }

    fn report_stats(&self) {
        let snapshot = self.stats();
        self.info(
            &SELF_SITE,
            &format!(
                "Fatal={}, Error={}, Warn={}, Info={}, Debug={}",
                snapshot.fatal_count,
                snapshot.error_count,
                snapshot.warn_count,
                snapshot.info_count,
                snapshot.debug_count
            ),
        );
        self.info(
            &SELF_SITE,
            &format!(
                "line count = {}, log size = {}",
                snapshot.line_count, snapshot.byte_size
            ),
        );
    }

    fn maybe_reload(&self) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        if !self.pending.swap(false, Ordering::AcqRel) {
            return;
        }
        // close() may have started between the two loads; a reload must not
        // run once destinations are being torn down
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        self.reload();
    }

    /// Rebuild the snapshot from the configuration file, preserving the
    /// sticky destination fields. Runs inline on the emitting caller's
    /// thread; on failure the previous snapshot stays active and the
    /// generation does not advance.
    fn reload(&self) {
        let Some(previous) = self.store.load() else {
            return;
        };
        let Some(path) = lock(&self.config_path).clone() else {
            return;
        };
        let next_generation = previous.generation + 1;

        self.report_stats();
        self.info(
            &SELF_SITE,
            &format!(
                "log config file '{}' is being reloaded, gen {}.",
                path.display(),
                next_generation
            ),
        );

        match load_snapshot(&path) {
            Ok(mut snapshot) => {
                // destinations are fixed for the process's lifetime
                snapshot.generation = next_generation;
                snapshot.log_file = previous.log_file.clone();
                snapshot.remote_url = previous.remote_url.clone();
                let site_line = format!(
                    "SiteID '{}', SystemID '{}'.",
                    snapshot.site_id, snapshot.system_id
                );
                let url_line = if snapshot.remote_url.is_empty() {
                    "No log server url was specified in configuration.".to_string()
                } else {
                    format!("Logs going to log server at '{}'.", snapshot.remote_url)
                };
                self.store.replace(snapshot);
                self.info(&SELF_SITE, &site_line);
                self.info(&SELF_SITE, &url_line);
                self.log_flag_summary();
            }
            Err(err) => {
                self.warn(
                    &SELF_SITE,
                    &format!(
                        "log config file '{}' could not be reloaded: {}.",
                        path.display(),
                        err
                    ),
                );
                self.warn(
                    &SELF_SITE,
                    &format!(
                        "Continuing with gen {} configuration.",
                        previous.generation
                    ),
                );
            }
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}

//! Configuration change detection.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

/// Default interval between modification-marker polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Background detector that raises a pending-change flag when the
/// configuration file's modification marker moves.
///
/// The detector never loads configuration and never touches the store; emit
/// calls consume the flag and run the reload inline on the caller's thread
/// (see [`Logger`](crate::Logger)).
pub struct ChangeDetector {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl ChangeDetector {
    /// Start polling `path`, setting `pending` whenever a change is seen.
    ///
    /// The file's current modification marker is read here, before the
    /// polling thread starts, so only changes made after this call raise
    /// the flag.
    pub fn start(
        path: &Path,
        pending: Arc<AtomicBool>,
        interval: Duration,
    ) -> io::Result<Self> {
        let baseline = modified_at(path)?;
        let (stop_tx, stop_rx) = mpsc::channel();
        let path = path.to_path_buf();
        let handle = thread::Builder::new()
            .name("relog-config-poll".into())
            .spawn(move || poll_loop(path, baseline, pending, interval, stop_rx))?;
        Ok(Self { stop_tx, handle })
    }

    /// Stop polling. Joins the polling thread, so no change can be flagged
    /// after this returns.
    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.handle.join();
    }
}

fn poll_loop(
    path: PathBuf,
    mut last: SystemTime,
    pending: Arc<AtomicBool>,
    interval: Duration,
    stop_rx: Receiver<()>,
) {
    loop {
        // the stop channel doubles as the poll timer, so stop() returns
        // without waiting out the interval
        match stop_rx.recv_timeout(interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            Err(RecvTimeoutError::Timeout) => {}
        }
        // an unreadable file (mid-rewrite, briefly removed) is not a change;
        // the next readable marker is compared against the last one seen
        if let Ok(modified) = modified_at(&path) {
            if modified != last {
                last = modified;
                pending.store(true, Ordering::Release);
            }
        }
    }
}

fn modified_at(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

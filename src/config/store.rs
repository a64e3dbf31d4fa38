//! Shared configuration state.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::config::schema::ConfigSnapshot;

/// Holds the single currently-active configuration snapshot.
///
/// Readers load the snapshot without locking; the reloader replaces it
/// atomically. Because a snapshot is never mutated after construction, a
/// reader always observes either the old or the new complete snapshot,
/// never a partial one.
#[derive(Default)]
pub struct ConfigStore {
    current: ArcSwapOption<ConfigSnapshot>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::const_empty(),
        }
    }

    /// Current snapshot, or `None` before the first successful open.
    pub fn load(&self) -> Option<Arc<ConfigSnapshot>> {
        self.current.load_full()
    }

    /// Install a snapshot, atomically replacing the previous one.
    pub fn replace(&self, snapshot: ConfigSnapshot) {
        self.current.store(Some(Arc::new(snapshot)));
    }

    /// Generation of the active snapshot, if any.
    pub fn generation(&self) -> Option<u64> {
        self.current.load().as_ref().map(|s| s.generation)
    }
}

//! Call-site identity and per-call-site flag resolution.
//!
//! # Data Flow
//! ```text
//! CallSiteKey (registered once per call site)
//!     → FlagCache::resolve(key, snapshot)
//!         generation match → cached CallSiteFlags
//!         generation stale → recompute from snapshot, refresh entry in place
//! ```
//!
//! # Design Decisions
//! - Keys are explicit (component, unit) pairs rather than derived from the
//!   runtime call stack; `callsite!()` fills them in from the module path
//! - Cache entries live for the process's life and are refreshed in place
//! - Component-wide and unit-specific debug flags combine by exclusive-or:
//!   setting both for the same call site disables debug output

use dashmap::DashMap;

use crate::config::schema::ConfigSnapshot;
use crate::level::Severity;

/// Stable identity of a log call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSiteKey {
    /// Component (package/subsystem) identifier.
    pub component: &'static str,

    /// Source-unit identifier within the component.
    pub unit: &'static str,
}

impl CallSiteKey {
    /// Register a call site with explicit identifiers.
    pub const fn new(component: &'static str, unit: &'static str) -> Self {
        Self { component, unit }
    }
}

/// Flags resolved for one call site against one configuration generation.
#[derive(Debug, Clone, Copy)]
pub struct CallSiteFlags {
    /// Generation the flags were computed against.
    pub generation: u64,

    /// Whether plain debug emits are visible for this call site.
    pub debug_enabled: bool,

    /// Combined expert bitmask for mask-gated debug emits.
    pub expert_mask: u32,
}

/// Lazily-refreshed cache of per-call-site flag resolutions.
#[derive(Default)]
pub struct FlagCache {
    entries: DashMap<CallSiteKey, CallSiteFlags>,
}

impl FlagCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Resolve the flags for `key` against `snapshot`, reusing the cached
    /// entry when it was computed for the same generation.
    pub fn resolve(&self, key: CallSiteKey, snapshot: &ConfigSnapshot) -> CallSiteFlags {
        if let Some(entry) = self.entries.get(&key) {
            if entry.generation == snapshot.generation {
                return *entry;
            }
        }
        let flags = compute(key, snapshot);
        self.entries.insert(key, flags);
        flags
    }
}

fn compute(key: CallSiteKey, snapshot: &ConfigSnapshot) -> CallSiteFlags {
    let component_on = snapshot.component_debug_enabled(key.component);
    let unit_on = snapshot.unit_debug_enabled(key.component, key.unit);

    let debug_enabled = if snapshot.debug_all {
        true
    } else if snapshot.threshold < Severity::Debug {
        // debug sets are not even populated at lower verbosity
        false
    } else {
        component_on ^ unit_on
    };

    let expert_mask = snapshot.component_expert_mask(key.component)
        | snapshot.unit_expert_mask(key.component, key.unit);

    CallSiteFlags {
        generation: snapshot.generation,
        debug_enabled,
        expert_mask,
    }
}

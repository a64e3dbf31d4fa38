//! Configuration schema definitions.
//!
//! Two layers live here: the raw JSON shape (`RawConfig`, deserialized with
//! Serde) and the typed, immutable `ConfigSnapshot` the rest of the engine
//! reads. A snapshot is built once per successful load and never mutated;
//! hot reload replaces the whole snapshot.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::level::Severity;

/// Raw configuration file shape.
///
/// All fields have defaults so a minimal (or empty) JSON object is a valid
/// configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RawConfig {
    /// Customer site label for log provenance.
    #[serde(rename = "SiteID")]
    pub site_id: String,

    /// System label used for remote collection.
    #[serde(rename = "SystemID")]
    pub system_id: String,

    /// Log file destination path (empty disables the file destination).
    pub filename: String,

    /// Remote log server address (empty disables the remote destination).
    pub url: String,

    /// Enable the console destination.
    pub stdout: bool,

    /// Severity threshold; first letter significant, case-insensitive.
    pub level: String,

    /// Per-component / per-unit debug switches.
    #[serde(rename = "debugFlags")]
    pub debug_flags: Vec<RawDebugFlag>,

    /// Per-component / per-unit expert bitmasks.
    #[serde(rename = "xFlags")]
    pub x_flags: Vec<RawExpertFlag>,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            site_id: "??".to_string(),
            system_id: String::new(),
            filename: "logfile.txt".to_string(),
            url: String::new(),
            stdout: true,
            level: "warn".to_string(),
            debug_flags: Vec::new(),
            x_flags: Vec::new(),
        }
    }
}

/// One entry of the `debugFlags` array.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RawDebugFlag {
    /// Component name; `"all"` enables debug globally, empty skips the entry.
    pub pkg: String,

    /// Source unit name; empty means the flag applies component-wide.
    pub file: String,
}

/// One entry of the `xFlags` array.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RawExpertFlag {
    pub pkg: String,
    pub file: String,

    /// Bitmask, decimal or `0x`-prefixed hex.
    pub flags: String,
}

/// Immutable configuration snapshot.
///
/// `log_file` and `remote_url` are sticky: they are fixed at the first
/// successful load and copied forward verbatim by every reload, so output
/// destinations are stable for the process's lifetime.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    /// Strictly increasing across the process lifetime; stale cache entries
    /// are detected by comparing against this.
    pub generation: u64,

    pub site_id: String,
    pub system_id: String,

    /// Sticky remote destination address (empty = disabled).
    pub remote_url: String,

    /// Console destination switch (hot-reloadable).
    pub use_console: bool,

    /// Sticky file destination path (empty = disabled).
    pub log_file: String,

    /// Severity threshold for `Error`/`Warn`/`Info` gating.
    pub threshold: Severity,

    /// Global debug override from a `pkg: "all"` entry.
    pub debug_all: bool,

    component_debug: HashSet<String>,
    unit_debug: HashSet<String>,
    component_expert: HashMap<String, u32>,
    unit_expert: HashMap<String, u32>,
}

impl ConfigSnapshot {
    /// Build a snapshot from the raw file shape, at generation 0.
    ///
    /// Debug sets are only materialized when the threshold is `Debug`; at
    /// lower verbosity the entries are skipped entirely even if present in
    /// the source. Expert masks are populated regardless of the threshold.
    pub fn from_raw(raw: RawConfig) -> Self {
        let threshold = Severity::parse_config(&raw.level);

        let mut debug_all = false;
        let mut component_debug = HashSet::new();
        let mut unit_debug = HashSet::new();
        if threshold >= Severity::Debug {
            for flag in &raw.debug_flags {
                if flag.pkg.is_empty() {
                    continue;
                }
                if flag.pkg.eq_ignore_ascii_case("all") {
                    debug_all = true;
                    continue;
                }
                if flag.file.is_empty() {
                    component_debug.insert(flag.pkg.clone());
                } else {
                    unit_debug.insert(unit_key(&flag.pkg, &flag.file));
                }
            }
        }

        let mut component_expert = HashMap::new();
        let mut unit_expert = HashMap::new();
        for flag in &raw.x_flags {
            if flag.pkg.is_empty() {
                continue;
            }
            let mask = parse_mask(&flag.flags);
            if flag.file.is_empty() {
                component_expert.insert(flag.pkg.clone(), mask);
            } else {
                unit_expert.insert(unit_key(&flag.pkg, &flag.file), mask);
            }
        }

        Self {
            generation: 0,
            site_id: raw.site_id,
            system_id: raw.system_id,
            remote_url: raw.url,
            use_console: raw.stdout,
            log_file: raw.filename,
            threshold,
            debug_all,
            component_debug,
            unit_debug,
            component_expert,
            unit_expert,
        }
    }

    pub fn component_debug_enabled(&self, component: &str) -> bool {
        self.component_debug.contains(component)
    }

    pub fn unit_debug_enabled(&self, component: &str, unit: &str) -> bool {
        self.unit_debug.contains(&unit_key(component, unit))
    }

    pub fn component_expert_mask(&self, component: &str) -> u32 {
        self.component_expert.get(component).copied().unwrap_or(0)
    }

    pub fn unit_expert_mask(&self, component: &str, unit: &str) -> u32 {
        self.unit_expert
            .get(&unit_key(component, unit))
            .copied()
            .unwrap_or(0)
    }

    /// Sorted list of every enabled debug flag, for the flag summary logged
    /// after each successful load.
    pub fn debug_flag_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .component_debug
            .iter()
            .chain(self.unit_debug.iter())
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Sorted list of every expert mask entry.
    pub fn expert_flag_entries(&self) -> Vec<(String, u32)> {
        let mut entries: Vec<(String, u32)> = self
            .component_expert
            .iter()
            .chain(self.unit_expert.iter())
            .map(|(name, mask)| (name.clone(), *mask))
            .collect();
        entries.sort();
        entries
    }
}

fn unit_key(component: &str, unit: &str) -> String {
    format!("{component}:{unit}")
}

/// Parse an expert bitmask, decimal or `0x`-prefixed hex.
/// Unparseable values resolve to 0.
fn parse_mask(value: &str) -> u32 {
    let trimmed = value.trim();
    let parsed = if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)
    } else {
        trimmed.parse()
    };
    parsed.unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_from_json(json: &str) -> RawConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults_for_empty_object() {
        let snapshot = ConfigSnapshot::from_raw(raw_from_json("{}"));
        assert_eq!(snapshot.threshold, Severity::Warn);
        assert!(snapshot.use_console);
        assert_eq!(snapshot.site_id, "??");
        assert_eq!(snapshot.log_file, "logfile.txt");
        assert!(snapshot.remote_url.is_empty());
        assert!(!snapshot.debug_all);
    }

    #[test]
    fn test_debug_sets_skipped_below_debug_level() {
        let raw = raw_from_json(
            r#"{
                "level": "INFO",
                "debugFlags": [ { "pkg": "engine" }, { "pkg": "engine", "file": "core" } ]
            }"#,
        );
        let snapshot = ConfigSnapshot::from_raw(raw);
        assert!(!snapshot.component_debug_enabled("engine"));
        assert!(!snapshot.unit_debug_enabled("engine", "core"));
    }

    #[test]
    fn test_debug_sets_populated_at_debug_level() {
        let raw = raw_from_json(
            r#"{
                "level": "DEBUG",
                "debugFlags": [
                    { "pkg": "engine" },
                    { "pkg": "engine", "file": "core" },
                    { "pkg": "" }
                ]
            }"#,
        );
        let snapshot = ConfigSnapshot::from_raw(raw);
        assert!(snapshot.component_debug_enabled("engine"));
        assert!(snapshot.unit_debug_enabled("engine", "core"));
        assert!(!snapshot.component_debug_enabled(""));
    }

    #[test]
    fn test_pkg_all_sets_global_debug_only() {
        let raw =
            raw_from_json(r#"{ "level": "debug", "debugFlags": [ { "pkg": "All" } ] }"#);
        let snapshot = ConfigSnapshot::from_raw(raw);
        assert!(snapshot.debug_all);
        assert!(snapshot.debug_flag_names().is_empty());
    }

    #[test]
    fn test_expert_masks_populated_regardless_of_level() {
        let raw = raw_from_json(
            r#"{
                "level": "WARN",
                "xFlags": [
                    { "pkg": "engine", "flags": "0x10" },
                    { "pkg": "engine", "file": "core", "flags": "3" },
                    { "pkg": "engine", "file": "aux", "flags": "bogus" }
                ]
            }"#,
        );
        let snapshot = ConfigSnapshot::from_raw(raw);
        assert_eq!(snapshot.component_expert_mask("engine"), 0x10);
        assert_eq!(snapshot.unit_expert_mask("engine", "core"), 3);
        assert_eq!(snapshot.unit_expert_mask("engine", "aux"), 0);
    }

    #[test]
    fn test_parse_mask_forms() {
        assert_eq!(parse_mask("255"), 255);
        assert_eq!(parse_mask("0xff00"), 0xff00);
        assert_eq!(parse_mask("0XFF"), 0xff);
        assert_eq!(parse_mask(" 7 "), 7);
        assert_eq!(parse_mask(""), 0);
        assert_eq!(parse_mask("-1"), 0);
    }

    #[test]
    fn test_flag_summaries_sorted() {
        let raw = raw_from_json(
            r#"{
                "level": "DEBUG",
                "debugFlags": [ { "pkg": "zeta" }, { "pkg": "alpha", "file": "one" } ],
                "xFlags": [ { "pkg": "beta", "flags": "1" }, { "pkg": "alpha", "flags": "2" } ]
            }"#,
        );
        let snapshot = ConfigSnapshot::from_raw(raw);
        assert_eq!(snapshot.debug_flag_names(), vec!["alpha:one", "zeta"]);
        assert_eq!(
            snapshot.expert_flag_entries(),
            vec![("alpha".to_string(), 2), ("beta".to_string(), 1)]
        );
    }
}

//! Visibility gating: thresholds, debug flags, expert masks, statistics.

mod common;

use common::{log_lines, quiet_config, TestEnv};
use relog::{CallSiteKey, Logger};

const APP_MAIN: CallSiteKey = CallSiteKey::new("app", "main");
const APP_AUX: CallSiteKey = CallSiteKey::new("app", "aux");

#[test]
fn test_debug_suppressed_at_info_level() {
    let env = TestEnv::new();
    let log_file = env.path("a.log");
    let config = env.write_config("cfg.json", &quiet_config(&log_file, "INFO"));

    let logger = Logger::new();
    logger.open(&config).unwrap();

    let before = logger.stats();
    logger.debug(&APP_MAIN, "debug one");
    logger.debug(&APP_MAIN, "debug two");
    logger.debug(&APP_MAIN, "debug three");
    let after = logger.stats();
    logger.close();

    assert_eq!(after.debug_count - before.debug_count, 0);
    assert!(!log_lines(&log_file).iter().any(|l| l.contains("DBUG[app:main]")));
}

#[test]
fn test_debug_all_makes_every_call_site_visible() {
    let env = TestEnv::new();
    let log_file = env.path("a.log");
    let config = env.write_config(
        "cfg.json",
        &serde_json::json!({
            "filename": log_file.to_str().unwrap(),
            "stdout": false,
            "level": "DEBUG",
            "debugFlags": [ { "pkg": "all" }, { "pkg": "app", "file": "main" } ],
        })
        .to_string(),
    );

    let logger = Logger::new();
    logger.open(&config).unwrap();

    let before = logger.stats();
    logger.debug(&APP_MAIN, "x");
    let after = logger.stats();
    logger.close();

    assert_eq!(after.debug_count - before.debug_count, 1);
    let lines = log_lines(&log_file);
    assert!(lines.iter().any(|l| l.contains("DBUG[app:main] x")));
}

#[test]
fn test_info_count_matches_emits() {
    let env = TestEnv::new();
    let log_file = env.path("a.log");
    let config = env.write_config("cfg.json", &quiet_config(&log_file, "INFO"));

    let logger = Logger::new();
    logger.open(&config).unwrap();

    let before = logger.stats();
    for i in 0..5 {
        relog::infof!(logger, &APP_MAIN, "message {}", i);
    }
    let after = logger.stats();
    logger.close();

    assert_eq!(after.info_count - before.info_count, 5);
    assert_eq!(after.line_count - before.line_count, 5);
}

#[test]
fn test_component_and_unit_debug_cancel_each_other() {
    let env = TestEnv::new();
    let log_file = env.path("a.log");
    let config = env.write_config(
        "cfg.json",
        &serde_json::json!({
            "filename": log_file.to_str().unwrap(),
            "stdout": false,
            "level": "DEBUG",
            "debugFlags": [ { "pkg": "app" }, { "pkg": "app", "file": "main" } ],
        })
        .to_string(),
    );

    let logger = Logger::new();
    logger.open(&config).unwrap();

    let before = logger.stats();
    // both flags set for this call site: cancelled
    logger.debug(&APP_MAIN, "cancelled");
    // only the component-wide flag covers this one: visible
    logger.debug(&APP_AUX, "enabled");
    let after = logger.stats();
    logger.close();

    assert_eq!(after.debug_count - before.debug_count, 1);
    let lines = log_lines(&log_file);
    assert!(!lines.iter().any(|l| l.contains("cancelled")));
    assert!(lines.iter().any(|l| l.contains("DBUG[app:aux] enabled")));
}

#[test]
fn test_expert_mask_is_or_of_component_and_unit() {
    let env = TestEnv::new();
    let log_file = env.path("a.log");
    let config = env.write_config(
        "cfg.json",
        &serde_json::json!({
            "filename": log_file.to_str().unwrap(),
            "stdout": false,
            "level": "WARN",
            "xFlags": [
                { "pkg": "app", "flags": "0x10" },
                { "pkg": "app", "file": "main", "flags": "0x01" },
            ],
        })
        .to_string(),
    );

    let logger = Logger::new();
    logger.open(&config).unwrap();

    let before = logger.stats();
    logger.debug_with_mask(&APP_MAIN, 0x10, "component bit");
    logger.debug_with_mask(&APP_MAIN, 0x01, "unit bit");
    logger.debug_with_mask(&APP_MAIN, 0x02, "unset bit");
    let after = logger.stats();
    logger.close();

    assert_eq!(after.debug_count - before.debug_count, 2);
    let lines = log_lines(&log_file);
    assert!(lines.iter().any(|l| l.contains("DBGX[app:main] component bit")));
    assert!(lines.iter().any(|l| l.contains("DBGX[app:main] unit bit")));
    assert!(!lines.iter().any(|l| l.contains("unset bit")));
}

#[test]
fn test_threshold_gates_error_warn_info() {
    let env = TestEnv::new();
    let log_file = env.path("a.log");
    let config = env.write_config("cfg.json", &quiet_config(&log_file, "WARN"));

    let logger = Logger::new();
    logger.open(&config).unwrap();

    let before = logger.stats();
    logger.error(&APP_MAIN, "an error");
    logger.warn(&APP_MAIN, "a warning");
    logger.info(&APP_MAIN, "some info");
    let after = logger.stats();
    logger.close();

    assert_eq!(after.error_count - before.error_count, 1);
    assert_eq!(after.warn_count - before.warn_count, 1);
    assert_eq!(after.info_count - before.info_count, 0);
}

#[test]
fn test_fatal_always_visible() {
    let env = TestEnv::new();
    let log_file = env.path("a.log");
    let config = env.write_config("cfg.json", &quiet_config(&log_file, "FATAL"));

    let logger = Logger::new();
    logger.open(&config).unwrap();

    let before = logger.stats();
    logger.fatal(&APP_MAIN, "the end");
    logger.warn(&APP_MAIN, "not logged");
    let after = logger.stats();
    logger.close();

    assert_eq!(after.fatal_count - before.fatal_count, 1);
    assert_eq!(after.warn_count - before.warn_count, 0);
    assert!(log_lines(&log_file)
        .iter()
        .any(|l| l.contains("FATAL[app:main] the end")));
}

#[test]
fn test_byte_size_counts_each_record_once() {
    let env = TestEnv::new();
    let log_file = env.path("a.log");
    // remote destination configured too: size must still count once
    let config = env.write_config(
        "cfg.json",
        &serde_json::json!({
            "SystemID": "sys-1",
            "filename": log_file.to_str().unwrap(),
            "url": "https://logs.example/ingest",
            "stdout": false,
            "level": "INFO",
        })
        .to_string(),
    );

    let logger = Logger::new();
    logger.open(&config).unwrap();

    let before = logger.stats();
    logger.info(&APP_MAIN, "sized message");
    let after = logger.stats();
    logger.close();

    let lines = log_lines(&log_file);
    let written = lines
        .iter()
        .find(|l| l.contains("INFO[app:main] sized message"))
        .unwrap();
    assert_eq!(after.byte_size - before.byte_size, written.len() as u64);
}

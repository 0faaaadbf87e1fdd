use clawboot::shared::BootLog;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

#[test]
fn boot_log_writes_json_lines() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("logs/bootstrap.log");
    let log = BootLog::file_only(&path);

    log.info("boot.test", "hello bootstrap");
    log.warn("boot.other", "second line");

    let raw = fs::read_to_string(&path).expect("read bootstrap log");
    let lines: Vec<Value> = raw
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["level"], "info");
    assert_eq!(lines[0]["event"], "boot.test");
    assert_eq!(lines[0]["message"], "hello bootstrap");
    assert_eq!(lines[1]["level"], "warn");
    assert!(lines[0]["timestamp"].as_str().expect("timestamp").contains('T'));
}

#[test]
fn disabled_log_writes_nothing() {
    let log = BootLog::disabled();
    assert!(log.path().is_none());
    log.error("boot.failed", "ignored");
}

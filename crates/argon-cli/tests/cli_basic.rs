//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_argon-cli"))
        .env("ARGON_DATA_DIR", data_dir)
        .env_remove("ARGON_LOG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_install_seeds_once() {
    let dir = tempfile::tempdir().unwrap();
    let first = run_json(dir.path(), &["install"]);
    assert_eq!(first["seeded"].as_array().unwrap().len(), 4);
    let second = run_json(dir.path(), &["install"]);
    assert_eq!(second["seeded"], serde_json::json!([]));
}

#[test]
fn test_block_flow() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["install"]);

    let added = run_json(
        dir.path(),
        &["message", r#"{"action":"addBlockedSite","site":"example.com"}"#],
    );
    assert_eq!(added["response"]["success"], true);

    let effects = run_json(dir.path(), &["navigate", "https://www.example.com/x"]);
    assert_eq!(effects[0]["effect"], "redirect");
    assert!(effects[0]["url"]
        .as_str()
        .unwrap()
        .contains("block.html?blocked="));

    let allowed = run_json(dir.path(), &["navigate", "https://docs.rs"]);
    assert_eq!(allowed, serde_json::json!([]));

    let stats = run_json(dir.path(), &["message", r#"{"action":"getBlockStats"}"#]);
    assert_eq!(stats["response"]["blockStats"]["totalBlocks"], 1);
}

#[test]
fn test_tick_records_screen_time() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = run_json(dir.path(), &["tick", "https://docs.rs/serde"]);
    assert_eq!(outcome["outcome"], "recorded");
    assert_eq!(outcome["domain"], "docs.rs");

    let hidden = run_json(dir.path(), &["tick", "https://docs.rs", "--hidden"]);
    assert_eq!(hidden["outcome"], "hidden");

    let top = run_json(dir.path(), &["message", r#"{"action":"getTopSites"}"#]);
    assert_eq!(top["response"]["sites"][0]["domain"], "docs.rs");
}

#[test]
fn test_unknown_action_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["message", r#"{"action":"nope"}"#]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error"));
}

#[test]
fn test_timer_start_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let started = run_json(dir.path(), &["timer", "start"]);
    assert_eq!(started["state"], "running");
    assert_eq!(started["mode"], "work");

    let status = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(status["state"], "running");
    assert_eq!(status["totalMs"], 25 * 60 * 1000);
}

#[test]
fn test_reminders_enable_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let listed = run_json(dir.path(), &["reminders", "enable", "hydration"]);
    assert_eq!(listed["reminders"]["hydration"]["enabled"], true);
    assert_eq!(listed["reminders"]["posture"]["enabled"], false);

    let (_, _, code) = run_cli(dir.path(), &["reminders", "enable", "juggling"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_set_get() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "blocking.allow_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "5");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "blocking.allow_minutes", "10"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "blocking.allow_minutes"]);
    assert_eq!(stdout.trim(), "10");

    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "tracking.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown configuration key: tracking.nope"), "{stderr}");
}

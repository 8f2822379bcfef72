//! Basic CLI smoke tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "paceshift-cli", "--"])
        .args(args)
        .env("PACESHIFT_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn formula_list_includes_presets() {
    let (stdout, _, code) = run_cli(&["formula", "list"]);
    assert_eq!(code, 0, "formula list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("JSON output");
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["name"].as_str())
        .collect();
    assert!(names.contains(&"Classic Walk"));
    assert!(names.contains(&"Circuit Session"));
}

#[test]
fn formula_show_rejects_unknown_preset() {
    let (_, stderr, code) = run_cli(&["formula", "show", "sprint"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown preset"));
}

#[test]
fn stats_all_outputs_stats_json() {
    let (stdout, _, code) = run_cli(&["stats", "all"]);
    assert_eq!(code, 0, "stats all failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("JSON output");
    assert!(parsed.get("total_workouts").is_some());
    assert!(parsed.get("total_minutes").is_some());
}

#[test]
fn config_get_returns_workout_defaults() {
    let (stdout, _, code) = run_cli(&["config", "get", "workout.rounds"]);
    assert_eq!(code, 0, "config get failed");
    assert!(stdout.trim().parse::<u32>().is_ok());
}

#[test]
fn config_get_rejects_unknown_key() {
    let (_, stderr, code) = run_cli(&["config", "get", "workout.nonexistent"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn timer_status_reports_without_error() {
    let (stdout, _, code) = run_cli(&["timer", "status"]);
    assert_eq!(code, 0, "timer status failed");
    assert!(!stdout.trim().is_empty());
}

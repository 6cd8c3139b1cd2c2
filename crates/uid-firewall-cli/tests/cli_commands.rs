// crates/uid-firewall-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests for the uid-firewall binary.
// Purpose: Ensure commands report results and fail closed on invalid input.
// Dependencies: uid-firewall-cli binary
// ============================================================================

//! ## Overview
//! Runs the CLI binary for chain listing, config validation, and dry runs.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use serde_json::Value;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn uid_firewall_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_uid-firewall"))
}

fn run(args: &[&str]) -> Output {
    Command::new(uid_firewall_bin())
        .args(args)
        .env_remove("UID_FIREWALL_CONFIG")
        .output()
        .expect("run uid-firewall")
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn cli_chains_list_json_is_canonical() {
    let output = run(&["chains", "list", "--format", "json"]);
    assert!(output.status.success());
    let chains: Value = serde_json::from_slice(&output.stdout).expect("json output");
    let chains = chains.as_array().expect("array");
    assert_eq!(chains.len(), 12);
    assert_eq!(chains[5]["name"], "background");
    assert_eq!(chains[5]["feature_flag"], "background_firewall_chain");
    assert_eq!(chains[9]["toggle"], "always_on");
}

#[test]
fn cli_config_validate_accepts_valid_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("uid-firewall.toml");
    fs::write(&config_path, "[[chains]]\nname = \"standby\"\nenabled = true\nuids = [1, 2]\n")
        .unwrap();

    let output = run(&["config", "validate", "--config", &path_arg(&config_path)]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Config valid"), "unexpected stdout: {stdout}");
    assert!(stdout.contains("2 bootstrap command(s)"), "unexpected stdout: {stdout}");
}

#[test]
fn cli_config_validate_rejects_always_on_toggle() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("uid-firewall.toml");
    fs::write(&config_path, "[[chains]]\nname = \"metered_allow\"\nenabled = false\n").unwrap();

    let output = run(&["config", "validate", "--config", &path_arg(&config_path)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load config"), "unexpected stderr: {stderr}");
    assert!(stderr.contains("cannot be toggled"), "unexpected stderr: {stderr}");
}

#[test]
fn cli_apply_prints_port_calls() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.json");
    fs::write(&script, r#"[{"op": "add_to_metered_deny_list", "uid": 1001}]"#).unwrap();

    let output = run(&["apply", "--script", &path_arg(&script)]);
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(
        report["calls"],
        serde_json::json!([{"call": "set_uid_rule", "chain": 11, "uid": 1001, "rule": "deny"}])
    );
    assert_eq!(report["chains"][10]["uid_rules"]["1001"], "deny");
}

#[test]
fn cli_apply_fails_on_rejected_command() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.json");
    fs::write(&script, r#"[{"op": "replace_chain_uids", "chain": 11, "uids": [1]}]"#).unwrap();

    let output = run(&["apply", "--script", &path_arg(&script)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Command 1 (replace_chain_uids) failed"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn cli_evaluate_reports_blocking_chain() {
    let output = run(&["evaluate", "--uid", "10", "--metered", "--data-saver", "--format", "text"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "uid 10: blocked by metered_allow (10)");
}

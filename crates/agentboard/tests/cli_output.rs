//! Integration tests for CLI output behavior
//!
//! The default behavior is quiet (no logs). Use -v/--verbose to enable logs.
//! Every test points HOME at a temp dir and never reaches a real relay.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn run_agentboard(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_agentboard"))
        .args(args)
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .env_remove("AGENTBOARD_RELAY_URL")
        .current_dir(home)
        .output()
        .expect("Failed to execute 'agentboard'")
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    let output = run_agentboard(home.path(), &["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "got: {}", stdout);
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    let output = run_agentboard(home.path(), &["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["watch", "list", "agent", "pr", "followup", "comment", "issue", "cache"] {
        assert!(stdout.contains(command), "help should mention '{}': {}", command, stdout);
    }
}

#[test]
fn test_unknown_subcommand_fails() {
    let home = TempDir::new().unwrap();
    let output = run_agentboard(home.path(), &["frobnicate"]);
    assert!(!output.status.success());
}

/// Verify that stdout contains only user-facing output (no JSON logs)
/// and that stderr is empty by default (quiet mode)
#[test]
fn test_cache_show_empty_is_clean() {
    let home = TempDir::new().unwrap();
    let output = run_agentboard(home.path(), &["cache", "show"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("No merged or closed pull requests cached."));
    assert!(!stdout.contains(r#""event":"#), "stdout has logs: {}", stdout);
    assert!(stderr.is_empty(), "quiet mode should have empty stderr, got: {}", stderr);
}

#[test]
fn test_cache_show_json_reads_terminal_file() {
    let home = TempDir::new().unwrap();
    let board_dir = home.path().join(".agentboard");
    std::fs::create_dir_all(&board_dir).unwrap();
    std::fs::write(
        board_dir.join("terminal-cache.json"),
        r#"{
  "namespace": "agentboard.terminal.v1",
  "records": {
    "review-status:https://github.com/acme/app/pull/7": {
      "value": {"status": "merged", "title": "Fix login", "number": 7, "updatedAt": "2026-03-01T10:00:00Z"},
      "recorded_at": "2026-03-01T10:05:00Z"
    }
  }
}"#,
    )
    .unwrap();

    let output = run_agentboard(home.path(), &["cache", "show", "--json"]);
    assert!(output.status.success());
    let reviews: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reviews = reviews.as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["pr_url"], "https://github.com/acme/app/pull/7");
    assert_eq!(reviews[0]["status"], "merged");
    assert_eq!(reviews[0]["number"], 7);
}

#[test]
fn test_cache_clear_removes_file() {
    let home = TempDir::new().unwrap();
    let board_dir = home.path().join(".agentboard");
    std::fs::create_dir_all(&board_dir).unwrap();
    let file = board_dir.join("terminal-cache.json");
    std::fs::write(&file, r#"{"namespace": "agentboard.terminal.v1", "records": {}}"#).unwrap();

    let output = run_agentboard(home.path(), &["cache", "clear"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Cleared 0"));
    assert!(!file.exists());
}

#[test]
fn test_verbose_emits_json_logs_on_stderr() {
    let home = TempDir::new().unwrap();
    let output = run_agentboard(home.path(), &["-v", "cache", "show"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(r#""event":"cli.cache.show_started""#),
        "verbose stderr should carry JSON events, got: {}",
        stderr
    );
}

#[test]
fn test_invalid_pr_url_fails_without_network() {
    let home = TempDir::new().unwrap();
    let output = run_agentboard(
        home.path(),
        &["--relay", "http://127.0.0.1:9", "pr", "comment", "not-a-url", "hi"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a GitHub pull request URL"), "got: {}", stderr);
}

#[test]
fn test_list_reports_unreachable_relay() {
    let home = TempDir::new().unwrap();
    let output = run_agentboard(home.path(), &["--relay", "http://127.0.0.1:9", "list"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to list agents"), "got: {}", stderr);
}

#[test]
fn test_relay_override_without_scheme_is_rejected() {
    let home = TempDir::new().unwrap();
    let output = run_agentboard(home.path(), &["--relay", "localhost:3000", "list"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must start with http:// or https://"), "got: {}", stderr);
    assert!(!stderr.contains("Failed to list agents"), "got: {}", stderr);
}

#[test]
fn test_issue_create_without_title_fails_without_network() {
    let home = TempDir::new().unwrap();
    let output = run_agentboard(
        home.path(),
        &["--relay", "http://127.0.0.1:9", "issue", "create", "acme/app", "  "],
    );
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("repository and title are required"), "got: {}", stderr);
}

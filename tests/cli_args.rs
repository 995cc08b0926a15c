//! Integration tests for CLI argument handling
//!
//! Argument errors must be reported before the terminal is taken over.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_wizi"))
        .args(args)
        .env_remove("WIZI_API_URL")
        .env_remove("WIZI_API_TOKEN")
        .env_remove("WIZI_TOAST_DURATION_MS")
        .env_remove("WIZI_LOG_FILE")
        .output()
        .expect("Failed to execute wizi")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("wizi"), "Help should mention wizi");
    assert!(stdout.contains("api-url"), "Help should mention --api-url flag");
    assert!(stdout.contains("single-flight"), "Help should mention --single-flight");
}

#[test]
fn test_invalid_tab_prints_error_and_exits() {
    let output = run_cli(&["--tab", "invalid_tab"]);
    assert!(!output.status.success(), "Expected invalid tab to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid tab"),
        "Should print error message about invalid tab: {}",
        stderr
    );
}

#[test]
fn test_non_http_api_url_is_rejected() {
    let output = run_cli(&["--api-url", "ftp://wizi.example"]);
    assert!(!output.status.success(), "Expected ftp URL to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid API URL"),
        "Should print error message about the URL: {}",
        stderr
    );
}

#[test]
fn test_non_numeric_toast_duration_is_rejected() {
    let output = run_cli(&["--toast-duration-ms", "soon"]);
    assert!(!output.status.success());
}

#[test]
fn test_tab_with_help_shows_help() {
    let output = run_cli(&["--tab", "formations", "--help"]);
    assert!(
        output.status.success(),
        "Expected --help to succeed even with --tab"
    );
}

//! CLI smoke tests.
//!
//! These only exercise argument parsing and startup validation; cycle
//! behavior is covered by dp-core's integration tests.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("deskpilot").expect("binary builds");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_run_without_api_key_fails_at_startup() {
    let dir = tempfile::tempdir().expect("temp dir");

    let mut cmd = Command::cargo_bin("deskpilot").expect("binary builds");
    cmd.current_dir(dir.path())
        .env_remove("OPENAI_API_KEY")
        .args(["run", "--once"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_invalid_threshold_rejected_before_any_cycle() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = dir.path().join("deskpilot.toml");
    std::fs::write(&config, "api_key = \"sk-test\"\nocr_confidence_threshold = 250\n")
        .expect("write config");

    let mut cmd = Command::cargo_bin("deskpilot").expect("binary builds");
    cmd.current_dir(dir.path())
        .args(["--config", "deskpilot.toml", "run", "--once"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_unknown_subcommand_is_an_error() {
    let mut cmd = Command::cargo_bin("deskpilot").expect("binary builds");
    cmd.arg("observe").assert().failure();
}

//! End-to-end tests for the tandem binary.
//!
//! Exercise argument parsing, config loading, and the check command through
//! the real executable. Build paths that need the wasm toolchain are covered
//! by in-process tests with stub compilers instead.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn tandem() -> Command {
    Command::cargo_bin("tandem").unwrap()
}

fn write_config(dir: &TempDir, json: &str) {
    fs::write(dir.path().join("tandem.config.json"), json).unwrap();
}

#[test]
fn test_help_lists_commands() {
    tandem()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_version_flag() {
    tandem()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tandem"));
}

#[test]
fn test_check_valid_config() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("client/bin/app/src")).unwrap();
    fs::create_dir_all(temp.path().join("client/bin/native_worker/src")).unwrap();
    write_config(
        &temp,
        r#"{
            "targets": [
                {"id": "app", "sourceDir": "client/bin/app", "format": "module"},
                {"id": "worker", "sourceDir": "client/bin/native_worker", "format": "global"}
            ]
        }"#,
    );

    tandem()
        .current_dir(temp.path())
        .args(["check", "--cwd", "."])
        .assert()
        .success()
        .stderr(predicate::str::contains("app"))
        .stderr(predicate::str::contains("worker"))
        .stderr(predicate::str::contains("All checks passed"));
}

#[test]
fn test_check_duplicate_target_id_fails() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("client/app")).unwrap();
    write_config(
        &temp,
        r#"{
            "targets": [
                {"id": "app", "sourceDir": "client/app", "format": "module"},
                {"id": "app", "sourceDir": "client/app", "format": "global"}
            ]
        }"#,
    );

    tandem()
        .current_dir(temp.path())
        .args(["check", "--cwd", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("app"));
}

#[test]
fn test_check_missing_source_dir_fails() {
    let temp = TempDir::new().unwrap();
    write_config(
        &temp,
        r#"{
            "targets": [
                {"id": "app", "sourceDir": "no/such/dir", "format": "module"}
            ]
        }"#,
    );

    tandem()
        .current_dir(temp.path())
        .args(["check", "--cwd", "."])
        .assert()
        .failure();
}

#[test]
fn test_check_no_targets_fails() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, r#"{"targets": []}"#);

    tandem()
        .current_dir(temp.path())
        .args(["check", "--cwd", "."])
        .assert()
        .failure();
}

#[test]
fn test_explicit_missing_config_fails() {
    let temp = TempDir::new().unwrap();

    tandem()
        .current_dir(temp.path())
        .args(["check", "--config", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn test_invalid_mode_value_rejected() {
    tandem()
        .args(["build", "--mode", "turbo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("turbo"));
}

#[test]
fn test_no_color_flag_strips_ansi() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("client/app")).unwrap();
    write_config(
        &temp,
        r#"{
            "targets": [
                {"id": "app", "sourceDir": "client/app", "format": "module"}
            ]
        }"#,
    );

    // FORCE_COLOR would normally win; --no-color must still strip styling
    tandem()
        .current_dir(temp.path())
        .env("FORCE_COLOR", "1")
        .args(["--no-color", "check", "--cwd", "."])
        .assert()
        .success()
        .stderr(predicate::str::contains("\u{1b}[").not());
}

#[test]
fn test_env_overrides_config_port() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("client/app")).unwrap();
    write_config(
        &temp,
        r#"{
            "targets": [
                {"id": "app", "sourceDir": "client/app", "format": "module"}
            ],
            "dev": {"port": 9000}
        }"#,
    );

    // Check succeeds regardless; the point is that an env override does not
    // break config extraction
    tandem()
        .current_dir(temp.path())
        .env("TANDEM_DEV_PORT", "9100")
        .args(["check", "--cwd", "."])
        .assert()
        .success();
}

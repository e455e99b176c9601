//! End-to-end tests for the upgradeps CLI
//!
//! These tests run the compiled binary against a local mock registry and verify:
//! - Dry-run mode leaves files unchanged
//! - Upgrades are written with the original layout
//! - JSON output schema
//! - Exit codes for fatal and recoverable failures

use assert_cmd::Command;
use mockito::{Mock, Server, ServerGuard};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SAMPLE_MANIFEST: &str = "{\n  \"name\": \"test-project\",\n  \"version\": \"1.0.0\",\n  \"dependencies\": {\n    \"left-pad\": \"^1.0.0\"\n  },\n  \"devDependencies\": {\n    \"ghost\": \"~2.0.0\"\n  }\n}\n";

fn upgradeps() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_upgradeps"));
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Create a project directory with the given package.json
fn create_test_project(content: &str) -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    fs::write(temp_dir.path().join("package.json"), content).unwrap();
    temp_dir
}

fn read_manifest(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("package.json")).unwrap()
}

fn mock_latest(server: &mut ServerGuard, package: &str, latest: &str) -> Mock {
    server
        .mock("GET", format!("/{}", package).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"name":"{}","dist-tags":{{"latest":"{}"}},"versions":{{}}}}"#,
            package, latest
        ))
        .create()
}

fn mock_missing(server: &mut ServerGuard, package: &str) -> Mock {
    server
        .mock("GET", format!("/{}", package).as_str())
        .with_status(404)
        .with_body(r#"{"error":"Not found"}"#)
        .create()
}

#[test]
fn test_version_flag() {
    upgradeps()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_flags() {
    upgradeps()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--minor-only"))
        .stdout(predicate::str::contains("--skip"))
        .stdout(predicate::str::contains("--test"));
}

#[test]
fn test_missing_manifest_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    upgradeps()
        .arg(temp_dir.path())
        .args(["-r", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("package.json"));
}

#[test]
fn test_invalid_manifest_fails() {
    let temp_dir = create_test_project("{ \"dependencies\": ");

    upgradeps()
        .arg(temp_dir.path())
        .args(["-r", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_dry_run_leaves_file_unchanged() {
    let mut server = Server::new();
    let latest = mock_latest(&mut server, "left-pad", "1.0.1");
    let missing = mock_missing(&mut server, "ghost");
    let temp_dir = create_test_project(SAMPLE_MANIFEST);

    upgradeps()
        .arg(temp_dir.path())
        .args(["-t", "-x", "-r", &server.url()])
        .assert()
        .success()
        .stdout(predicate::str::contains("left-pad"))
        .stdout(predicate::str::contains("1.0.1 [patch]"))
        .stdout(predicate::str::contains("ghost"))
        .stdout(predicate::str::contains("not found"))
        .stdout(predicate::str::contains("package.json not upgraded"));

    latest.assert();
    missing.assert();
    assert_eq!(read_manifest(&temp_dir), SAMPLE_MANIFEST);
}

#[test]
fn test_upgrade_written_with_layout_preserved() {
    let mut server = Server::new();
    let _latest = mock_latest(&mut server, "left-pad", "1.0.1");
    let _missing = mock_missing(&mut server, "ghost");
    let temp_dir = create_test_project(SAMPLE_MANIFEST);

    upgradeps()
        .arg(temp_dir.path())
        .args(["-x", "-r", &server.url()])
        .assert()
        .success()
        .stdout(predicate::str::contains("package.json upgraded"));

    assert_eq!(
        read_manifest(&temp_dir),
        SAMPLE_MANIFEST.replace("\"^1.0.0\"", "\"^1.0.1\"")
    );
}

#[test]
fn test_fixed_and_skip_flags() {
    let mut server = Server::new();
    let _a = mock_latest(&mut server, "a", "1.2.0");
    let _b = mock_latest(&mut server, "b", "3.0.0");
    let temp_dir = create_test_project(r#"{"dependencies": {"a": "^1.0.0", "b": "^2.0.0"}}"#);

    upgradeps()
        .arg(temp_dir.path())
        .args(["-x", "-f", "-s", "b", "-r", &server.url()])
        .assert()
        .success()
        .stdout(predicate::str::contains("(skipped)"));

    let written: serde_json::Value = serde_json::from_str(&read_manifest(&temp_dir)).unwrap();
    assert_eq!(written["dependencies"]["a"], "1.2.0");
    assert_eq!(written["dependencies"]["b"], "^2.0.0");
}

#[test]
fn test_no_updates_keeps_bytes() {
    let mut server = Server::new();
    let _latest = mock_latest(&mut server, "a", "1.0.0");
    let content = "{\"dependencies\":{\"a\":\"^1.0.0\"}}";
    let temp_dir = create_test_project(content);

    upgradeps()
        .arg(temp_dir.path())
        .args(["-x", "-r", &server.url()])
        .assert()
        .success()
        .stdout(predicate::str::contains("no updates"));

    assert_eq!(read_manifest(&temp_dir), content);
}

#[test]
fn test_malformed_registry_response_fails_without_writing() {
    let mut server = Server::new();
    let _broken = server
        .mock("GET", "/left-pad")
        .with_status(200)
        .with_body("not json")
        .create();
    let _missing = mock_missing(&mut server, "ghost");
    let temp_dir = create_test_project(SAMPLE_MANIFEST);

    upgradeps()
        .arg(temp_dir.path())
        .args(["-x", "-r", &server.url()])
        .assert()
        .failure()
        .code(1);

    assert_eq!(read_manifest(&temp_dir), SAMPLE_MANIFEST);
}

#[test]
fn test_json_output() {
    let mut server = Server::new();
    let _latest = mock_latest(&mut server, "left-pad", "2.0.0");
    let _missing = mock_missing(&mut server, "ghost");
    let temp_dir = create_test_project(SAMPLE_MANIFEST);

    let output = upgradeps()
        .arg(temp_dir.path())
        .args(["-t", "-x", "--json", "-r", &server.url()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["dry_run"], true);
    assert_eq!(parsed["changed"], true);
    assert_eq!(parsed["written"], false);
    assert_eq!(parsed["summary"]["upgrades"], 1);

    let entries = parsed["dependencies"].as_array().unwrap();
    assert_eq!(entries[0]["name"], "left-pad");
    assert_eq!(entries[0]["delta"], "major");
    assert_eq!(entries[0]["new_range"], "^2.0.0");
    assert_eq!(entries[1]["name"], "ghost");
    assert_eq!(entries[1]["reason"], "not_found");
}

#[test]
fn test_config_file_applies_defaults() {
    let mut server = Server::new();
    let _latest = mock_latest(&mut server, "left-pad", "1.0.1");
    let temp_dir = create_test_project(SAMPLE_MANIFEST);
    fs::write(
        temp_dir.path().join("upgradeps.toml"),
        format!(
            "groups = [\"dependencies\"]\nfixed = true\nminimal = true\nregistry = \"{}\"\n",
            server.url()
        ),
    )
    .unwrap();

    upgradeps().arg(temp_dir.path()).assert().success();

    let written: serde_json::Value = serde_json::from_str(&read_manifest(&temp_dir)).unwrap();
    assert_eq!(written["dependencies"]["left-pad"], "1.0.1");
    assert_eq!(written["devDependencies"]["ghost"], "~2.0.0");
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = create_test_project(SAMPLE_MANIFEST);
    fs::write(temp_dir.path().join("upgradeps.toml"), "unknown-key = 1\n").unwrap();

    upgradeps()
        .arg(temp_dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("upgradeps.toml"));
}

#[test]
fn test_invalid_registry_url_fails() {
    let temp_dir = create_test_project(SAMPLE_MANIFEST);

    upgradeps()
        .arg(temp_dir.path())
        .args(["-r", "ftp://example.com"])
        .assert()
        .failure()
        .code(1);
}

//! Integration tests for the `restcrud` CLI binary.
//!
//! Argument parsing, offline commands and exit codes, plus a few item
//! commands against a wiremock backend.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `restcrud` binary with env isolation.
///
/// Clears all `RESTCRUD_*` env vars and points the config file into
/// `config_dir` so tests never touch the user's real configuration.
fn restcrud_cmd(config_dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("restcrud");
    cmd.env("HOME", config_dir)
        .env("XDG_CONFIG_HOME", config_dir)
        .env("NO_COLOR", "1")
        .env_remove("RESTCRUD_PROFILE")
        .env_remove("RESTCRUD_CONFIG")
        .env_remove("RESTCRUD_BASE_URL")
        .env_remove("RESTCRUD_RESOURCE")
        .env_remove("RESTCRUD_TOKEN")
        .env_remove("RESTCRUD_TIMEOUT")
        .env_remove("RESTCRUD_OUTPUT")
        .arg("--config")
        .arg(config_dir.join("config.toml"));
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = restcrud_cmd(dir.path());
    cmd.args(["--base-url", &server.uri(), "--token", "test-token"])
        .args(args);
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    drop(dir);
    output
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = cargo_bin_cmd!("restcrud").env("HOME", dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let dir = tempfile::tempdir().unwrap();
    restcrud_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("items")
                .and(predicate::str::contains("validate"))
                .and(predicate::str::contains("config")),
        );
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    restcrud_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("restcrud"));
}

#[test]
fn test_completions_zsh() {
    let dir = tempfile::tempdir().unwrap();
    restcrud_cmd(dir.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_output_format() {
    let dir = tempfile::tempdir().unwrap();
    let output = restcrud_cmd(dir.path())
        .args(["--output", "xml", "config", "presets"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("xml"));
}

// ── Offline validation ──────────────────────────────────────────────

#[test]
fn test_validate_reports_each_field() {
    let dir = tempfile::tempdir().unwrap();
    let output = restcrud_cmd(dir.path())
        .args(["validate", "--title", "ab"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("title: Title must be at least 3 characters"), "{text}");
    assert!(text.contains("body: Description is required"), "{text}");
}

#[test]
fn test_validate_accepts_a_good_item() {
    let dir = tempfile::tempdir().unwrap();
    restcrud_cmd(dir.path())
        .args(["validate", "--title", "Groceries", "--body", "milk, eggs and bread"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Item is valid"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    let dir = tempfile::tempdir().unwrap();
    restcrud_cmd(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_presets_plain() {
    let dir = tempfile::tempdir().unwrap();
    restcrud_cmd(dir.path())
        .args(["-o", "plain", "config", "presets"])
        .assert()
        .success()
        .stdout("jsonplaceholder\nrest\nlaravel\nexpress\ncustom\n");
}

#[test]
fn test_config_init_writes_profile() {
    let dir = tempfile::tempdir().unwrap();
    restcrud_cmd(dir.path())
        .args(["--profile", "work", "config", "init", "--preset", "laravel"])
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("default_profile = \"work\""), "{written}");
    assert!(written.contains("preset = \"laravel\""), "{written}");

    // A second init without --force refuses to overwrite.
    restcrud_cmd(dir.path())
        .args(["--profile", "work", "config", "init", "--preset", "rest"])
        .assert()
        .code(2);
}

#[test]
fn test_unknown_profile_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let output = restcrud_cmd(dir.path())
        .args(["--profile", "nope", "items", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Profile 'nope' not found"));
}

// ── Items against a mock backend ────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_items_get_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/1"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "title": "Groceries", "body": "milk, eggs and bread", "userId": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "json-compact", "items", "get", "1"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let item: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(item["title"], "Groceries");
    assert_eq!(item["userId"], 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_items_list_filters_locally() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "Groceries", "body": "milk", "userId": 1},
            {"id": 2, "title": "Chores", "body": "laundry", "userId": 1},
            {"id": 3, "title": "More groceries", "body": "bread", "userId": 2}
        ])))
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        &["-o", "plain", "items", "list", "--filter", "GROC", "--sort", "id", "--desc"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "3\n1\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_item_exits_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let output = run_against(&server, &["items", "get", "999"]).await;
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("Resource not found."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_create_never_reaches_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_against(&server, &["items", "create", "--title", "x"]).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Item is not valid"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_requires_yes_without_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_against(&server, &["items", "delete", "1"]).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_with_yes() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/posts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["-y", "items", "delete", "1"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_with_no_content_reply() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/posts/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        &["items", "update", "5", "--title", "Groceries", "--body", "milk, eggs and bread"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(output.stdout.is_empty());
    assert!(combined_output(&output).contains("Updated item 5"));
}

#[test]
fn test_unreachable_backend_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    // Nothing listens on port 9 (discard) on a test host.
    let output = restcrud_cmd(dir.path())
        .args(["--base-url", "http://127.0.0.1:9", "--token", "t", "--timeout", "2000"])
        .args(["items", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}

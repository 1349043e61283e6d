//! Integration tests for the `homedeck` binary.
//!
//! Argument parsing, config inspection and one-shot relay delivery, all
//! isolated from the user's real configuration.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_bytes, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

fn homedeck_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("homedeck");
    cmd.env("HOME", "/tmp/homedeck-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/homedeck-cli-test-nonexistent")
        .env_remove("HOMEDECK_CONFIG")
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_SERVICE_ROLE_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Run a blocking command without stalling the mock server's runtime.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = homedeck_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    homedeck_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("serve")
            .and(predicate::str::contains("relay"))
            .and(predicate::str::contains("config"))
            .and(predicate::str::contains("completions")),
    );
}

#[test]
fn test_completions_bash() {
    homedeck_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("homedeck"));
}

#[test]
fn test_relay_requires_url() {
    homedeck_cmd()
        .arg("relay")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--url"));
}

#[test]
fn test_payload_flags_conflict() {
    homedeck_cmd()
        .args(["relay", "--url", "http://x", "--payload", "{}", "--payload-file", "p.json"])
        .assert()
        .code(2);
}

// ── config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    homedeck_cmd()
        .args(["config", "path", "--config", "/etc/homedeck/custom.toml"])
        .assert()
        .success()
        .stdout("/etc/homedeck/custom.toml\n");
}

#[test]
fn test_config_show_masks_service_key() {
    let file = config_file(
        r#"
[data]
url = "https://abc.supabase.co"
service_key = "eyJ-very-secret"

[relay]
max_in_flight = 4
"#,
    );

    homedeck_cmd()
        .args(["config", "show", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("max_in_flight = 4")
                .and(predicate::str::contains("https://abc.supabase.co"))
                .and(predicate::str::contains("********"))
                .and(predicate::str::contains("eyJ-very-secret").not()),
        );
}

#[test]
fn test_config_show_json() {
    let file = config_file("[server]\nbind = \"127.0.0.1:9999\"\n");

    let output = homedeck_cmd()
        .args(["config", "show", "-o", "json", "--config"])
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["server"]["bind"], "127.0.0.1:9999");
    assert_eq!(json["relay"]["timeout_secs"], 15);
}

#[test]
fn test_missing_config_file_exits_with_config_code() {
    homedeck_cmd()
        .args(["config", "show", "--config", "/nonexistent/homedeck.toml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("config file not found"));
}

// ── relay ───────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_relay_prints_destination_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_bytes(br#"{"scene":"night"}"#.to_vec()))
        .respond_with(ResponseTemplate::new(202).set_body_string("queued"))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = homedeck_cmd();
    cmd.args(["relay", "--url", &server.uri(), "--payload", r#"{"scene":"night"}"#]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{output:?}");
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "ok": true, "status": 202, "statusText": "Accepted", "body": "queued" })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_relay_reads_payload_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_bytes(br#"{"from":"file"}"#.to_vec()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let payload = config_file(r#"{"from":"file"}"#);
    let mut cmd = homedeck_cmd();
    cmd.args(["relay", "--url", &server.uri(), "--payload-file"])
        .arg(payload.path());
    let output = run(cmd).await;

    assert!(output.status.success(), "{output:?}");
}

#[test]
fn test_relay_unreachable_destination_exits_with_connection_code() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    homedeck_cmd()
        .args(["relay", "--url", &format!("http://127.0.0.1:{port}/hook")])
        .assert()
        .code(7);
}

#[test]
fn test_relay_rejects_malformed_payload() {
    homedeck_cmd()
        .args(["relay", "--url", "http://127.0.0.1:1/hook", "--payload", "{nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid JSON payload"));
}

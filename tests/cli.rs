//! Integration tests for top-level CLI behavior.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Utc;
use httpvcr::cassette::{Body, CapturedRequest, CapturedResponse};
use httpvcr::{Cassette, Interaction};

fn run_httpvcr(args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_httpvcr");
    Command::new(bin).args(args).output().expect("failed to run httpvcr binary")
}

fn fresh_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn seed(dir: &Path, name: &str) -> PathBuf {
    let cassette = Cassette::new(dir, name);
    cassette
        .replace_all(vec![Interaction {
            request: CapturedRequest {
                method: "POST".into(),
                uri: "https://api.example.com/login?api_key=k-123".into(),
                headers: vec![("authorization".into(), "Bearer secret123".into())],
                body: Body::Text(r#"{"user":"ana","password":"hunter2"}"#.into()),
            },
            response: CapturedResponse {
                status: 201,
                headers: vec![("content-type".into(), "application/json".into())],
                body: Body::Text(r#"{"token":"tok-999"}"#.into()),
            },
            recorded_at: Utc::now(),
            duration_ms: 42,
        }])
        .unwrap();
    dir.join(format!("{name}.cassette.yaml"))
}

#[test]
fn list_prints_stored_interactions() {
    let dir = fresh_dir("httpvcr_cli_list");
    seed(&dir, "login");

    let output = run_httpvcr(&["list", dir.to_str().unwrap(), "login"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("METHOD"));
    assert!(stdout.contains("POST"));
    assert!(stdout.contains("https://api.example.com/login"));
    assert!(stdout.contains("201"));
}

#[test]
fn list_missing_cassette_reports_empty() {
    let dir = fresh_dir("httpvcr_cli_list_missing");
    let output = run_httpvcr(&["list", dir.to_str().unwrap(), "absent"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("No interactions"));
}

#[test]
fn censor_rewrites_secrets_on_disk() {
    let dir = fresh_dir("httpvcr_cli_censor");
    let file = seed(&dir, "login");

    let output = run_httpvcr(&[
        "censor",
        dir.to_str().unwrap(),
        "login",
        "--header",
        "Authorization",
        "--query",
        "api_key",
        "--body-key",
        "password",
        "--body-key",
        "token",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let yaml = std::fs::read_to_string(&file).unwrap();
    for secret in ["secret123", "k-123", "hunter2", "tok-999"] {
        assert!(!yaml.contains(secret), "{secret} still present");
    }
    assert!(yaml.contains("ana"));
}

#[test]
fn censor_without_selectors_fails() {
    let dir = fresh_dir("httpvcr_cli_censor_empty");
    seed(&dir, "login");

    let output = run_httpvcr(&["censor", dir.to_str().unwrap(), "login"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("Nothing to censor"));
}

#[test]
fn erase_removes_cassette_file() {
    let dir = fresh_dir("httpvcr_cli_erase");
    let file = seed(&dir, "login");
    assert!(file.exists());

    let output = run_httpvcr(&["erase", dir.to_str().unwrap(), "login"]);
    assert!(output.status.success());
    assert!(!file.exists());

    let again = run_httpvcr(&["erase", dir.to_str().unwrap(), "login"]);
    assert!(again.status.success());
}

#[test]
fn help_lists_subcommands() {
    let output = run_httpvcr(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    for name in ["list", "erase", "censor"] {
        assert!(stdout.contains(name));
    }
}

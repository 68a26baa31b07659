//! Integration tests for line-mode chat against a mock endpoint.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a temp PLATEN_HOME with instant reveal and the given endpoint.
fn temp_platen_home(endpoint: &str) -> TempDir {
    let home = TempDir::new().expect("create temp platen home");
    fs::write(
        home.path().join("config.toml"),
        format!("endpoint = \"{endpoint}\"\nreveal_interval_ms = 0\n"),
    )
    .unwrap();
    home
}

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

#[tokio::test]
async fn test_chat_round_trip() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/query"))
        .and(body_partial_json(serde_json::json!({
            "query": "what is platen",
            "top_k": 3,
        })))
        .and(header_exists("x-conversation-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "It renders **formatted** answers."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let home = temp_platen_home(&format!("{}/api/query", mock_server.uri()));

    cargo_bin_cmd!("platen")
        .env("PLATEN_HOME", home.path())
        .arg("chat")
        .write_stdin("what is platen\n:q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("It renders formatted answers."))
        .stdout(predicate::str::contains("Goodbye!"));

    // The conversation token is minted on first run.
    let token = fs::read_to_string(home.path().join("conversation")).unwrap();
    assert!(!token.trim().is_empty());
}

#[tokio::test]
async fn test_chat_paragraphs_print_as_blank_line() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "first paragraph\n\nsecond paragraph"
        })))
        .mount(&mock_server)
        .await;

    let home = temp_platen_home(&format!("{}/api/query", mock_server.uri()));

    cargo_bin_cmd!("platen")
        .env("PLATEN_HOME", home.path())
        .arg("chat")
        .write_stdin("hi\n:q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("first paragraph\n\nsecond paragraph"));
}

#[tokio::test]
async fn test_chat_unreachable_endpoint_shows_fallback() {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join("config.toml"),
        "endpoint = \"http://127.0.0.1:1/api/query\"\nreveal_interval_ms = 0\nrequest_timeout_secs = 2\n",
    )
    .unwrap();

    cargo_bin_cmd!("platen")
        .env("PLATEN_HOME", home.path())
        .arg("chat")
        .write_stdin("hi\n:q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Sorry, I'm having trouble connecting to the server.",
        ));
}

#[tokio::test]
async fn test_chat_reuses_conversation_token() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "ok"
        })))
        .mount(&mock_server)
        .await;

    let home = temp_platen_home(&format!("{}/api/query", mock_server.uri()));
    fs::write(home.path().join("conversation"), "fixed-token\n").unwrap();

    cargo_bin_cmd!("platen")
        .env("PLATEN_HOME", home.path())
        .arg("chat")
        .write_stdin("hi\n:q\n")
        .assert()
        .success();

    let token = fs::read_to_string(home.path().join("conversation")).unwrap();
    assert_eq!(token.trim(), "fixed-token");
}

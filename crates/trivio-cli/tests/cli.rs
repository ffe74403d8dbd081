//! CLI tests against a mock API.
//!
//! The binary runs as a child process; wiremock serves from its own thread,
//! so the blocking wait happens on a blocking task.

use std::process::{Command, Output};

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Run the CLI binary with arguments, without inheriting credentials.
async fn run_cli(args: &[&str]) -> Output {
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_trivio"))
            .args(&args)
            .env_remove("TRIVIO_API_URL")
            .env_remove("TRIVIO_USERNAME")
            .env_remove("TRIVIO_PASSWORD")
            .env_remove("EMAIL_HUNTER_API_KEY")
            .env_remove("CLEARBIT_API_KEY")
            .output()
            .expect("Failed to execute CLI")
    })
    .await
    .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[tokio::test]
async fn test_fetch_prints_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/lookup", server.uri());
    let output = run_cli(&["fetch", &url]).await;

    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(body, json!({"answer": 42}));
}

#[tokio::test]
async fn test_fetch_rejected_is_not_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/people/nobody", server.uri());
    let output = run_cli(&["fetch", &url, "--no-retry-status", "404"]).await;

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("404"));
}

#[tokio::test]
async fn test_fetch_gave_up_exits_non_zero() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let url = format!("{}/flaky", server.uri());
    let output = run_cli(&[
        "fetch",
        &url,
        "--max-attempts",
        "2",
        "--retry-interval",
        "0.01",
    ])
    .await;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("after 2 attempts"));
}

#[tokio::test]
async fn test_fetch_malformed_url_fails_fast() {
    let output = run_cli(&["fetch", "not-a-url", "--retry-interval", "30"]).await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid URL"));
    assert!(!stderr.contains("attempts"));
}

#[tokio::test]
async fn test_login_with_bad_password_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let api = format!("{}/api/v1", server.uri());
    let output = run_cli(&[
        "login",
        "--api-url",
        &api,
        "--username",
        "alice",
        "--password",
        "wrong",
    ])
    .await;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("login rejected"));
}

#[tokio::test]
async fn test_request_logs_in_and_prints_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "a1",
            "refresh": "r1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts/"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let api = format!("{}/api/v1", server.uri());
    let output = run_cli(&[
        "request",
        "get",
        "/posts/",
        "--api-url",
        &api,
        "--username",
        "alice",
        "--password",
        "secret",
    ])
    .await;

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("200"));
    assert!(out.contains("\"id\": 1"));
}

#[tokio::test]
async fn test_enrich_without_key_prints_empty_object() {
    let output = run_cli(&["enrich-email", "alice@example.com"]).await;

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "{}");
}

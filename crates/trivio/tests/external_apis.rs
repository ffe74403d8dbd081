//! Email verification and enrichment against mocked third-party APIs.

mod common;

use serde_json::json;
use trivio::Error;
use trivio::external::{EmailEnricher, EmailVerifier};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::recording_requester;

fn verifier(server: &MockServer) -> EmailVerifier {
    let (requester, _) = recording_requester();
    EmailVerifier::new(requester, Some("hunter-key".to_string()))
        .with_endpoint(format!("{}/v2/email-verifier", server.uri()))
}

fn enricher(server: &MockServer) -> EmailEnricher {
    let (requester, _) = recording_requester();
    EmailEnricher::new(requester, Some("clearbit-key".to_string()))
        .with_endpoint(format!("{}/v1/people/email", server.uri()))
}

#[tokio::test]
async fn test_deliverable_address_is_verified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/email-verifier"))
        .and(query_param("email", "alice@example.com"))
        .and(query_param("api_key", "hunter-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "status": "valid",
                "regexp": true,
                "smtp_server": true,
                "smtp_check": true
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(verifier(&server).verify("alice@example.com").await.unwrap());
}

#[tokio::test]
async fn test_failed_smtp_check_is_not_verified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/email-verifier"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"regexp": true, "smtp_server": true, "smtp_check": false}
        })))
        .mount(&server)
        .await;

    assert!(!verifier(&server).verify("alice@example.com").await.unwrap());
}

#[tokio::test]
async fn test_malformed_address_skips_the_api() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(!verifier(&server).verify("alice at example").await.unwrap());
}

#[tokio::test]
async fn test_unreachable_verifier_is_not_verified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/email-verifier"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    assert!(!verifier(&server).verify("alice@example.com").await.unwrap());
}

#[tokio::test]
async fn test_verifier_response_without_verdict_is_bad_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/email-verifier"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"errors": []})))
        .mount(&server)
        .await;

    let err = verifier(&server)
        .verify("alice@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadResponse(_)));
}

#[tokio::test]
async fn test_enrichment_returns_profile() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/people/email/alice@example.com"))
        .and(header("authorization", "Bearer clearbit-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": {"fullName": "Alice Smith"},
            "location": "Lisbon"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let profile = enricher(&server).enrich("alice@example.com").await.unwrap();
    assert_eq!(profile["name"]["fullName"], "Alice Smith");
}

#[tokio::test]
async fn test_enrichment_without_answer_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;

    let profile = enricher(&server).enrich("nobody@example.com").await.unwrap();
    assert_eq!(profile, json!({}));
}

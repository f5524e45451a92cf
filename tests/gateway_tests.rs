//! End-to-end tests against a mock gateway.

use pretty_assertions::assert_eq;
use serde_json::json;
use services_cloud_client::{
    Document, OutputFormat, Pdf2TxtOptions, Pdf2TxtOutput, ServiceClient, ServicesCloudClient,
    ServicesCloudError,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVICES: [&str; 4] = ["office2pdf", "pdf2img", "pdf2txt", "watermarker"];

/// Gateway accepting only `valid-key`, answering 403 otherwise.
async fn setup_gateway() -> MockServer {
    let server = MockServer::start().await;

    for service in SERVICES {
        Mock::given(method("GET"))
            .and(path(format!("/{}/v1/health", service)))
            .and(header("X-Api-Key", "valid-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "up"})))
            .mount(&server)
            .await;
    }

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Forbidden"})))
        .with_priority(10)
        .mount(&server)
        .await;

    server
}

fn client(api_key: &str, api_url: &str) -> ServicesCloudClient {
    ServicesCloudClient::new(Some(api_key), Some(api_url), None).unwrap()
}

fn assert_health_is(health: &services_cloud_client::ServicesHealth, expected: bool) {
    assert_eq!(health.len(), 4);
    for service in SERVICES {
        assert_eq!(health.get(service), Some(expected), "service {}", service);
    }
}

#[tokio::test]
async fn test_health_with_valid_key() {
    let server = setup_gateway().await;
    let client = client("valid-key", &server.uri());

    assert!(client.office2pdf().check_service_health().await);

    let health = client.check_services_health().await;
    assert_health_is(&health, true);
    assert_eq!(
        health.iter().map(|(name, _)| name).collect::<Vec<_>>(),
        SERVICES.to_vec()
    );
}

#[tokio::test]
async fn test_health_with_invalid_key() {
    let server = setup_gateway().await;
    let client = client("invalid-api-key", &server.uri());

    assert_health_is(&client.check_services_health().await, false);
}

#[tokio::test]
async fn test_health_with_wrong_gateway() {
    let server = MockServer::start().await;
    let client = client("valid-key", &server.uri());

    assert_health_is(&client.check_services_health().await, false);
}

#[tokio::test]
async fn test_health_with_unreachable_gateway() {
    let client = client("valid-key", "http://127.0.0.1:1");

    assert_health_is(&client.check_services_health().await, false);
}

#[tokio::test]
async fn test_extract_through_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pdf2txt/v1/extract"))
        .and(header("X-Api-Key", "valid-key"))
        .and(body_string_contains("name=\"format\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pages": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client("valid-key", &format!("{}/", server.uri()));
    let output = client
        .pdf2txt()
        .extract(
            Document::pdf(b"%PDF-1.7".to_vec()),
            Pdf2TxtOptions::default().format(OutputFormat::Json),
        )
        .await
        .unwrap();

    assert_eq!(output, Pdf2TxtOutput::Json(json!({"pages": []})));
}

#[tokio::test]
async fn test_rejected_key_surfaces_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Invalid API key"})))
        .mount(&server)
        .await;

    let client = client("invalid-api-key", &server.uri());
    let err = client
        .office2pdf()
        .convert(Document::new("letter.docx", b"PK".to_vec()))
        .await
        .unwrap_err();

    match err {
        ServicesCloudError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Invalid API key");
        }
        other => panic!("Expected API error, got {:?}", other),
    }
}

#[test]
fn test_empty_api_key_rejected() {
    let result = ServicesCloudClient::new(Some(""), Some("https://example.com"), None);
    assert!(matches!(result, Err(ServicesCloudError::Configuration { .. })));
}

#[test]
fn test_invalid_api_url_rejected() {
    let result = ServicesCloudClient::new(Some("key"), Some("not a url"), None);
    assert!(matches!(result, Err(ServicesCloudError::Configuration { .. })));
}

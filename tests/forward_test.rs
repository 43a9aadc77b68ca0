//! File forwarding integration tests.

mod common;

use common::{create_test_config, file_form, unreachable_url, TestServer, API_KEY, DOWNSTREAM_KEY};
use relay_gateway::ErrorMode;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_forward_txt_file() {
    let downstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/file/testuser"))
        .and(header("x-api-key", DOWNSTREAM_KEY))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"filename": "a.txt", "stored": true})),
        )
        .expect(1)
        .mount(&downstream)
        .await;

    let server = TestServer::start(&downstream.uri(), &unreachable_url()).await;

    let response = server
        .client()
        .post(server.url("/file/testuser"))
        .header("x-api-key", API_KEY)
        .multipart(file_form("a.txt", b"hello", "text/plain"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json, json!({"filename": "a.txt", "stored": true}));

    // Inspect what the downstream actually received
    let requests = downstream.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&requests[0].body).to_lowercase();
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"a.txt\""));
    assert!(body.contains("content-type: text/plain"));
    assert!(body.contains("\r\n\r\nhello\r\n"));
}

#[tokio::test]
async fn test_forward_png_file() {
    let downstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/file/alice"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&downstream)
        .await;

    let server = TestServer::start(&downstream.uri(), &unreachable_url()).await;

    let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    let response = server
        .client()
        .post(server.url("/file/alice"))
        .header("x-api-key", API_KEY)
        .multipart(file_form("logo.png", &png, "image/png"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    // Bytes are relayed untouched
    let requests = downstream.received_requests().await.unwrap();
    let body = &requests[0].body;
    assert!(body.windows(png.len()).any(|w| w == png));
}

#[tokio::test]
async fn test_missing_api_key() {
    let downstream = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&downstream)
        .await;

    let server = TestServer::start(&downstream.uri(), &unreachable_url()).await;

    let response = server
        .client()
        .post(server.url("/file/testuser"))
        .multipart(file_form("a.txt", b"hello", "text/plain"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "unauthorized");
}

#[tokio::test]
async fn test_wrong_api_key() {
    let downstream = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&downstream)
        .await;

    let server = TestServer::start(&downstream.uri(), &unreachable_url()).await;

    let response = server
        .client()
        .post(server.url("/file/testuser"))
        .header("x-api-key", "not-the-key")
        .multipart(file_form("a.txt", b"hello", "text/plain"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_disallowed_extension() {
    let downstream = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&downstream)
        .await;

    let server = TestServer::start(&downstream.uri(), &unreachable_url()).await;

    let response = server
        .client()
        .post(server.url("/file/testuser"))
        .header("x-api-key", API_KEY)
        .multipart(file_form("report.pdf", b"%PDF-1.7", "application/pdf"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "invalid_payload");
    assert!(json["detail"].as_str().unwrap().contains(".txt"));
}

#[tokio::test]
async fn test_missing_file_field() {
    let downstream = MockServer::start().await;
    let server = TestServer::start(&downstream.uri(), &unreachable_url()).await;

    let form = reqwest::multipart::Form::new().text("note", "no file here");

    let response = server
        .client()
        .post(server.url("/file/testuser"))
        .header("x-api-key", API_KEY)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    assert!(downstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_downstream_error_status_strict() {
    let downstream = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("user not found"))
        .expect(1)
        .mount(&downstream)
        .await;

    let server = TestServer::start_with_mode(&downstream.uri(), ErrorMode::Strict).await;

    let response = server
        .client()
        .post(server.url("/file/ghost"))
        .header("x-api-key", API_KEY)
        .multipart(file_form("a.txt", b"hello", "text/plain"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "downstream_error");
    assert_eq!(json["detail"], "Downstream server error: user not found");
}

#[tokio::test]
async fn test_downstream_error_status_permissive() {
    let downstream = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("user not found"))
        .expect(1)
        .mount(&downstream)
        .await;

    let server = TestServer::start_with_mode(&downstream.uri(), ErrorMode::Permissive).await;

    let response = server
        .client()
        .post(server.url("/file/ghost"))
        .header("x-api-key", API_KEY)
        .multipart(file_form("a.txt", b"hello", "text/plain"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 500);
    let json: Value = response.json().await.unwrap();
    assert!(json["detail"].as_str().unwrap().contains("user not found"));
}

#[tokio::test]
async fn test_downstream_unreachable() {
    let target = unreachable_url();

    let strict = TestServer::start_with_mode(&target, ErrorMode::Strict).await;
    let response = strict
        .client()
        .post(strict.url("/file/testuser"))
        .header("x-api-key", API_KEY)
        .multipart(file_form("a.txt", b"hello", "text/plain"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 503);

    let permissive = TestServer::start_with_mode(&target, ErrorMode::Permissive).await;
    let response = permissive
        .client()
        .post(permissive.url("/file/testuser"))
        .header("x-api-key", API_KEY)
        .multipart(file_form("a.txt", b"hello", "text/plain"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn test_downstream_timeout_strict() {
    let downstream = MockServer::start().await;

    // Configured downstream timeout is one second
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"late": true}))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&downstream)
        .await;

    let server = TestServer::start_with_mode(&downstream.uri(), ErrorMode::Strict).await;

    let response = server
        .client()
        .post(server.url("/file/testuser"))
        .header("x-api-key", API_KEY)
        .multipart(file_form("a.txt", b"hello", "text/plain"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 503);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "service_unavailable");
}

#[tokio::test]
async fn test_username_stays_one_path_segment() {
    let downstream = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(2)
        .mount(&downstream)
        .await;

    let server = TestServer::start(&downstream.uri(), &unreachable_url()).await;

    for username in ["..%2Fadmin%2Fpurge", "a%3Fx%3D1"] {
        let response = server
            .client()
            .post(server.url(&format!("/file/{}", username)))
            .header("x-api-key", API_KEY)
            .multipart(file_form("a.txt", b"hello", "text/plain"))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 200);
    }

    let requests = downstream.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    assert_eq!(requests[0].url.path(), "/file/..%2Fadmin%2Fpurge");
    assert_eq!(requests[0].url.query(), None);
    assert_eq!(
        requests[0]
            .headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok()),
        Some(DOWNSTREAM_KEY)
    );

    assert_eq!(requests[1].url.path(), "/file/a%3Fx=1");
    assert_eq!(requests[1].url.query(), None);
}

/// Gateway with a 1 KiB body limit; oversized bodies stay small enough to be
/// fully written before the server answers
async fn small_limit_server(downstream_url: &str) -> TestServer {
    let mut config = create_test_config(downstream_url, &unreachable_url());
    config.server.max_body_size = 1024;
    TestServer::start_with_config(config).await
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let downstream = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&downstream)
        .await;

    let server = small_limit_server(&downstream.uri()).await;

    let response = server
        .client()
        .post(server.url("/file/testuser"))
        .header("x-api-key", API_KEY)
        .multipart(file_form("big.txt", &[b'x'; 4096], "text/plain"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 413);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "payload_too_large");
    assert_eq!(json["status"], 413);
}

#[tokio::test]
async fn test_oversized_upload_without_key_is_unauthorized() {
    let downstream = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&downstream)
        .await;

    let server = small_limit_server(&downstream.uri()).await;

    let response = server
        .client()
        .post(server.url("/file/testuser"))
        .multipart(file_form("big.txt", &[b'x'; 4096], "text/plain"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "unauthorized");
}

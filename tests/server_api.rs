mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use common::{app, app_with, get, send, test_config};
use stormforge::{AppConfig, ServerHandle};

#[tokio::test]
async fn test_health_reports_ok() {
    let app = app().await;

    let resp = get(&app, "/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["status"], "OK");
    assert!(resp.body["uptime"].as_f64().unwrap() >= 0.0);

    let ts = resp.body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let app = app().await;

    let resp = get(&app, "/health").await;
    assert_eq!(resp.headers["x-content-type-options"], "nosniff");
    assert_eq!(resp.headers["x-frame-options"], "SAMEORIGIN");
    assert!(resp.headers.contains_key("strict-transport-security"));
    assert!(resp.headers.contains_key("referrer-policy"));

    let csp = resp.headers["content-security-policy"].to_str().unwrap();
    assert!(csp.starts_with("default-src 'self';"));
    assert!(csp.contains("script-src 'self'"));

    // Swagger UI still loads under the policy.
    let docs = get(&app, "/docs/").await;
    assert_eq!(docs.status, StatusCode::OK);
    assert!(docs.headers.contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_cors_mirrors_origin_by_default() {
    let app = app().await;

    let req = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://test")
        .body(Body::empty())
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://test");
}

#[tokio::test]
async fn test_cors_restricts_to_configured_origins() {
    let mut cfg = test_config();
    cfg.cors.allowed_origins = vec!["https://app.example.com".to_string()];
    let app = app_with(&cfg).await;

    let allowed = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://app.example.com")
        .body(Body::empty())
        .unwrap();
    let resp = send(&app, allowed).await;
    assert_eq!(
        resp.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );

    let denied = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://evil.example.com")
        .body(Body::empty())
        .unwrap();
    let resp = send(&app, denied).await;
    assert!(!resp.headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_request_id_is_generated_or_propagated() {
    let app = app().await;

    let resp = get(&app, "/health").await;
    let generated = resp.headers["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());

    let req = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-123")
        .body(Body::empty())
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.headers["x-request-id"], "trace-123");
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = app().await;

    let resp = get(&app, "/nonexistent").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_openapi_document_lists_user_routes() {
    let app = app().await;

    let resp = get(&app, "/api-doc/openapi.json").await;
    assert_eq!(resp.status, StatusCode::OK);

    let paths = resp.body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/health"));
    assert!(paths.contains_key("/api/users"));
    assert!(paths.contains_key("/api/users/{id}"));
    assert!(paths["/api/users/{id}"].get("patch").is_some());
    assert_eq!(resp.body["info"]["title"], "StormForge API");
}

#[tokio::test]
async fn test_swagger_ui_is_served() {
    let app = app().await;

    let resp = get(&app, "/docs/").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&resp.raw).contains("swagger"));
}

#[tokio::test]
async fn test_large_responses_are_compressed() {
    let app = app().await;

    let req = Request::builder()
        .uri("/api-doc/openapi.json")
        .header(header::ACCEPT_ENCODING, "gzip")
        .body(Body::empty())
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.headers[header::CONTENT_ENCODING], "gzip");
}

#[tokio::test]
async fn test_rate_limit_rejects_after_burst() {
    let mut cfg = test_config();
    cfg.rate_limit.enabled = true;
    cfg.rate_limit.burst_size = 2;
    cfg.rate_limit.replenish_interval_ms = 60_000;
    let app = app_with(&cfg).await;

    let request = |ip: &str| {
        Request::builder()
            .uri("/health")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    };

    assert_eq!(send(&app, request("10.0.0.1")).await.status, StatusCode::OK);
    assert_eq!(send(&app, request("10.0.0.1")).await.status, StatusCode::OK);
    assert_eq!(
        send(&app, request("10.0.0.1")).await.status,
        StatusCode::TOO_MANY_REQUESTS
    );

    // Other clients have their own bucket.
    assert_eq!(send(&app, request("10.0.0.2")).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_server_lifecycle() {
    let mut cfg = AppConfig::default();
    cfg.server.host = "127.0.0.1".to_string();
    cfg.server.port = 0;
    cfg.server.shutdown_timeout = 5;
    cfg.database.url = "sqlite::memory:".to_string();
    cfg.database.max_connections = 1;
    cfg.database.min_connections = 1;

    let handle = ServerHandle::start(cfg).await.expect("server starts");

    let mut stream = TcpStream::connect(handle.local_addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut raw))
        .await
        .expect("response in time")
        .unwrap();

    let text = String::from_utf8_lossy(&raw);
    assert!(text.starts_with("HTTP/1.1 200"), "{text}");
    assert!(text.contains("\"status\":\"OK\""));

    tokio::time::timeout(Duration::from_secs(10), handle.shutdown())
        .await
        .expect("shutdown completes");
}

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;

use stormforge::infrastructure::database::migrator::Migrator;
use stormforge::{create_api_router, init_database, AppConfig, DatabaseConfig, UserRepository};

/// Config for router tests: rate limiting off, since oneshot requests carry no peer address.
pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.rate_limit.enabled = false;
    cfg
}

/// Router over a fresh, migrated in-memory SQLite database.
pub async fn app_with(cfg: &AppConfig) -> Router {
    let db = init_database(&DatabaseConfig::in_memory())
        .await
        .expect("connect sqlite");
    Migrator::up(&db, None).await.expect("migrate");
    create_api_router(Arc::new(UserRepository::new(db)), cfg)
}

pub async fn app() -> Router {
    app_with(&test_config()).await
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub raw: Vec<u8>,
    pub body: Value,
}

pub async fn send(app: &Router, req: Request<Body>) -> TestResponse {
    let resp = app.clone().oneshot(req).await.expect("infallible");
    let status = resp.status();
    let headers = resp.headers().clone();
    let raw = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec();
    let body = serde_json::from_slice(&raw).unwrap_or(Value::Null);
    TestResponse {
        status,
        headers,
        raw,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, req).await
}

pub async fn delete(app: &Router, uri: &str) -> TestResponse {
    let req = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> TestResponse {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

//! Request correlation
//!
//! Every request runs inside a `request` span tagged with its `x-request-id`,
//! and the id is echoed on the response so clients can quote it.

use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Client-supplied id, or a fresh UUID v4 when missing, empty or not ASCII.
fn resolve_request_id(headers: &HeaderMap) -> HeaderValue {
    headers
        .get(REQUEST_ID_HEADER)
        .filter(|v| !v.is_empty() && v.to_str().is_ok())
        .cloned()
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        })
}

pub async fn request_id_middleware(request: Request<Body>, next: Next) -> Response {
    let request_id = resolve_request_id(request.headers());
    let span = tracing::info_span!(
        "request",
        request_id = request_id.to_str().unwrap_or_default(),
        method = %request.method(),
        path = request.uri().path(),
    );

    let started = Instant::now();
    let mut response = async move {
        let response = next.run(request).await;
        debug!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        response
    }
    .instrument(span)
    .await;

    response.headers_mut().insert(REQUEST_ID_HEADER, request_id);
    response
}

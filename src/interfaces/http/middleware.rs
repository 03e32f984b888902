//! Production middleware for the API router
//!
//! CORS, security response headers and per-client rate limiting.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tokio::task::JoinHandle;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use super::modules::request_id::REQUEST_ID_HEADER;
use crate::config::{CorsConfig, RateLimitConfig};

/// Headers added to every response unless a handler already set them.
const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
         form-action 'self';frame-ancestors 'self';img-src 'self' data:;\
         object-src 'none';script-src 'self';script-src-attr 'none';\
         style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-xss-protection", "0"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-permitted-cross-domain-policies", "none"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
];

/// How often idle rate-limit buckets are dropped.
const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// CORS layer. A wildcard origin list mirrors the request origin.
pub fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let origin = if cfg.allows_any() {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = cfg
            .allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, request_id.clone()])
        .expose_headers([request_id])
}

/// Wrap `router` with the static security headers.
pub fn with_security_headers(router: Router) -> Router {
    SECURITY_HEADERS.iter().fold(router, |router, &(name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
    })
}

/// Wrap `router` with a per-client token bucket.
///
/// Clients are keyed by `X-Forwarded-For` / `X-Real-Ip` / `Forwarded`, falling
/// back to the peer address, so the server must be started with connect info.
/// Must be called from within a Tokio runtime.
pub fn with_rate_limit(router: Router, cfg: &RateLimitConfig) -> Router {
    if !cfg.enabled {
        return router;
    }

    let Some(governor_conf) = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_millisecond(cfg.replenish_interval_ms)
        .burst_size(cfg.burst_size)
        .finish()
    else {
        warn!("Invalid rate limit settings, rate limiting disabled");
        return router;
    };

    spawn_periodic_sweep(
        governor_conf.limiter(),
        LIMITER_CLEANUP_INTERVAL,
        |limiter| limiter.retain_recent(),
    );

    info!(
        burst = cfg.burst_size,
        replenish_ms = cfg.replenish_interval_ms,
        "Rate limiting enabled"
    );

    router.layer(GovernorLayer::new(governor_conf))
}

/// Run `sweep` on `target` every `period` until the last strong reference
/// to `target` is dropped.
fn spawn_periodic_sweep<T, F>(target: &Arc<T>, period: Duration, sweep: F) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
    F: Fn(&T) + Send + 'static,
{
    let target = Arc::downgrade(target);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let Some(target) = target.upgrade() else {
                break;
            };
            sweep(&target);
        }
    })
}

//! HTTP REST API interfaces
//!
//! - `common`: error mapping and the validated JSON extractor
//! - `middleware`: CORS, security headers, rate limiting
//! - `modules`: feature modules (users, health, request id)
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{api_doc, create_api_router, ApiDoc};

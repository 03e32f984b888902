//! # StormForge
//!
//! REST API service exposing CRUD over a single `User` resource, backed by
//! SeaORM, with Swagger documentation and production middleware.
//!
//! ## Architecture
//!
//! - **domain**: User entity, DTOs, errors and the repository port
//! - **application**: use-case orchestration (`UserService`)
//! - **infrastructure**: SeaORM entities, migrations and repositories, plus an in-memory store
//! - **interfaces**: HTTP router, handlers, middleware and OpenAPI docs
//! - **shared**: graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig, ConfigError};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, InMemoryUserRepository, UserRepository};

// Re-export API router
pub use interfaces::http::create_api_router;

pub use server::{ServerError, ServerHandle};

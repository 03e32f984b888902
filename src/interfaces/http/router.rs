//! API Router with Swagger UI

use std::sync::Arc;

use axum::{
    http::{Method, Uri},
    middleware,
    routing::get,
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::common::{ApiError, ErrorResponse};
use super::middleware::{cors_layer, with_rate_limit, with_security_headers};
use super::modules::health::{self, HealthResponse, HealthState};
use super::modules::request_id::request_id_middleware;
use super::modules::users::{
    self, CreateUserRequest, UpdateUserRequest, UserDto, UserHandlerState, UserListResponse,
};
use crate::application::UserService;
use crate::config::AppConfig;
use crate::domain::UserRepositoryInterface;

/// Path the OpenAPI JSON document is served from.
pub const OPENAPI_PATH: &str = "/api-doc/openapi.json";
/// Mount point of the Swagger UI.
pub const DOCS_PATH: &str = "/docs";

/// Service-level OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(health::health_check),
    components(schemas(HealthResponse, ErrorResponse)),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Users", description = "User CRUD operations"),
    ),
    info(
        title = "StormForge API",
        version = "1.0.0",
        description = "Production-ready REST API for user management",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// User endpoints, documented relative to their mount point
#[derive(OpenApi)]
#[openapi(
    paths(
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
    ),
    components(schemas(UserDto, UserListResponse, CreateUserRequest, UpdateUserRequest))
)]
pub struct UsersApi;

/// Full OpenAPI document with the user paths rooted at `prefix`.
pub fn api_doc(prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let mut user_doc = UsersApi::openapi();

    let paths = std::mem::take(&mut user_doc.paths.paths);
    user_doc.paths.paths = paths
        .into_iter()
        .map(|(path, item)| (format!("{}{}", prefix, path.trim_end_matches('/')), item))
        .collect();

    doc.merge(user_doc);
    doc
}

async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::NotFound(format!("Route {} {} not found", method, uri.path()))
}

/// Create the API router with all routes and middleware
pub fn create_api_router(repo: Arc<dyn UserRepositoryInterface>, cfg: &AppConfig) -> Router {
    let prefix = cfg.server.api_prefix.as_str();

    let user_state = UserHandlerState {
        user_service: UserService::new(repo),
    };

    // The collection answers on the bare prefix and with a trailing slash.
    let collection = get(users::list_users).post(users::create_user);
    let user_routes = Router::new()
        .route(prefix, collection.clone())
        .route(&format!("{}/", prefix), collection)
        .route(
            &format!("{}/{{id}}", prefix),
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .with_state(user_state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(HealthState::new());

    let swagger_routes = SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, api_doc(prefix));

    let router = Router::new()
        // Swagger UI
        .merge(swagger_routes)
        // Health
        .merge(health_routes)
        // Users
        .merge(user_routes)
        .fallback(not_found)
        .method_not_allowed_fallback(not_found);

    // Middleware, innermost first
    let router = with_rate_limit(router, &cfg.rate_limit);
    with_security_headers(router)
        .layer(cors_layer(&cfg.cors))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_paths_are_rooted_at_prefix() {
        let doc = api_doc("/api/users");
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/api/users"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/users/{id}"));
        assert!(paths.iter().any(|p| p.as_str() == "/health"));
        assert!(!paths.iter().any(|p| p.as_str() == "/"));
    }

    #[test]
    fn test_custom_prefix() {
        let doc = api_doc("/v2/members");
        assert!(doc.paths.paths.contains_key("/v2/members/{id}"));
    }

    #[test]
    fn test_schemas_are_registered() {
        let doc = api_doc("/api/users");
        let components = doc.components.expect("components");
        for name in ["UserDto", "CreateUserRequest", "UpdateUserRequest", "ErrorResponse"] {
            assert!(components.schemas.contains_key(name), "missing {name}");
        }
    }
}

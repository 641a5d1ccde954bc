//! HTTP API routes and handlers.
//!
//! This module contains all HTTP endpoint implementations organized by domain:
//! - `events` - Event management, check-in recording, attendance export
//! - `participants` - Participant directory
//! - `properties` - Property directory
//! - `health` - Service health checks
//! - `error` - API error types
//! - `openapi` - OpenAPI specification generation

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::SharedState;

pub mod error;
pub mod events;
pub mod health;
pub mod openapi;
pub mod participants;
pub mod properties;

// Re-export commonly used types
#[allow(unused_imports)]
pub use error::{ApiError, ApiResult, ErrorResponse};

// Re-export OpenAPI utilities for the gen-openapi binary
#[allow(unused_imports)]
pub use openapi::get_openapi_json;

/// Creates the combined API router with all endpoints.
///
/// # Route Structure
///
/// ```text
/// /health                - Health check
/// /api
/// ├── /events            - Event CRUD, range queries, check-in, CSV export
/// ├── /participants      - Participant directory
/// ├── /properties        - Property directory
/// ├── /openapi.json      - OpenAPI specification
/// └── /docs              - Swagger UI
/// ```
pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        .nest("/health", health::router())
        .nest(
            "/api",
            Router::new()
                // OpenAPI spec at /api/openapi.json
                .route("/openapi.json", get(openapi::get_openapi_spec))
                // Event management and check-in
                .nest("/events", events::router())
                // Directories
                .nest("/participants", participants::router())
                .nest("/properties", properties::router()),
        )
        .merge(
            SwaggerUi::new("/api/docs")
                .url("/api/docs/openapi.json", openapi::ApiDoc::openapi()),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS restricted to the configured frontend origin, matching where the
/// check-in pages are actually served.
fn cors_layer(state: &SharedState) -> CorsLayer {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    match state.config.frontend.base_url.parse::<HeaderValue>() {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(
                base_url = %state.config.frontend.base_url,
                error = %e,
                "frontend base URL is not a valid CORS origin; cross-origin requests will fail"
            );
        }
    }

    cors
}

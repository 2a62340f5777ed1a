//! Route definitions.

use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Creates the router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Browser front ends are served from other origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route(
            "/query",
            post(handlers::query).fallback(handlers::method_not_allowed),
        )
        .route(
            "/test-connection",
            post(handlers::test_connection).fallback(handlers::method_not_allowed),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

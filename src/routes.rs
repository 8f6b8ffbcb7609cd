//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /r/{short_code}` - Short link redirect (public)
//! - `GET  /health`         - Health check: DB, click queue (public)
//! - `/api/auth/*`          - Registration and login (public)
//! - `/api/*`               - REST API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-client sliding window over every route
//! - **Authentication** - Bearer token on protected API routes
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the application router without path normalization.
///
/// Rate limiting runs before authentication, so rejected clients never
/// reach token verification.
pub fn router(state: AppState) -> Router {
    let protected = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let api_router = api::routes::public_routes().merge(protected);

    Router::new()
        .route("/r/{short_code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ))
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
///
/// Trailing slashes are trimmed before routing, so `/api/links/` matches
/// `/api/links`.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

//! API route configuration.
//!
//! Account creation and login are public; everything else requires Bearer
//! token authentication via [`crate::api::middleware::auth`].

use crate::api::handlers::{
    create_link_handler, delete_link_handler, get_link_handler, link_stats_handler,
    list_links_handler, login_handler, profile_handler, register_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes reachable without a token.
///
/// - `POST /auth/register` - Create an account
/// - `POST /auth/login`    - Exchange credentials for a token
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
}

/// Routes protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `GET    /auth/profile` - Current user
/// - `POST   /links`        - Create a link
/// - `GET    /links`        - List own links (`limit`, `offset`)
/// - `GET    /links/stats`  - Aggregated counters over own links
/// - `GET    /links/{id}`   - Fetch one link
/// - `PUT    /links/{id}`   - Update a link
/// - `DELETE /links/{id}`   - Delete a link
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/profile", get(profile_handler))
        .route("/links", post(create_link_handler).get(list_links_handler))
        .route("/links/stats", get(link_stats_handler))
        .route(
            "/links/{id}",
            get(get_link_handler)
                .put(update_link_handler)
                .delete(delete_link_handler),
        )
}

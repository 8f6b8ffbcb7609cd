//! Handlers for link management endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::link::{
    CreateLinkRequest, LinkResponse, ListLinksResponse, PageInfo, StatsResponse,
    UpdateLinkRequest,
};
use crate::api::dto::pagination::ListParams;
use crate::api::middleware::CurrentUser;
use crate::domain::entities::Link;
use crate::error::AppError;
use crate::state::AppState;

fn to_response(state: &AppState, link: Link) -> LinkResponse {
    let short_url = state.link_service.short_url(&link.short_code);
    LinkResponse::from_link(link, short_url)
}

/// Creates a short link owned by the caller.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "original_url": "example.com/docs",
///   "custom_alias": "docs",            // optional, 3-20 of [A-Za-z0-9-]
///   "title": "Documentation",          // optional
///   "expires_at": "2030-01-01T00:00:00Z" // optional
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request for an invalid URL or alias
/// - 409 Conflict if the alias is taken
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(current.id, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(&state, link))))
}

/// Lists the caller's links, newest first.
///
/// `GET /api/links?limit=10&offset=0`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListLinksResponse>, AppError> {
    let (limit, offset) = params.limit_offset();

    let links = state
        .link_service
        .list_links(current.id, limit, offset)
        .await?;

    let items: Vec<LinkResponse> = links
        .into_iter()
        .map(|link| to_response(&state, link))
        .collect();

    Ok(Json(ListLinksResponse {
        pagination: PageInfo {
            limit,
            offset,
            count: items.len(),
        },
        items,
    }))
}

/// Returns one of the caller's links.
///
/// `GET /api/links/{id}`
///
/// # Errors
///
/// - 404 Not Found if the link does not exist
/// - 403 Forbidden if it belongs to another user
pub async fn get_link_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link(current.id, id).await?;

    Ok(Json(to_response(&state, link)))
}

/// Updates one of the caller's links.
///
/// # Endpoint
///
/// `PUT /api/links/{id}`
///
/// # Request Body
///
/// All fields are optional. Only provided fields are changed.
///
/// ```json
/// {
///   "original_url": "https://new-destination.com",
///   "custom_alias": "new-alias",
///   "title": "",                            // empty clears the title
///   "is_active": false,
///   "expires_at": null                      // null clears the expiry
/// }
/// ```
pub async fn update_link_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .update_link(current.id, id, payload.into())
        .await?;

    Ok(Json(to_response(&state, link)))
}

/// Permanently deletes one of the caller's links.
///
/// `DELETE /api/links/{id}` → 204 No Content
pub async fn delete_link_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(current.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Aggregated counters over the caller's links.
///
/// `GET /api/links/stats`
pub async fn link_stats_handler(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.link_service.stats(current.id).await?;

    Ok(Json(stats.into()))
}

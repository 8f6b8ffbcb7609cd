//! Handlers for account endpoints.

use axum::{Extension, Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::auth::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::api::middleware::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Creates an account and returns a session token.
///
/// # Endpoint
///
/// `POST /api/auth/register`
///
/// # Request Body
///
/// ```json
/// { "username": "alice", "email": "alice@example.com", "password": "secret1" }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if validation fails
/// - 409 Conflict if the email or username is already taken
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    payload.validate()?;

    let session = state.auth_service.register(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// Exchanges credentials for a session token.
///
/// # Endpoint
///
/// `POST /api/auth/login`
///
/// # Errors
///
/// Returns 401 Unauthorized for an unknown email or wrong password.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let session = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(session.into()))
}

/// Returns the authenticated user's account.
///
/// `GET /api/auth/profile`
pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.auth_service.profile(current.id).await?;

    Ok(Json(user.into()))
}

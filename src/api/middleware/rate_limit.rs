//! Per-client sliding-window rate limiting.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::json;

use crate::domain::rate_limiter::Decision;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_identity;

/// Admits or rejects a request against the shared [`RateLimiter`].
///
/// Clients are identified by peer IP, or by `X-Forwarded-For` / `X-Real-IP`
/// when `state.behind_proxy` is set. Rejected requests receive
/// `429 Too Many Requests` and are not recorded in the window.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/api/links", post(create_link_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
///
/// [`RateLimiter`]: crate::domain::rate_limiter::RateLimiter
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = client_identity(req.headers(), req.extensions(), st.behind_proxy);

    if let Decision::Reject = st.rate_limiter.check(&identity) {
        metrics::counter!("rate_limit_rejected_total").increment(1);
        tracing::warn!(client = %identity, "Rate limit exceeded");

        return Err(AppError::too_many_requests(
            "Rate limit exceeded",
            json!({
                "limit": st.rate_limiter.limit(),
                "window_seconds": st.rate_limiter.window().as_secs(),
            }),
        ));
    }

    Ok(next.run(req).await)
}

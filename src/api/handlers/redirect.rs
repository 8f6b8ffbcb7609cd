//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /r/{short_code}`
///
/// # Request Flow
///
/// 1. Look up the link by code
/// 2. Reject inactive or expired links as not found
/// 3. Send click event to background worker
/// 4. Return 307 Temporary Redirect
///
/// # Click Tracking
///
/// Click events are sent to a bounded channel for async processing.
/// If the queue is full or closed, the click is dropped and counted in
/// `link_clicks_dropped_total`; the redirect still succeeds.
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown, inactive, or expired.
pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let link = state.link_service.resolve(&short_code).await?;

    if let Err(e) = state
        .click_sender
        .try_send(ClickEvent::new(link.id, &link.short_code))
    {
        let reason = match e {
            TrySendError::Full(_) => "queue full",
            TrySendError::Closed(_) => "queue closed",
        };
        metrics::counter!("link_clicks_dropped_total").increment(1);
        warn!(short_code = %link.short_code, reason, "Click event dropped");
    }

    Ok(Redirect::temporary(&link.original_url))
}

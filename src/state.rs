//! Shared application state injected into every handler.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{AuthService, LinkService};
use crate::domain::click_event::ClickEvent;
use crate::domain::rate_limiter::RateLimiter;
use crate::domain::repositories::{LinkRepository, UserRepository};

/// Services and channels shared across requests.
///
/// Cheap to clone: every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn LinkRepository>>,
    pub auth_service: Arc<AuthService<dyn UserRepository>>,
    pub rate_limiter: Arc<RateLimiter>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    /// Trust `X-Forwarded-For` / `X-Real-IP` when identifying clients.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService<dyn LinkRepository>>,
        auth_service: Arc<AuthService<dyn UserRepository>>,
        rate_limiter: Arc<RateLimiter>,
        click_sender: mpsc::Sender<ClickEvent>,
    ) -> Self {
        Self {
            link_service,
            auth_service,
            rate_limiter,
            click_sender,
            behind_proxy: false,
        }
    }

    pub fn with_behind_proxy(mut self, behind_proxy: bool) -> Self {
        self.behind_proxy = behind_proxy;
        self
    }
}

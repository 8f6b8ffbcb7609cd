#![allow(dead_code)]

use axum::Router;
use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use link_shortener::application::services::{AuthService, LinkService};
use link_shortener::domain::click_event::ClickEvent;
use link_shortener::domain::click_worker::run_click_worker;
use link_shortener::domain::rate_limiter::RateLimiter;
use link_shortener::domain::repositories::{LinkRepository, UserRepository};
use link_shortener::infrastructure::persistence::{MemoryLinkRepository, MemoryUserRepository};
use link_shortener::routes::router;
use link_shortener::state::AppState;

pub const BASE_URL: &str = "http://sho.rt";
pub const JWT_SECRET: &str = "test-signing-secret";

/// In-memory application wired the same way as the server.
pub struct TestApp {
    pub state: AppState,
    pub links: Arc<MemoryLinkRepository>,
    pub users: Arc<MemoryUserRepository>,
}

impl TestApp {
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).unwrap()
    }
}

/// Builds state over fresh memory repositories with a generous rate limit.
///
/// Returns the click receiver so tests decide whether a worker drains it.
pub fn create_test_state() -> (TestApp, mpsc::Receiver<ClickEvent>) {
    create_test_state_with_limit(10_000, Duration::from_secs(60))
}

pub fn create_test_state_with_limit(
    limit: usize,
    window: Duration,
) -> (TestApp, mpsc::Receiver<ClickEvent>) {
    let links = Arc::new(MemoryLinkRepository::new());
    let users = Arc::new(MemoryUserRepository::new());
    let (tx, rx) = mpsc::channel(100);

    let link_repository: Arc<dyn LinkRepository> = links.clone();
    let user_repository: Arc<dyn UserRepository> = users.clone();

    let link_service = Arc::new(LinkService::new(link_repository, BASE_URL));
    let auth_service = Arc::new(AuthService::new(user_repository, JWT_SECRET, 3600));
    let rate_limiter = Arc::new(RateLimiter::new(limit, window));

    let state = AppState::new(link_service, auth_service, rate_limiter, tx);

    (TestApp { state, links, users }, rx)
}

/// Same as [`create_test_state`] with a click worker draining the queue.
pub fn create_test_app_with_worker() -> TestApp {
    let (app, rx) = create_test_state();
    let repository: Arc<dyn LinkRepository> = app.links.clone();
    tokio::spawn(run_click_worker(rx, repository));
    app
}

/// Registers `username` and returns its bearer token.
pub async fn register(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "secret123"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["token"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Creates a link as the token's owner and returns the response body.
pub async fn create_link(server: &TestServer, token: &str, body: Value) -> Value {
    let response = server
        .post("/api/links")
        .authorization_bearer(token)
        .json(&body)
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

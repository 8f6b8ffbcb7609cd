mod common;

use axum::http::StatusCode;
use serde_json::Value;
use std::time::Duration;

#[tokio::test]
async fn test_requests_over_limit_are_rejected() {
    let (app, _rx) = common::create_test_state_with_limit(3, Duration::from_secs(60));
    let server = app.server();

    for _ in 0..3 {
        server.get("/r/missing").await.assert_status(StatusCode::NOT_FOUND);
    }

    let response = server.get("/r/missing").await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);

    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "rate_limit_exceeded");
    assert_eq!(json["error"]["details"]["limit"], 3);
    assert_eq!(json["error"]["details"]["window_seconds"], 60);
}

#[tokio::test]
async fn test_limit_applies_across_routes() {
    let (app, _rx) = common::create_test_state_with_limit(2, Duration::from_secs(60));
    let server = app.server();

    server.get("/health").await.assert_status_ok();
    server
        .get("/api/links")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/health")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_window_slides() {
    let (app, _rx) = common::create_test_state_with_limit(1, Duration::from_millis(100));
    let server = app.server();

    server.get("/health").await.assert_status_ok();
    server
        .get("/health")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    tokio::time::sleep(Duration::from_millis(150)).await;

    server.get("/health").await.assert_status_ok();
}

#[tokio::test]
async fn test_forwarded_clients_are_limited_separately() {
    let (app, _rx) = common::create_test_state_with_limit(1, Duration::from_secs(60));
    let state = app.state.clone().with_behind_proxy(true);
    let server = axum_test::TestServer::new(link_shortener::routes::router(state)).unwrap();

    server
        .get("/health")
        .add_header("x-forwarded-for", "203.0.113.1")
        .await
        .assert_status_ok();
    server
        .get("/health")
        .add_header("x-forwarded-for", "203.0.113.2, 10.0.0.1")
        .await
        .assert_status_ok();

    server
        .get("/health")
        .add_header("x-forwarded-for", "203.0.113.1")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

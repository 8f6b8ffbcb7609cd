mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_all_ok() {
    let (app, _rx) = common::create_test_state();
    let server = app.server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["click_queue"]["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_health_degraded_when_click_queue_closed() {
    let (app, rx) = common::create_test_state();
    drop(rx);
    let server = app.server();

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["click_queue"]["status"], "error");
}

#[tokio::test]
async fn test_trailing_slash_is_trimmed() {
    let (app, _rx) = common::create_test_state();
    let service = link_shortener::routes::app_router(app.state.clone());

    let response = service
        .oneshot(
            Request::builder()
                .uri("/health/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

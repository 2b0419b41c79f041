// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::create_test_app;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use briefdesk::presentation::routes;
use serde_json::Value;
use tower::util::ServiceExt;

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_version_endpoint() {
    let app = create_test_app().await;

    let body: Value = app.server.get("/api/version").await.json();

    assert_eq!(body["name"], "briefdesk");
    assert!(body["version"].as_str().is_some());
}

#[tokio::test]
async fn test_protected_routes_require_a_session() {
    let app = create_test_app().await;

    let missing = app.server.get("/api/tasks").await;
    assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);

    let bogus = app
        .server
        .get("/api/me")
        .add_header("Authorization", "Bearer not-a-real-token")
        .await;
    assert_eq!(bogus.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = bogus.json();
    assert!(body["error"].is_string());
}

/// 直接驱动路由，本地文件目录以 `/files` 对外提供
#[tokio::test]
async fn test_router_serves_health_and_missing_files() {
    let app = create_test_app().await;
    let router = routes::routes(app.state.clone());

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/files/tasks/missing.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

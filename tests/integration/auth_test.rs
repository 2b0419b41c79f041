// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, TestApp};
use axum::http::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_signup_creates_a_client_session() {
    let app = create_test_app().await;
    let (token, account_id) = app.signup("New.User@Example.com", "New User").await;

    let me: Value = app
        .server
        .get("/api/me")
        .add_header("Authorization", TestApp::bearer(&token))
        .await
        .json();

    assert_eq!(me["account"]["id"], account_id.to_string());
    assert_eq!(me["account"]["email"], "new.user@example.com");
    assert_eq!(me["role"], "client");
    // 尚未加入任何组织
    assert_eq!(me["organizationIds"], json!([]));
    assert!(me["primaryOrganizationId"].is_null());
    assert!(me["account"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app = create_test_app().await;
    app.signup("dup@example.com", "First").await;

    let response = app
        .server
        .post("/api/auth/signup")
        .json(&json!({
            "email": "DUP@example.com",
            "password": "another-password",
            "name": "Second",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_signup_validation_lists_fields() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/auth/signup")
        .json(&json!({
            "email": "not-an-email",
            "password": "short",
            "name": "X",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("email"));
    assert!(message.contains("password"));
}

#[tokio::test]
async fn test_login_and_logout() {
    let app = create_test_app().await;
    app.signup("login@example.com", "Login").await;

    let wrong = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "login@example.com", "password": "wrong-password" }))
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);

    let unknown = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": "wrong-password" }))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::UNAUTHORIZED);
    let wrong_body: Value = wrong.json();
    let unknown_body: Value = unknown.json();
    assert_eq!(wrong_body["error"], unknown_body["error"]);

    let login = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "LOGIN@example.com", "password": "correct-horse-battery" }))
        .await;
    assert_eq!(login.status_code(), StatusCode::OK);
    let token = login.json::<Value>()["token"].as_str().unwrap().to_string();

    let logout = app
        .server
        .post("/api/auth/logout")
        .add_header("Authorization", TestApp::bearer(&token))
        .await;
    assert_eq!(logout.status_code(), StatusCode::NO_CONTENT);

    let after = app
        .server
        .get("/api/me")
        .add_header("Authorization", TestApp::bearer(&token))
        .await;
    assert_eq!(after.status_code(), StatusCode::UNAUTHORIZED);
}

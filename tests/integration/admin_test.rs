// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, TestApp};
use axum::http::StatusCode;
use briefdesk::domain::models::account::Role;
use briefdesk::domain::repositories::account_repository::AccountRepository;
use briefdesk::infrastructure::repositories::account_repo_impl::AccountRepositoryImpl;
use serde_json::{json, Value};
use uuid::Uuid;

/// 注册账户并直接在数据库中提升为管理员
async fn create_admin(app: &TestApp) -> String {
    let (token, account_id) = app.signup("root@briefdesk.test", "Root").await;
    AccountRepositoryImpl::new(app.db.clone())
        .update_role(account_id, Role::MasterAdmin)
        .await
        .unwrap();
    token
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let app = create_test_app().await;
    let (token, _) = app.signup("plain@example.com", "Plain").await;

    let response = app
        .server
        .get("/api/admin/accounts")
        .add_header("Authorization", TestApp::bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let me: Value = app
        .server
        .get("/api/me")
        .add_header("Authorization", TestApp::bearer(&create_admin(&app).await))
        .await
        .json();
    assert_eq!(me["role"], "master_admin");
}

#[tokio::test]
async fn test_promotion_provisions_demo_organization() {
    let app = create_test_app().await;
    let admin = create_admin(&app).await;
    let (token, account_id) = app.signup("promoted@example.com", "Promoted Studio").await;

    let response = app
        .server
        .patch(&format!("/api/admin/accounts/{}/role", account_id))
        .add_header("Authorization", TestApp::bearer(&admin))
        .json(&json!({ "role": "service_provider" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["role"], "service_provider");

    let organizations: Value = app
        .server
        .get("/api/organization")
        .add_header("Authorization", TestApp::bearer(&token))
        .await
        .json();
    let organization = &organizations["organizations"][0];
    assert_eq!(organization["name"], "Promoted Studio");
    assert_eq!(organization["subscription"]["plan"], "demo");
    assert_eq!(organization["subscriptionActive"], true);

    // 重复提升不会再建第二个组织
    app.server
        .patch(&format!("/api/admin/accounts/{}/role", account_id))
        .add_header("Authorization", TestApp::bearer(&admin))
        .json(&json!({ "role": "service_provider" }))
        .await;
    let organizations: Value = app
        .server
        .get("/api/organization")
        .add_header("Authorization", TestApp::bearer(&token))
        .await
        .json();
    assert_eq!(organizations["organizations"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_purging_a_client_releases_its_seat() {
    let app = create_test_app().await;
    let admin = create_admin(&app).await;
    let agency = app.create_agency("seats@example.com", "Seats Studio").await;
    let client = app.create_client("leaving@example.com", &agency.invite_code).await;
    assert_eq!(app.subscription(&agency).await["clientCount"], 1);

    let response = app
        .server
        .delete(&format!("/api/admin/accounts/{}", client.account_id))
        .add_header("Authorization", TestApp::bearer(&admin))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(app.subscription(&agency).await["clientCount"], 0);

    let missing = app
        .server
        .delete(&format!("/api/admin/accounts/{}", Uuid::new_v4()))
        .add_header("Authorization", TestApp::bearer(&admin))
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

    let accounts: Value = app
        .server
        .get("/api/admin/accounts")
        .add_header("Authorization", TestApp::bearer(&admin))
        .await
        .json();
    let emails: Vec<&str> = accounts["accounts"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["email"].as_str())
        .collect();
    assert!(!emails.contains(&"leaving@example.com"));
}

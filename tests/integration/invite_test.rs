// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, subscription_deleted, TestApp};
use axum::http::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_public_preview_of_invite_code() {
    let app = create_test_app().await;
    let agency = app.create_agency("preview@example.com", "Preview Studio").await;

    let response = app
        .server
        .get(&format!("/api/invites/{}", agency.invite_code))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let preview: Value = response.json();
    assert_eq!(preview["organizationName"], "Preview Studio");
    assert_eq!(preview["acceptingClients"], true);
    assert!(preview["serviceId"].as_str().unwrap().starts_with("SVC-"));

    let unknown = app.server.get("/api/invites/NOPE1234").await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_redeem_twice_conflicts_and_keeps_one_link() {
    let app = create_test_app().await;
    let agency = app.create_agency("twice@example.com", "Twice Studio").await;
    let client = app.create_client("twice-client@example.com", &agency.invite_code).await;

    let again = app.redeem(&client.token, &agency.invite_code).await;
    assert_eq!(again.status_code(), StatusCode::CONFLICT);

    let roster: Value = app
        .server
        .get("/api/clients")
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await
        .json();
    let clients = roster["clients"].as_array().unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0]["id"], client.account_id.to_string());

    let subscription = app.subscription(&agency).await;
    assert_eq!(subscription["clientCount"], 1);
    assert_eq!(subscription["perClientAmountDue"], 500);
}

#[tokio::test]
async fn test_invalid_code_is_not_found() {
    let app = create_test_app().await;
    let (token, _) = app.signup("lost@example.com", "Lost").await;

    let response = app.redeem(&token, "does-not-exist").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inactive_subscription_blocks_redemption() {
    let app = create_test_app().await;
    let agency = app.create_agency("lapsed@example.com", "Lapsed Studio").await;

    let cancelled = app
        .deliver_webhook(&subscription_deleted(&agency.customer_ref))
        .await;
    assert_eq!(cancelled.status_code(), StatusCode::OK);

    let (token, _) = app.signup("late@example.com", "Late").await;
    let response = app.redeem(&token, &agency.invite_code).await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"], "subscription inactive");

    let preview: Value = app
        .server
        .get(&format!("/api/invites/{}", agency.invite_code))
        .await
        .json();
    assert_eq!(preview["acceptingClients"], false);

    let roster: Value = app
        .server
        .get("/api/clients")
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await
        .json();
    assert_eq!(roster["clients"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_agencies_cannot_redeem() {
    let app = create_test_app().await;
    let first = app.create_agency("host@example.com", "Host Studio").await;
    let second = app.create_agency("guest@example.com", "Guest Studio").await;

    let response = app.redeem(&second.token, &first.invite_code).await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_regenerated_code_replaces_old_one() {
    let app = create_test_app().await;
    let agency = app.create_agency("rotate@example.com", "Rotate Studio").await;

    let response = app
        .server
        .post("/api/organization/invite-code")
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let overview: Value = response.json();
    let new_code = overview["inviteCode"].as_str().unwrap().to_string();
    assert_ne!(new_code, agency.invite_code);
    assert!(overview["inviteLink"]
        .as_str()
        .unwrap()
        .ends_with(&format!("/join/{}", new_code)));

    let (token, _) = app.signup("rotating-client@example.com", "Rotating").await;
    let stale = app.redeem(&token, &agency.invite_code).await;
    assert_eq!(stale.status_code(), StatusCode::NOT_FOUND);
    let fresh = app.redeem(&token, &new_code).await;
    assert_eq!(fresh.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_unlink_never_drives_count_negative() {
    let app = create_test_app().await;
    let agency = app.create_agency("unlink@example.com", "Unlink Studio").await;
    let client = app.create_client("leaving@example.com", &agency.invite_code).await;
    assert_eq!(app.subscription(&agency).await["clientCount"], 1);

    let path = format!("/api/clients/{}", client.account_id);
    let removed = app
        .server
        .delete(&path)
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await;
    assert_eq!(removed.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(app.subscription(&agency).await["clientCount"], 0);

    let again = app
        .server
        .delete(&path)
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.subscription(&agency).await["clientCount"], 0);

    // 解除后客户的范围为空
    let tasks: Value = app
        .server
        .get("/api/tasks")
        .add_header("Authorization", TestApp::bearer(&client.token))
        .await
        .json();
    assert_eq!(tasks["tasks"].as_array().unwrap().len(), 0);
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{checkout_completed, create_test_app, TestApp};
use axum::body::Bytes;
use axum::http::StatusCode;
use briefdesk::utils::signature::signature_header;
use chrono::Utc;
use serde_json::{json, Value};

#[tokio::test]
async fn test_bad_signature_is_rejected_before_any_change() {
    let app = create_test_app().await;
    let (token, account_id) = app.signup("tamper@example.com", "Tamper").await;

    let payload =
        serde_json::to_vec(&checkout_completed(account_id, "annual", "Tampered", "cus_x")).unwrap();
    let forged = signature_header("wrong-secret", Utc::now().timestamp(), &payload);

    let response = app
        .server
        .post("/api/billing/webhook")
        .add_header("stripe-signature", forged)
        .bytes(Bytes::from(payload.clone()))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let unsigned = app
        .server
        .post("/api/billing/webhook")
        .bytes(Bytes::from(payload))
        .await;
    assert_eq!(unsigned.status_code(), StatusCode::BAD_REQUEST);

    let me: Value = app
        .server
        .get("/api/me")
        .add_header("Authorization", TestApp::bearer(&token))
        .await
        .json();
    assert_eq!(me["role"], "client");

    let organizations: Value = app
        .server
        .get("/api/organization")
        .add_header("Authorization", TestApp::bearer(&token))
        .await
        .json();
    assert_eq!(organizations, json!({ "organizations": [] }));
}

#[tokio::test]
async fn test_checkout_webhook_provisions_once() {
    let app = create_test_app().await;
    let (token, account_id) = app.signup("buyer@example.com", "Buyer").await;
    let event = checkout_completed(account_id, "quarterly", "Buyer Studio", "cus_buyer");

    let first = app.deliver_webhook(&event).await;
    assert_eq!(first.status_code(), StatusCode::OK);
    assert_eq!(first.json::<Value>(), json!({ "received": true, "handled": true }));
    let period_end = subscription(&app, &token).await["currentPeriodEnd"].clone();

    // 同一会话重复投递被确认但不再处理
    let replay = app.deliver_webhook(&event).await;
    assert_eq!(replay.status_code(), StatusCode::OK);
    assert_eq!(replay.json::<Value>(), json!({ "received": true, "handled": false }));
    assert_eq!(subscription(&app, &token).await["currentPeriodEnd"], period_end);

    let me: Value = app
        .server
        .get("/api/me")
        .add_header("Authorization", TestApp::bearer(&token))
        .await
        .json();
    assert_eq!(me["role"], "service_provider");
    assert_eq!(me["organizationIds"].as_array().unwrap().len(), 1);

    let organizations: Value = app
        .server
        .get("/api/organization")
        .add_header("Authorization", TestApp::bearer(&token))
        .await
        .json();
    let organization = &organizations["organizations"][0];
    assert_eq!(organization["name"], "Buyer Studio");
    assert_eq!(organization["subscriptionActive"], true);
    assert_eq!(organization["subscription"]["plan"], "quarterly");
}

/// 新的结账会话开启新周期
#[tokio::test]
async fn test_new_checkout_session_renews_subscription() {
    let app = create_test_app().await;
    let agency = app.create_agency("renew@example.com", "Renew Studio").await;
    assert_eq!(app.subscription(&agency).await["plan"], "monthly");

    let mut event = checkout_completed(
        agency.account_id,
        "annual",
        "Renew Studio",
        &agency.customer_ref,
    );
    event["data"]["object"]["id"] = json!("cs_renewal");
    let response = app.deliver_webhook(&event).await;
    assert_eq!(response.json::<Value>()["handled"], true);

    let renewed = app.subscription(&agency).await;
    assert_eq!(renewed["plan"], "annual");
    assert_eq!(renewed["status"], "active");
}

async fn subscription(app: &TestApp, token: &str) -> Value {
    let response = app
        .server
        .get("/api/billing/subscription")
        .add_header("Authorization", TestApp::bearer(token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json()
}

#[tokio::test]
async fn test_unknown_event_types_are_acknowledged() {
    let app = create_test_app().await;

    let response = app
        .deliver_webhook(&json!({ "type": "invoice.created", "data": { "object": {} } }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["handled"], false);
}

#[tokio::test]
async fn test_checkout_session_for_paid_plans() {
    let app = create_test_app().await;
    let (token, account_id) = app.signup("checkout@example.com", "Checkout").await;

    let response = app
        .server
        .post("/api/billing/checkout")
        .add_header("Authorization", TestApp::bearer(&token))
        .json(&json!({ "plan": "monthly", "organizationName": "Checkout Co" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["sessionId"], "cs_test_monthly");
    assert_eq!(
        body["checkoutUrl"],
        format!("https://checkout.test/{}", account_id)
    );

    let demo = app
        .server
        .post("/api/billing/checkout")
        .add_header("Authorization", TestApp::bearer(&token))
        .json(&json!({ "plan": "demo" }))
        .await;
    assert_eq!(demo.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_clients_have_no_subscription() {
    let app = create_test_app().await;
    let (token, _) = app.signup("nosub@example.com", "No Sub").await;

    let response = app
        .server
        .get("/api/billing/subscription")
        .add_header("Authorization", TestApp::bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

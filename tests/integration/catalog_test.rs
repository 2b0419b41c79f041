// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, TestApp};
use axum::http::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_only_agencies_manage_the_catalog() {
    let app = create_test_app().await;
    let agency = app.create_agency("catalog@example.com", "Catalog Studio").await;
    let client = app.create_client("catalog-client@example.com", &agency.invite_code).await;

    let created = app
        .server
        .post("/api/catalog/pricing-rules")
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .json(&json!({ "name": "Video work", "category": " Video ", "minPrice": 5000.0, "maxPrice": 8000.0 }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let rule: Value = created.json();
    assert_eq!(rule["category"], "video");
    assert_eq!(rule["isActive"], true);

    let by_client = app
        .server
        .post("/api/catalog/pricing-rules")
        .add_header("Authorization", TestApp::bearer(&client.token))
        .json(&json!({ "name": "Cheap", "category": "video", "minPrice": 1.0, "maxPrice": 2.0 }))
        .await;
    assert_eq!(by_client.status_code(), StatusCode::FORBIDDEN);

    let inverted = app
        .server
        .post("/api/catalog/pricing-rules")
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .json(&json!({ "name": "Broken", "category": "web", "minPrice": 900.0, "maxPrice": 100.0 }))
        .await;
    assert_eq!(inverted.status_code(), StatusCode::BAD_REQUEST);

    let listed: Value = app
        .server
        .get("/api/catalog/pricing-rules")
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await
        .json();
    assert_eq!(listed["pricingRules"].as_array().unwrap().len(), 1);
}

/// 询价时推断的报价被组织内同类别的规则约束
#[tokio::test]
async fn test_price_estimate_respects_pricing_rules() {
    let app = create_test_app().await;
    let agency = app.create_agency("rules@example.com", "Rules Studio").await;
    let client = app.create_client("rules-client@example.com", &agency.invite_code).await;

    let created = app
        .server
        .post("/api/catalog/pricing-rules")
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .json(&json!({ "name": "Video work", "category": "video", "minPrice": 5000.0, "maxPrice": 8000.0 }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);

    let task = app
        .create_task(&client.token, json!({ "title": "Promo" }))
        .await;
    let turn: Value = app
        .server
        .post(&format!("/api/tasks/{}/messages", task["id"].as_str().unwrap()))
        .add_header("Authorization", TestApp::bearer(&client.token))
        .json(&json!({ "content": "How much would a promo video cost?" }))
        .await
        .json();

    assert_eq!(turn["priceEstimate"]["amount"], 5000.0);
    assert_eq!(turn["task"]["estimatedPrice"], 5000.0);
    assert_eq!(turn["updatedFields"], json!(["estimatedPrice"]));
}

#[tokio::test]
async fn test_clients_see_active_services_only() {
    let app = create_test_app().await;
    let agency = app.create_agency("services@example.com", "Services Studio").await;
    let client = app.create_client("services-client@example.com", &agency.invite_code).await;

    for (name, active) in [("Branding", true), ("Retired", false)] {
        let response = app
            .server
            .post("/api/catalog/services")
            .add_header("Authorization", TestApp::bearer(&agency.token))
            .json(&json!({ "name": name, "keywords": ["logo"], "isActive": active }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let for_agency: Value = app
        .server
        .get("/api/catalog/services")
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await
        .json();
    assert_eq!(for_agency["services"].as_array().unwrap().len(), 2);

    let for_client: Value = app
        .server
        .get("/api/catalog/services")
        .add_header("Authorization", TestApp::bearer(&client.token))
        .await
        .json();
    let services = for_client["services"].as_array().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["name"], "Branding");
}

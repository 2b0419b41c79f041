// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app_with_llm, StubLlm, TestApp};
use axum::http::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_field_changes_queue_a_brief_for_the_worker() {
    let app = create_test_app_with_llm(StubLlm {
        extraction: r#"{"productDescription": "A 30 second launch video"}"#.to_string(),
        ..StubLlm::default()
    })
    .await;
    let agency = app.create_agency("worker@example.com", "Worker Studio").await;
    let client = app.create_client("worker-client@example.com", &agency.invite_code).await;
    let task = app
        .create_task(&client.token, json!({ "title": "Launch" }))
        .await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let turn = app
        .server
        .post(&format!("/api/tasks/{}/messages", task_id))
        .add_header("Authorization", TestApp::bearer(&client.token))
        .json(&json!({ "content": "We want a short launch video" }))
        .await;
    assert_eq!(turn.status_code(), StatusCode::CREATED);

    let jobs: Value = app
        .server
        .get("/api/jobs")
        .add_query_param("entityId", &task_id)
        .add_header("Authorization", TestApp::bearer(&client.token))
        .await
        .json();
    let jobs = jobs["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["kind"], "compile_brief");
    assert_eq!(jobs[0]["status"], "pending");

    let processed = app.job_worker().process_batch().await.unwrap();
    assert_eq!(processed, 1);
    assert_eq!(app.job_worker().process_batch().await.unwrap(), 0);

    let stored: Value = app
        .server
        .get(&format!("/api/tasks/{}", task_id))
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await
        .json();
    let brief = stored["brief"].as_str().unwrap();
    assert!(brief.contains("A 30 second launch video"));
    assert!(brief.contains("We want a short launch video"));
    assert!(stored["briefGeneratedAt"].is_string());

    let after: Value = app
        .server
        .get("/api/jobs")
        .add_query_param("entityId", &task_id)
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await
        .json();
    assert_eq!(after["jobs"][0]["status"], "succeeded");
}

#[tokio::test]
async fn test_enqueue_brief_is_deduplicated() {
    let app = create_test_app_with_llm(StubLlm::default()).await;
    let agency = app.create_agency("dedupe@example.com", "Dedupe Studio").await;
    let client = app.create_client("dedupe-client@example.com", &agency.invite_code).await;
    let task = app
        .create_task(&client.token, json!({ "title": "Flyer" }))
        .await;
    let path = format!("/api/tasks/{}/brief", task["id"].as_str().unwrap());

    let first = app
        .server
        .post(&path)
        .add_header("Authorization", TestApp::bearer(&client.token))
        .await;
    assert_eq!(first.status_code(), StatusCode::ACCEPTED);
    let second = app
        .server
        .post(&path)
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await;
    assert_eq!(second.status_code(), StatusCode::ACCEPTED);

    assert_eq!(first.json::<Value>()["id"], second.json::<Value>()["id"]);
}

#[tokio::test]
async fn test_product_analysis_runs_in_the_background() {
    let app = create_test_app_with_llm(StubLlm::default()).await;
    let agency = app.create_agency("products@example.com", "Product Studio").await;
    let client = app.create_client("products-client@example.com", &agency.invite_code).await;

    let response = app
        .server
        .post("/api/products")
        .add_header("Authorization", TestApp::bearer(&client.token))
        .json(&json!({ "name": "Rocket", "websiteUrl": "https://rocket.example.com" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["product"]["status"], "pending");
    assert_eq!(created["job"]["kind"], "analyze_product");
    let product_id = created["product"]["id"].as_str().unwrap().to_string();

    assert_eq!(app.job_worker().process_batch().await.unwrap(), 1);

    let product: Value = app
        .server
        .get(&format!("/api/products/{}", product_id))
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await
        .json();
    assert_eq!(product["status"], "completed");
    assert_eq!(product["category"], "saas");
    assert_eq!(product["guidelines"], "Friendly and direct.");
}

#[tokio::test]
async fn test_failed_analysis_is_recorded() {
    let app = create_test_app_with_llm(StubLlm {
        analysis: "not json".to_string(),
        ..StubLlm::default()
    })
    .await;
    let agency = app.create_agency("broken@example.com", "Broken Studio").await;

    let response = app
        .server
        .post("/api/products")
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .json(&json!({ "name": "Broken", "websiteUrl": "https://broken.example.com" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let product_id = response.json::<Value>()["product"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    app.job_worker().process_batch().await.unwrap();

    let product: Value = app
        .server
        .get(&format!("/api/products/{}", product_id))
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await
        .json();
    assert_eq!(product["status"], "failed");
    assert!(product["errorMessage"].is_string());
}

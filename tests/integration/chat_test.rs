// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, create_test_app_with_llm, StubLlm, TestApp};
use axum::http::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

/// 提取结果只填充空字段，已有的产品名称保持不变
#[tokio::test]
async fn test_extraction_never_overwrites_existing_fields() {
    let app = create_test_app_with_llm(StubLlm {
        reply: "**Great!** When do you need it?".to_string(),
        extraction: r#"```json
{"clientName": "Dana Park", "clientEmail": "DANA@EXAMPLE.COM", "productName": "Something Else"}
```"#
            .to_string(),
        ..StubLlm::default()
    })
    .await;
    let agency = app.create_agency("chat@example.com", "Chat Studio").await;
    let client = app.create_client("dana@example.com", &agency.invite_code).await;
    let task = app
        .create_task(
            &client.token,
            json!({ "title": "Launch video", "productName": "Glow Serum" }),
        )
        .await;
    let task_id = task["id"].as_str().unwrap();

    let response = app
        .server
        .post(&format!("/api/tasks/{}/messages", task_id))
        .add_header("Authorization", TestApp::bearer(&client.token))
        .json(&json!({ "content": "Hi, I'm Dana from Glow, email DANA@EXAMPLE.COM" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let turn: Value = response.json();
    assert_eq!(turn["assistantMessage"]["content"], "Great! When do you need it?");
    assert_eq!(turn["assistantMessage"]["role"], "assistant");
    assert_eq!(turn["updatedFields"], json!(["clientName", "clientEmail"]));
    assert_eq!(turn["task"]["productName"], "Glow Serum");
    assert_eq!(turn["task"]["clientName"], "Dana Park");
    assert_eq!(turn["task"]["clientEmail"], "dana@example.com");

    let messages: Value = app
        .server
        .get(&format!("/api/tasks/{}/messages", task_id))
        .add_header("Authorization", TestApp::bearer(&client.token))
        .await
        .json();
    let messages = messages["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
}

#[tokio::test]
async fn test_malformed_extraction_still_replies() {
    let app = create_test_app_with_llm(StubLlm {
        extraction: "I could not find anything".to_string(),
        ..StubLlm::default()
    })
    .await;
    let agency = app.create_agency("lenient@example.com", "Lenient Studio").await;
    let client = app.create_client("lenient-client@example.com", &agency.invite_code).await;
    let task = app
        .create_task(&client.token, json!({ "title": "Poster" }))
        .await;

    let response = app
        .server
        .post(&format!("/api/tasks/{}/messages", task["id"].as_str().unwrap()))
        .add_header("Authorization", TestApp::bearer(&client.token))
        .json(&json!({ "content": "We need a poster" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let turn: Value = response.json();
    assert_eq!(turn["updatedFields"], json!([]));
    assert!(turn["task"]["clientName"].is_null());
}

/// 模型回复期间服务商修改了任务，对话只填充仍为空的列
#[tokio::test]
async fn test_slow_turn_keeps_concurrent_provider_edits() {
    let app = create_test_app_with_llm(StubLlm {
        extraction: r#"{"clientName": "Dana Park", "productName": "Rocket"}"#.to_string(),
        delay: Duration::from_millis(300),
        ..StubLlm::default()
    })
    .await;
    let agency = app.create_agency("race@example.com", "Race Studio").await;
    let client = app.create_client("race-client@example.com", &agency.invite_code).await;
    let task = app
        .create_task(&client.token, json!({ "title": "Launch film" }))
        .await;
    let task_id = task["id"].as_str().unwrap();

    let turn = async {
        app.server
            .post(&format!("/api/tasks/{}/messages", task_id))
            .add_header("Authorization", TestApp::bearer(&client.token))
            .json(&json!({ "content": "I'm Dana, the product is Rocket" }))
            .await
    };
    let edit = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        app.server
            .patch(&format!("/api/tasks/{}", task_id))
            .add_header("Authorization", TestApp::bearer(&agency.token))
            .json(&json!({
                "status": "started",
                "finalPrice": 900.0,
                "productName": "Glow Serum",
            }))
            .await
    };
    let (turn, edit) = tokio::join!(turn, edit);
    assert_eq!(edit.status_code(), StatusCode::OK);
    assert_eq!(turn.status_code(), StatusCode::CREATED);

    let turn: Value = turn.json();
    assert_eq!(turn["updatedFields"], json!(["clientName"]));

    let stored: Value = app
        .server
        .get(&format!("/api/tasks/{}", task_id))
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await
        .json();
    assert_eq!(stored["status"], "started");
    assert_eq!(stored["finalPrice"], 900.0);
    assert_eq!(stored["productName"], "Glow Serum");
    assert_eq!(stored["clientName"], "Dana Park");
}

/// 回复失败时对话记录和任务都保持原样
#[tokio::test]
async fn test_failed_reply_leaves_transcript_unchanged() {
    let app = create_test_app_with_llm(StubLlm {
        extraction: r#"{"clientName": "Dana Park"}"#.to_string(),
        fail_replies: true,
        ..StubLlm::default()
    })
    .await;
    let agency = app.create_agency("flaky@example.com", "Flaky Studio").await;
    let client = app.create_client("flaky-client@example.com", &agency.invite_code).await;
    let task = app
        .create_task(&client.token, json!({ "title": "Brochure" }))
        .await;
    let task_id = task["id"].as_str().unwrap();

    let response = app
        .server
        .post(&format!("/api/tasks/{}/messages", task_id))
        .add_header("Authorization", TestApp::bearer(&client.token))
        .json(&json!({ "content": "Hello, I'm Dana" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let messages: Value = app
        .server
        .get(&format!("/api/tasks/{}/messages", task_id))
        .add_header("Authorization", TestApp::bearer(&client.token))
        .await
        .json();
    assert!(messages["messages"].as_array().unwrap().is_empty());

    let stored: Value = app
        .server
        .get(&format!("/api/tasks/{}", task_id))
        .add_header("Authorization", TestApp::bearer(&client.token))
        .await
        .json();
    assert!(stored["clientName"].is_null());
}

#[tokio::test]
async fn test_message_requires_content_or_images() {
    let app = create_test_app().await;
    let agency = app.create_agency("empty@example.com", "Empty Studio").await;
    let client = app.create_client("empty-client@example.com", &agency.invite_code).await;
    let task = app
        .create_task(&client.token, json!({ "title": "Banner" }))
        .await;
    let path = format!("/api/tasks/{}/messages", task["id"].as_str().unwrap());

    let blank = app
        .server
        .post(&path)
        .add_header("Authorization", TestApp::bearer(&client.token))
        .json(&json!({ "content": "   " }))
        .await;
    assert_eq!(blank.status_code(), StatusCode::BAD_REQUEST);

    let bad_image = app
        .server
        .post(&path)
        .add_header("Authorization", TestApp::bearer(&client.token))
        .json(&json!({ "content": "look", "imageUrls": ["ftp://files.example.com/a.png"] }))
        .await;
    assert_eq!(bad_image.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_asset_upload_is_listed_and_in_brief() {
    let app = create_test_app().await;
    let agency = app.create_agency("assets@example.com", "Asset Studio").await;
    let client = app.create_client("assets-client@example.com", &agency.invite_code).await;
    let task = app
        .create_task(&client.token, json!({ "title": "Packaging" }))
        .await;
    let task_id = task["id"].as_str().unwrap();

    let invalid = app
        .server
        .post(&format!("/api/tasks/{}/assets", task_id))
        .add_header("Authorization", TestApp::bearer(&client.token))
        .json(&json!({
            "fileName": "logo.png",
            "contentType": "image/png",
            "dataBase64": "***not base64***",
        }))
        .await;
    assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

    let uploaded = app
        .server
        .post(&format!("/api/tasks/{}/assets", task_id))
        .add_header("Authorization", TestApp::bearer(&client.token))
        .json(&json!({
            "fileName": "../../logo.png",
            "contentType": "image/png",
            "dataBase64": "aGVsbG8=",
        }))
        .await;
    assert_eq!(uploaded.status_code(), StatusCode::CREATED);
    let asset: Value = uploaded.json();
    assert_eq!(asset["fileName"], "logo.png");
    assert_eq!(asset["sizeBytes"], 5);
    assert!(asset["url"].as_str().unwrap().starts_with("memory://tasks/"));

    let assets: Value = app
        .server
        .get(&format!("/api/tasks/{}/assets", task_id))
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await
        .json();
    assert_eq!(assets["assets"].as_array().unwrap().len(), 1);

    let brief: Value = app
        .server
        .get(&format!("/api/tasks/{}/brief", task_id))
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await
        .json();
    let text = brief["brief"].as_str().unwrap();
    assert!(text.contains("PROJECT BRIEF"));
    assert!(text.contains("Packaging"));
    assert!(text.contains("logo.png"));
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, TestApp};
use axum::http::StatusCode;
use serde_json::{json, Value};

/// 同一组织内的两个客户互相看不到对方的任务，服务商能看到全部
#[tokio::test]
async fn test_clients_in_one_organization_are_isolated() {
    let app = create_test_app().await;
    let agency = app.create_agency("studio@example.com", "Studio").await;
    let alice = app.create_client("alice@example.com", &agency.invite_code).await;
    let bob = app.create_client("bob@example.com", &agency.invite_code).await;

    let task = app
        .create_task(&alice.token, json!({ "title": "Spring campaign" }))
        .await;
    let task_id = task["id"].as_str().unwrap();
    assert_eq!(task["ownerId"], alice.account_id.to_string());
    assert_eq!(task["organizationId"], agency.organization_id.to_string());
    assert_eq!(task["status"], "draft");

    let bob_list: Value = app
        .server
        .get("/api/tasks")
        .add_header("Authorization", TestApp::bearer(&bob.token))
        .await
        .json();
    assert_eq!(bob_list, json!({ "tasks": [] }));

    let bob_get = app
        .server
        .get(&format!("/api/tasks/{}", task_id))
        .add_header("Authorization", TestApp::bearer(&bob.token))
        .await;
    assert_eq!(bob_get.status_code(), StatusCode::NOT_FOUND);

    let bob_delete = app
        .server
        .delete(&format!("/api/tasks/{}", task_id))
        .add_header("Authorization", TestApp::bearer(&bob.token))
        .await;
    assert_eq!(bob_delete.status_code(), StatusCode::NOT_FOUND);

    let agency_list: Value = app
        .server
        .get("/api/tasks")
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .await
        .json();
    assert_eq!(agency_list["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(agency_list["tasks"][0]["id"], task_id);
}

#[tokio::test]
async fn test_unlinked_client_sees_empty_list() {
    let app = create_test_app().await;
    let (token, _) = app.signup("loner@example.com", "Loner").await;

    let response = app
        .server
        .get("/api/tasks")
        .add_header("Authorization", TestApp::bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "tasks": [] }));

    // 没有组织时不能创建任务
    let create = app
        .server
        .post("/api/tasks")
        .add_header("Authorization", TestApp::bearer(&token))
        .json(&json!({ "title": "Orphan" }))
        .await;
    assert_eq!(create.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_agencies_cannot_see_each_others_tasks() {
    let app = create_test_app().await;
    let first = app.create_agency("first@example.com", "First Studio").await;
    let second = app.create_agency("second@example.com", "Second Studio").await;
    let client = app.create_client("shared@example.com", &first.invite_code).await;

    let task = app
        .create_task(&client.token, json!({ "title": "Logo refresh" }))
        .await;
    let task_id = task["id"].as_str().unwrap();

    let other = app
        .server
        .get(&format!("/api/tasks/{}", task_id))
        .add_header("Authorization", TestApp::bearer(&second.token))
        .await;
    assert_eq!(other.status_code(), StatusCode::NOT_FOUND);

    let listed: Value = app
        .server
        .get("/api/tasks")
        .add_header("Authorization", TestApp::bearer(&second.token))
        .await
        .json();
    assert_eq!(listed, json!({ "tasks": [] }));

    let owner = app
        .server
        .get(&format!("/api/tasks/{}", task_id))
        .add_header("Authorization", TestApp::bearer(&first.token))
        .await;
    assert_eq!(owner.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_only_agencies_change_status() {
    let app = create_test_app().await;
    let agency = app.create_agency("status@example.com", "Status Studio").await;
    let client = app.create_client("status-client@example.com", &agency.invite_code).await;
    let task = app
        .create_task(&client.token, json!({ "title": "Website copy" }))
        .await;
    let path = format!("/api/tasks/{}", task["id"].as_str().unwrap());

    let by_client = app
        .server
        .patch(&path)
        .add_header("Authorization", TestApp::bearer(&client.token))
        .json(&json!({ "status": "started" }))
        .await;
    assert_eq!(by_client.status_code(), StatusCode::FORBIDDEN);

    // 旧拼写在边界处被接受
    let by_agency = app
        .server
        .patch(&path)
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .json(&json!({ "status": "in_progress", "finalPrice": 1200.0 }))
        .await;
    assert_eq!(by_agency.status_code(), StatusCode::OK);
    let updated: Value = by_agency.json();
    assert_eq!(updated["status"], "started");
    assert_eq!(updated["finalPrice"], 1200.0);
}

#[tokio::test]
async fn test_agency_creates_task_for_linked_client_only() {
    let app = create_test_app().await;
    let agency = app.create_agency("onbehalf@example.com", "Behalf Studio").await;
    let client = app.create_client("behalf-client@example.com", &agency.invite_code).await;
    let (_, stranger_id) = app.signup("stranger@example.com", "Stranger").await;

    let missing_client = app
        .server
        .post("/api/tasks")
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .json(&json!({ "title": "No client" }))
        .await;
    assert_eq!(missing_client.status_code(), StatusCode::BAD_REQUEST);

    let stranger = app
        .server
        .post("/api/tasks")
        .add_header("Authorization", TestApp::bearer(&agency.token))
        .json(&json!({ "title": "Stranger task", "clientId": stranger_id }))
        .await;
    assert_eq!(stranger.status_code(), StatusCode::BAD_REQUEST);

    let task = app
        .create_task(
            &agency.token,
            json!({ "title": "Brochure", "clientId": client.account_id }),
        )
        .await;
    assert_eq!(task["ownerId"], client.account_id.to_string());

    let client_view: Value = app
        .server
        .get("/api/tasks")
        .add_header("Authorization", TestApp::bearer(&client.token))
        .await
        .json();
    assert_eq!(client_view["tasks"].as_array().unwrap().len(), 1);
}

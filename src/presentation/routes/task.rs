// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::routing::get;
use axum::Router;

use crate::presentation::handlers::task_handler;

/// 任务、对话、附件和简报路由
///
/// # 返回值
///
/// 返回配置好的任务路由，需要在认证中间件之内挂载
pub fn task_routes() -> Router {
    Router::new()
        .route(
            "/api/tasks",
            get(task_handler::list_tasks).post(task_handler::create_task),
        )
        .route(
            "/api/tasks/{id}",
            get(task_handler::get_task)
                .patch(task_handler::update_task)
                .delete(task_handler::delete_task),
        )
        .route(
            "/api/tasks/{id}/messages",
            get(task_handler::list_messages).post(task_handler::send_message),
        )
        .route(
            "/api/tasks/{id}/assets",
            get(task_handler::list_assets).post(task_handler::upload_asset),
        )
        .route(
            "/api/tasks/{id}/brief",
            get(task_handler::get_brief).post(task_handler::enqueue_brief),
        )
}

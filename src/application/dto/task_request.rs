// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::models::message::Message;
use crate::domain::models::task::{Task, TaskStatus};
use crate::domain::services::pricing::PriceEstimate;

/// 创建任务请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequestDto {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub organization_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    #[validate(length(max = 200))]
    pub product_name: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    /// 自由文本或 ISO 日期，按截止时间规则解析
    pub deadline: Option<String>,
    #[validate(range(min = 0.0))]
    pub estimated_price: Option<f64>,
}

/// 修改任务请求DTO
///
/// `status` 接受旧拼写（`in_progress` 等）
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequestDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 200))]
    pub product_name: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(length(max = 200))]
    pub client_name: Option<String>,
    #[validate(email)]
    pub client_email: Option<String>,
    pub deadline: Option<String>,
    #[validate(range(min = 0.0))]
    pub estimated_price: Option<f64>,
    pub status: Option<TaskStatus>,
    #[validate(range(min = 0.0))]
    pub final_price: Option<f64>,
}

/// 任务列表查询参数
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct TaskListParams {
    pub status: Option<TaskStatus>,
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// 任务列表响应
#[derive(Debug, Serialize)]
pub struct TaskListResponseDto {
    pub tasks: Vec<Task>,
}

/// 对话请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequestDto {
    #[validate(length(max = 10000))]
    #[serde(default)]
    pub content: String,
    #[validate(length(max = 10))]
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// 一轮对话的响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnResponseDto {
    pub user_message: Message,
    pub assistant_message: Message,
    /// 本轮写入任务的字段
    pub updated_fields: Vec<&'static str>,
    pub price_estimate: Option<PriceEstimate>,
    pub task: Task,
}

/// 上传附件请求DTO，文件内容为 base64
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadAssetRequestDto {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(length(min = 1, max = 127))]
    pub content_type: String,
    #[validate(length(min = 1))]
    pub data_base64: String,
}

/// 简报响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefResponseDto {
    pub task_id: Uuid,
    pub brief: String,
    pub generated_at: DateTime<Utc>,
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use base64::Engine;
use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::task_request::{
    BriefResponseDto, ChatTurnResponseDto, CreateTaskRequestDto, SendMessageRequestDto,
    TaskListParams, TaskListResponseDto, UpdateTaskRequestDto, UploadAssetRequestDto,
};
use crate::domain::models::asset::Asset;
use crate::domain::models::job::Job;
use crate::domain::models::task::Task;
use crate::domain::repositories::task_repository::TaskListQuery;
use crate::domain::services::deadline::normalize_deadline;
use crate::domain::services::task_service::{NewTask, TaskPatch, Upload};
use crate::presentation::errors::{validation_failure, AppError};
use crate::presentation::extractors::caller::Caller;
use crate::presentation::state::AppState;
use crate::utils::errors::{ServiceError, ServiceResult};

/// 截止时间按服务器本地日期解析
fn parse_deadline(raw: Option<String>, today: NaiveDate) -> ServiceResult<Option<NaiveDateTime>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => normalize_deadline(text, today).map(Some).ok_or_else(|| {
            ServiceError::validation(format!("deadline: could not understand \"{}\"", text))
        }),
    }
}

/// 任务列表
///
/// 范围为空时返回 `{"tasks": []}`
pub async fn list_tasks(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Query(params): Query<TaskListParams>,
) -> Result<Json<TaskListResponseDto>, AppError> {
    params.validate().map_err(|e| validation_failure(&e))?;

    let defaults = TaskListQuery::default();
    let query = TaskListQuery {
        status: params.status,
        limit: params.limit.unwrap_or(defaults.limit),
        offset: params.offset.unwrap_or(defaults.offset),
    };

    let tasks = state.tasks.list(&caller, &query).await?;
    Ok(Json(TaskListResponseDto { tasks }))
}

/// 创建任务
pub async fn create_task(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Json(request): Json<CreateTaskRequestDto>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    request.validate().map_err(|e| validation_failure(&e))?;

    let deadline = parse_deadline(request.deadline, Local::now().date_naive())?;
    let task = state
        .tasks
        .create(
            &caller,
            NewTask {
                title: request.title,
                organization_id: request.organization_id,
                client_id: request.client_id,
                product_name: request.product_name,
                description: request.description,
                deadline,
                estimated_price: request.estimated_price,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(state.tasks.get(&caller, id).await?))
}

/// 修改任务
pub async fn update_task(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequestDto>,
) -> Result<Json<Task>, AppError> {
    request.validate().map_err(|e| validation_failure(&e))?;

    let deadline = parse_deadline(request.deadline, Local::now().date_naive())?;
    let task = state
        .tasks
        .update(
            &caller,
            id,
            TaskPatch {
                title: request.title,
                product_name: request.product_name,
                description: request.description,
                client_name: request.client_name,
                client_email: request.client_email,
                deadline,
                estimated_price: request.estimated_price,
                status: request.status,
                final_price: request.final_price,
            },
        )
        .await?;

    Ok(Json(task))
}

pub async fn delete_task(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.tasks.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 对话记录，按时间正序
pub async fn list_messages(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let messages = state.tasks.messages(&caller, id).await?;
    Ok(Json(json!({ "messages": messages })))
}

/// 发送一条消息并得到助手回复
pub async fn send_message(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequestDto>,
) -> Result<(StatusCode, Json<ChatTurnResponseDto>), AppError> {
    request.validate().map_err(|e| validation_failure(&e))?;

    let turn = state
        .send_message
        .execute(
            &caller,
            id,
            request.content,
            request.image_urls,
            Local::now().date_naive(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ChatTurnResponseDto {
            user_message: turn.user_message,
            assistant_message: turn.assistant_message,
            updated_fields: turn.updated_fields,
            price_estimate: turn.price_estimate,
            task: turn.task,
        }),
    ))
}

pub async fn list_assets(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let assets = state.tasks.assets(&caller, id).await?;
    Ok(Json(json!({ "assets": assets })))
}

/// 上传附件，内容为 base64
pub async fn upload_asset(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<UploadAssetRequestDto>,
) -> Result<(StatusCode, Json<Asset>), AppError> {
    request.validate().map_err(|e| validation_failure(&e))?;

    let data = base64::engine::general_purpose::STANDARD
        .decode(request.data_base64.trim())
        .map_err(|_| ServiceError::validation("dataBase64 is not valid base64"))?;

    let asset = state
        .tasks
        .upload_asset(
            &caller,
            id,
            Upload {
                file_name: request.file_name,
                content_type: request.content_type,
                data,
            },
            Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(asset)))
}

/// 立即编译简报
pub async fn get_brief(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<BriefResponseDto>, AppError> {
    let compiled = state
        .compile_brief
        .compile_for(&caller, id, Utc::now())
        .await?;
    Ok(Json(BriefResponseDto {
        task_id: compiled.task_id,
        brief: compiled.brief,
        generated_at: compiled.generated_at,
    }))
}

/// 排队后台编译
pub async fn enqueue_brief(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job = state.compile_brief.enqueue_for(&caller, id).await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

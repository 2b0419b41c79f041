// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::auth_request::{PageParams, UpdateRoleRequestDto};
use crate::domain::models::account::Account;
use crate::presentation::errors::{validation_failure, AppError};
use crate::presentation::extractors::caller::Caller;
use crate::presentation::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 100;

pub async fn list_accounts(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, AppError> {
    params.validate().map_err(|e| validation_failure(&e))?;
    let accounts = state
        .admin
        .list_accounts(
            &caller,
            params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            params.offset.unwrap_or(0),
        )
        .await?;
    Ok(Json(json!({ "accounts": accounts })))
}

/// 修改角色；提升为服务商时开通演示组织
pub async fn update_role(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequestDto>,
) -> Result<Json<Account>, AppError> {
    let account = state
        .admin
        .set_role(&caller, id, request.role, Utc::now())
        .await?;
    Ok(Json(account))
}

pub async fn purge_account(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.admin.purge(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

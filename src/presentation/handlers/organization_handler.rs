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

use crate::application::dto::organization_request::{OrganizationParams, RedeemInviteRequestDto};
use crate::domain::models::client_link::ClientProviderLink;
use crate::domain::services::invite_service::InvitePreview;
use crate::domain::services::organization_service::OrganizationOverview;
use crate::presentation::errors::{validation_failure, AppError};
use crate::presentation::extractors::caller::Caller;
use crate::presentation::state::AppState;

/// 调用方范围内的组织
pub async fn list_organizations(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
) -> Result<Json<Value>, AppError> {
    let organizations = state
        .organizations
        .list_for_caller(&caller, Utc::now())
        .await?;
    Ok(Json(json!({ "organizations": organizations })))
}

/// 重新生成邀请码
pub async fn regenerate_invite_code(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
) -> Result<Json<OrganizationOverview>, AppError> {
    let overview = state
        .organizations
        .regenerate_invite_code(&caller, Utc::now())
        .await?;
    Ok(Json(overview))
}

/// 公开的邀请码预览
pub async fn preview_invite(
    Extension(state): Extension<AppState>,
    Path(code): Path<String>,
) -> Result<Json<InvitePreview>, AppError> {
    Ok(Json(state.invites.preview(&code, Utc::now()).await?))
}

/// 兑换邀请码
pub async fn redeem_invite(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Json(request): Json<RedeemInviteRequestDto>,
) -> Result<(StatusCode, Json<ClientProviderLink>), AppError> {
    request.validate().map_err(|e| validation_failure(&e))?;

    let link = state
        .invites
        .redeem(&caller, &request.code, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// 客户名册
pub async fn list_clients(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
) -> Result<Json<Value>, AppError> {
    let clients = state.organizations.client_roster(&caller).await?;
    Ok(Json(json!({ "clients": clients })))
}

/// 解除客户关系
pub async fn remove_client(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(client_id): Path<Uuid>,
    Query(params): Query<OrganizationParams>,
) -> Result<StatusCode, AppError> {
    state
        .invites
        .unlink(&caller, client_id, params.organization_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

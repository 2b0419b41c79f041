// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::models::account::{Account, Role};

/// 注册请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequestDto {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 200))]
    pub company_name: Option<String>,
}

/// 登录请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestDto {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// 登录成功的响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponseDto {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub account: Account,
}

/// 当前调用方
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponseDto {
    pub account: Account,
    pub role: Role,
    /// `null` 表示不受限
    pub organization_ids: Option<Vec<Uuid>>,
    pub primary_organization_id: Option<Uuid>,
}

/// 修改角色请求DTO
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateRoleRequestDto {
    pub role: Role,
}

/// 分页参数
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct PageParams {
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

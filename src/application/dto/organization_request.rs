// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::models::organization::PlanTier;

/// 兑换邀请码请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct RedeemInviteRequestDto {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
}

/// 可选的组织参数，管理员跨组织操作时使用
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationParams {
    pub organization_id: Option<Uuid>,
}

/// 结账请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequestDto {
    pub plan: PlanTier,
    #[validate(length(max = 200))]
    pub organization_name: Option<String>,
}

/// 结账响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponseDto {
    pub checkout_url: String,
    pub session_id: String,
}

/// 价格规则请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PricingRuleRequestDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(range(min = 0.0))]
    pub min_price: f64,
    #[validate(range(min = 0.0))]
    pub max_price: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// 服务项请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOfferingRequestDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// 创建产品请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequestDto {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(url)]
    pub website_url: Option<String>,
    pub organization_id: Option<Uuid>,
}

/// 后台任务查询参数
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListParams {
    pub entity_id: Uuid,
}

fn default_active() -> bool {
    true
}

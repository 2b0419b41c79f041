// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::organization_request::{
    OrganizationParams, PricingRuleRequestDto, ServiceOfferingRequestDto,
};
use crate::domain::models::catalog::{PricingRule, ServiceOffering};
use crate::domain::services::catalog_service::{PricingRuleInput, ServiceOfferingInput};
use crate::presentation::errors::{validation_failure, AppError};
use crate::presentation::extractors::caller::Caller;
use crate::presentation::state::AppState;

impl From<PricingRuleRequestDto> for PricingRuleInput {
    fn from(dto: PricingRuleRequestDto) -> Self {
        Self {
            name: dto.name,
            category: dto.category,
            min_price: dto.min_price,
            max_price: dto.max_price,
            is_active: dto.is_active,
        }
    }
}

impl From<ServiceOfferingRequestDto> for ServiceOfferingInput {
    fn from(dto: ServiceOfferingRequestDto) -> Self {
        Self {
            name: dto.name,
            description: dto.description,
            keywords: dto.keywords,
            is_active: dto.is_active,
        }
    }
}

pub async fn list_pricing_rules(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Query(params): Query<OrganizationParams>,
) -> Result<Json<Value>, AppError> {
    let rules = state
        .catalog
        .list_pricing_rules(&caller, params.organization_id)
        .await?;
    Ok(Json(json!({ "pricingRules": rules })))
}

pub async fn create_pricing_rule(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Query(params): Query<OrganizationParams>,
    Json(request): Json<PricingRuleRequestDto>,
) -> Result<(StatusCode, Json<PricingRule>), AppError> {
    request.validate().map_err(|e| validation_failure(&e))?;
    let rule = state
        .catalog
        .create_pricing_rule(&caller, params.organization_id, request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn update_pricing_rule(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<PricingRuleRequestDto>,
) -> Result<Json<PricingRule>, AppError> {
    request.validate().map_err(|e| validation_failure(&e))?;
    let rule = state
        .catalog
        .update_pricing_rule(&caller, id, request.into())
        .await?;
    Ok(Json(rule))
}

pub async fn delete_pricing_rule(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_pricing_rule(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 服务项列表，客户只看到启用的服务项
pub async fn list_services(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Query(params): Query<OrganizationParams>,
) -> Result<Json<Value>, AppError> {
    let services = state
        .catalog
        .list_services(&caller, params.organization_id)
        .await?;
    Ok(Json(json!({ "services": services })))
}

pub async fn create_service(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Query(params): Query<OrganizationParams>,
    Json(request): Json<ServiceOfferingRequestDto>,
) -> Result<(StatusCode, Json<ServiceOffering>), AppError> {
    request.validate().map_err(|e| validation_failure(&e))?;
    let service = state
        .catalog
        .create_service(&caller, params.organization_id, request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn update_service(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<ServiceOfferingRequestDto>,
) -> Result<Json<ServiceOffering>, AppError> {
    request.validate().map_err(|e| validation_failure(&e))?;
    let service = state
        .catalog
        .update_service(&caller, id, request.into())
        .await?;
    Ok(Json(service))
}

pub async fn delete_service(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_service(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

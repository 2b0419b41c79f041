// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::organization_request::CreateProductRequestDto;
use crate::domain::models::product::Product;
use crate::domain::services::product_service::NewProduct;
use crate::presentation::errors::{validation_failure, AppError};
use crate::presentation::extractors::caller::Caller;
use crate::presentation::state::AppState;

pub async fn list_products(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
) -> Result<Json<Value>, AppError> {
    let products = state.products.list(&caller).await?;
    Ok(Json(json!({ "products": products })))
}

/// 创建产品
///
/// 带网址的产品会排队分析，响应中附带分析任务以便轮询
pub async fn create_product(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Json(request): Json<CreateProductRequestDto>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    request.validate().map_err(|e| validation_failure(&e))?;

    let (product, job) = state
        .products
        .create(
            &caller,
            NewProduct {
                name: request.name,
                website_url: request.website_url,
                organization_id: request.organization_id,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "product": product, "job": job })),
    ))
}

pub async fn get_product(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.products.get(&caller, id).await?))
}

pub async fn delete_product(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.products.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

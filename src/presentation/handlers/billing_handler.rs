// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    body::Bytes,
    extract::Extension,
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use validator::Validate;

use crate::application::dto::organization_request::{CheckoutRequestDto, CheckoutResponseDto};
use crate::domain::services::billing_service::{SubscriptionSummary, WebhookOutcome};
use crate::presentation::errors::{validation_failure, AppError};
use crate::presentation::extractors::caller::Caller;
use crate::presentation::state::AppState;

/// 支付处理方的签名头
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// 创建托管结账会话
pub async fn checkout(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Json(request): Json<CheckoutRequestDto>,
) -> Result<Json<CheckoutResponseDto>, AppError> {
    request.validate().map_err(|e| validation_failure(&e))?;

    let session = state
        .billing
        .start_checkout(&caller, request.plan, request.organization_name.as_deref())
        .await?;

    Ok(Json(CheckoutResponseDto {
        checkout_url: session.url,
        session_id: session.id,
    }))
}

/// 当前订阅
pub async fn subscription(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
) -> Result<Json<SubscriptionSummary>, AppError> {
    Ok(Json(
        state
            .billing
            .subscription_summary(&caller, Utc::now())
            .await?,
    ))
}

/// 支付 Webhook
///
/// 使用原始请求体校验签名，校验失败返回 400 且不做任何修改
pub async fn webhook(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let outcome = state
        .billing
        .handle_webhook(&body, signature, Utc::now())
        .await?;

    let handled = !matches!(outcome, WebhookOutcome::Ignored | WebhookOutcome::Duplicate);
    Ok(Json(json!({ "received": true, "handled": handled })))
}

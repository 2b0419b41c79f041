// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::organization::PlanTier;

/// 创建托管结账页面所需的信息
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub account_id: Uuid,
    pub customer_email: String,
    pub plan: PlanTier,
    pub organization_name: String,
    pub amount_cents: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// 支付处理方返回的结账会话
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// 支付处理方特质
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession>;
}

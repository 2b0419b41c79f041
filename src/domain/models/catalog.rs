// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 服务商维护的价格区间
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRule {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    /// 与估价类别对应，如 `video`、`design`
    pub category: String,
    pub min_price: f64,
    pub max_price: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl PricingRule {
    /// 将价格限制在区间内
    pub fn clamp(&self, price: f64) -> f64 {
        price.max(self.min_price).min(self.max_price)
    }
}

/// 服务商提供的服务项
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

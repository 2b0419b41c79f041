// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ParseEnumError;

/// 产品分析进度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Pending,
    Analyzing,
    Completed,
    Failed,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Pending => "pending",
            ProductStatus::Analyzing => "analyzing",
            ProductStatus::Completed => "completed",
            ProductStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProductStatus::Pending),
            "analyzing" => Ok(ProductStatus::Analyzing),
            "completed" => Ok(ProductStatus::Completed),
            "failed" => Ok(ProductStatus::Failed),
            other => Err(ParseEnumError::new("product status", other)),
        }
    }
}

/// 客户要推广的产品，独立于任务
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub name: String,
    pub website_url: Option<String>,
    /// 分析推断出的类别
    pub category: Option<String>,
    /// 分析生成的长篇品牌指南
    pub guidelines: Option<String>,
    pub status: ProductStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        owner_id: Uuid,
        organization_id: Uuid,
        name: String,
        website_url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            organization_id: Some(organization_id),
            name,
            website_url,
            category: None,
            guidelines: None,
            status: ProductStatus::Pending,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}

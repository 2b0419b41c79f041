// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::models::product::{Product, ProductStatus};
use crate::domain::services::tenancy::TenancyFilter;

/// 产品仓库特质
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: &Product) -> Result<Product, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError>;
    async fn list(&self, filter: &TenancyFilter) -> Result<Vec<Product>, RepositoryError>;
    /// 更新分析状态，`error_message` 仅在失败时有值
    async fn update_status(
        &self,
        id: Uuid,
        status: ProductStatus,
        error_message: Option<String>,
    ) -> Result<(), RepositoryError>;
    /// 写入分析结果并标记完成
    async fn complete_analysis(
        &self,
        id: Uuid,
        category: &str,
        guidelines: &str,
    ) -> Result<Product, RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

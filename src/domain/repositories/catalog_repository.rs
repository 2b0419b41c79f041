// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::models::catalog::{PricingRule, ServiceOffering};

/// 目录仓库特质
///
/// 价格规则和服务项都是组织内的参考数据
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_pricing_rule(&self, rule: &PricingRule)
        -> Result<PricingRule, RepositoryError>;
    async fn find_pricing_rule(&self, id: Uuid) -> Result<Option<PricingRule>, RepositoryError>;
    async fn list_pricing_rules(
        &self,
        organization_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<PricingRule>, RepositoryError>;
    async fn update_pricing_rule(&self, rule: &PricingRule)
        -> Result<PricingRule, RepositoryError>;
    async fn delete_pricing_rule(&self, id: Uuid) -> Result<(), RepositoryError>;

    async fn create_service(
        &self,
        service: &ServiceOffering,
    ) -> Result<ServiceOffering, RepositoryError>;
    async fn find_service(&self, id: Uuid) -> Result<Option<ServiceOffering>, RepositoryError>;
    async fn list_services(
        &self,
        organization_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<ServiceOffering>, RepositoryError>;
    async fn update_service(
        &self,
        service: &ServiceOffering,
    ) -> Result<ServiceOffering, RepositoryError>;
    async fn delete_service(&self, id: Uuid) -> Result<(), RepositoryError>;
}

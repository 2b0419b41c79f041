// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{json_strings, strings_json};
use crate::domain::models::catalog::{PricingRule, ServiceOffering};
use crate::domain::repositories::catalog_repository::CatalogRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{
    pricing_rule as rule_entity, service_offering as service_entity,
};

/// 目录仓库实现
#[derive(Clone)]
pub struct CatalogRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl CatalogRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<rule_entity::Model> for PricingRule {
    fn from(model: rule_entity::Model) -> Self {
        Self {
            id: model.id,
            organization_id: model.organization_id,
            name: model.name,
            category: model.category,
            min_price: model.min_price,
            max_price: model.max_price,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

impl From<&PricingRule> for rule_entity::ActiveModel {
    fn from(rule: &PricingRule) -> Self {
        Self {
            id: Set(rule.id),
            organization_id: Set(rule.organization_id),
            name: Set(rule.name.clone()),
            category: Set(rule.category.clone()),
            min_price: Set(rule.min_price),
            max_price: Set(rule.max_price),
            is_active: Set(rule.is_active),
            created_at: Set(rule.created_at),
        }
    }
}

impl From<service_entity::Model> for ServiceOffering {
    fn from(model: service_entity::Model) -> Self {
        Self {
            id: model.id,
            organization_id: model.organization_id,
            name: model.name,
            description: model.description,
            keywords: json_strings(&model.keywords),
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

impl From<&ServiceOffering> for service_entity::ActiveModel {
    fn from(service: &ServiceOffering) -> Self {
        Self {
            id: Set(service.id),
            organization_id: Set(service.organization_id),
            name: Set(service.name.clone()),
            description: Set(service.description.clone()),
            keywords: Set(strings_json(&service.keywords)),
            is_active: Set(service.is_active),
            created_at: Set(service.created_at),
        }
    }
}

#[async_trait]
impl CatalogRepository for CatalogRepositoryImpl {
    async fn create_pricing_rule(
        &self,
        rule: &PricingRule,
    ) -> Result<PricingRule, RepositoryError> {
        let model: rule_entity::ActiveModel = rule.into();
        Ok(model.insert(self.db.as_ref()).await?.into())
    }

    async fn find_pricing_rule(&self, id: Uuid) -> Result<Option<PricingRule>, RepositoryError> {
        let model = rule_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list_pricing_rules(
        &self,
        organization_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<PricingRule>, RepositoryError> {
        let mut query = rule_entity::Entity::find()
            .filter(rule_entity::Column::OrganizationId.eq(organization_id));
        if active_only {
            query = query.filter(rule_entity::Column::IsActive.eq(true));
        }
        let models = query
            .order_by_asc(rule_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update_pricing_rule(
        &self,
        rule: &PricingRule,
    ) -> Result<PricingRule, RepositoryError> {
        let model: rule_entity::ActiveModel = rule.into();
        Ok(model.update(self.db.as_ref()).await?.into())
    }

    async fn delete_pricing_rule(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = rule_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn create_service(
        &self,
        service: &ServiceOffering,
    ) -> Result<ServiceOffering, RepositoryError> {
        let model: service_entity::ActiveModel = service.into();
        Ok(model.insert(self.db.as_ref()).await?.into())
    }

    async fn find_service(&self, id: Uuid) -> Result<Option<ServiceOffering>, RepositoryError> {
        let model = service_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list_services(
        &self,
        organization_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<ServiceOffering>, RepositoryError> {
        let mut query = service_entity::Entity::find()
            .filter(service_entity::Column::OrganizationId.eq(organization_id));
        if active_only {
            query = query.filter(service_entity::Column::IsActive.eq(true));
        }
        let models = query
            .order_by_asc(service_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update_service(
        &self,
        service: &ServiceOffering,
    ) -> Result<ServiceOffering, RepositoryError> {
        let model: service_entity::ActiveModel = service.into();
        Ok(model.update(self.db.as_ref()).await?.into())
    }

    async fn delete_service(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = service_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

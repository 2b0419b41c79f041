// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{parse_column, tenancy_condition};
use crate::domain::models::product::{Product, ProductStatus};
use crate::domain::repositories::product_repository::ProductRepository;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::tenancy::TenancyFilter;
use crate::infrastructure::database::entities::{job as job_entity, product as product_entity};

/// 产品仓库实现
#[derive(Clone)]
pub struct ProductRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ProductRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<product_entity::Model> for Product {
    type Error = RepositoryError;

    fn try_from(model: product_entity::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            organization_id: model.organization_id,
            name: model.name,
            website_url: model.website_url,
            category: model.category,
            guidelines: model.guidelines,
            status: parse_column(&model.status)?,
            error_message: model.error_message,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[async_trait]
impl ProductRepository for ProductRepositoryImpl {
    async fn create(&self, product: &Product) -> Result<Product, RepositoryError> {
        let model = product_entity::ActiveModel {
            id: Set(product.id),
            owner_id: Set(product.owner_id),
            organization_id: Set(product.organization_id),
            name: Set(product.name.clone()),
            website_url: Set(product.website_url.clone()),
            category: Set(product.category.clone()),
            guidelines: Set(product.guidelines.clone()),
            status: Set(product.status.to_string()),
            error_message: Set(product.error_message.clone()),
            created_at: Set(product.created_at),
            updated_at: Set(product.updated_at),
        };
        model.insert(self.db.as_ref()).await?.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        product_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(Product::try_from)
            .transpose()
    }

    async fn list(&self, filter: &TenancyFilter) -> Result<Vec<Product>, RepositoryError> {
        let Some(condition) = tenancy_condition(
            filter,
            product_entity::Column::OwnerId,
            product_entity::Column::OrganizationId,
        ) else {
            return Ok(Vec::new());
        };

        product_entity::Entity::find()
            .filter(condition)
            .order_by_desc(product_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ProductStatus,
        error_message: Option<String>,
    ) -> Result<(), RepositoryError> {
        let result = product_entity::Entity::update_many()
            .col_expr(product_entity::Column::Status, Expr::value(status.to_string()))
            .col_expr(product_entity::Column::ErrorMessage, Expr::value(error_message))
            .col_expr(product_entity::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn complete_analysis(
        &self,
        id: Uuid,
        category: &str,
        guidelines: &str,
    ) -> Result<Product, RepositoryError> {
        let model = product_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let mut active: product_entity::ActiveModel = model.into();
        active.category = Set(Some(category.to_string()));
        active.guidelines = Set(Some(guidelines.to_string()));
        active.status = Set(ProductStatus::Completed.to_string());
        active.error_message = Set(None);
        active.updated_at = Set(Utc::now());

        active.update(self.db.as_ref()).await?.try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        job_entity::Entity::delete_many()
            .filter(job_entity::Column::EntityId.eq(id))
            .exec(&txn)
            .await?;
        let result = product_entity::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        txn.commit().await?;
        Ok(())
    }
}

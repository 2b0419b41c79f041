// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::models::client_link::ClientProviderLink;
use crate::domain::models::organization::Subscription;
use crate::domain::repositories::client_link_repository::{ClientLinkRepository, RedeemOutcome};
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{
    client_link as link_entity, subscription as subscription_entity,
};

/// 客户关系仓库实现
///
/// 关系的增删与订阅的 `client_count` 在同一事务中变更
#[derive(Clone)]
pub struct ClientLinkRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ClientLinkRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<link_entity::Model> for ClientProviderLink {
    fn from(model: link_entity::Model) -> Self {
        Self {
            id: model.id,
            client_id: model.client_id,
            organization_id: model.organization_id,
            joined_at: model.joined_at,
        }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl ClientLinkRepository for ClientLinkRepositoryImpl {
    async fn redeem(
        &self,
        client_id: Uuid,
        organization_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RedeemOutcome, RepositoryError> {
        let txn = self.db.begin().await?;

        let subscription = subscription_entity::Entity::find()
            .filter(subscription_entity::Column::OrganizationId.eq(organization_id))
            .one(&txn)
            .await?
            .map(Subscription::try_from)
            .transpose()?;
        if !subscription.is_some_and(|s| s.is_active_at(now)) {
            txn.rollback().await?;
            return Ok(RedeemOutcome::SubscriptionInactive);
        }

        let link = ClientProviderLink::new(client_id, organization_id, now);
        let model = link_entity::ActiveModel {
            id: Set(link.id),
            client_id: Set(link.client_id),
            organization_id: Set(link.organization_id),
            joined_at: Set(link.joined_at),
        };
        match model.insert(&txn).await {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                txn.rollback().await?;
                return Ok(RedeemOutcome::AlreadyLinked);
            }
            Err(e) => {
                txn.rollback().await?;
                return Err(e.into());
            }
        }

        subscription_entity::Entity::update_many()
            .col_expr(
                subscription_entity::Column::ClientCount,
                Expr::col(subscription_entity::Column::ClientCount).add(1),
            )
            .col_expr(subscription_entity::Column::UpdatedAt, Expr::value(now))
            .filter(subscription_entity::Column::OrganizationId.eq(organization_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        debug!(%client_id, %organization_id, "client linked");
        Ok(RedeemOutcome::Linked(link))
    }

    async fn remove(
        &self,
        client_id: Uuid,
        organization_id: Uuid,
    ) -> Result<bool, RepositoryError> {
        let txn = self.db.begin().await?;

        let deleted = link_entity::Entity::delete_many()
            .filter(link_entity::Column::ClientId.eq(client_id))
            .filter(link_entity::Column::OrganizationId.eq(organization_id))
            .exec(&txn)
            .await?;
        if deleted.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(false);
        }

        subscription_entity::Entity::update_many()
            .col_expr(
                subscription_entity::Column::ClientCount,
                Expr::col(subscription_entity::Column::ClientCount).sub(1),
            )
            .col_expr(subscription_entity::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(subscription_entity::Column::OrganizationId.eq(organization_id))
            .filter(subscription_entity::Column::ClientCount.gt(0))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        debug!(%client_id, %organization_id, "client unlinked");
        Ok(true)
    }

    async fn exists(&self, client_id: Uuid, organization_id: Uuid) -> Result<bool, RepositoryError> {
        let count = link_entity::Entity::find()
            .filter(link_entity::Column::ClientId.eq(client_id))
            .filter(link_entity::Column::OrganizationId.eq(organization_id))
            .count(self.db.as_ref())
            .await?;
        Ok(count > 0)
    }

    async fn list_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<ClientProviderLink>, RepositoryError> {
        let models = link_entity::Entity::find()
            .filter(link_entity::Column::ClientId.eq(client_id))
            .order_by_asc(link_entity::Column::JoinedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_for_organization(
        &self,
        organization_id: Option<Uuid>,
    ) -> Result<Vec<ClientProviderLink>, RepositoryError> {
        let mut query = link_entity::Entity::find();
        if let Some(org) = organization_id {
            query = query.filter(link_entity::Column::OrganizationId.eq(org));
        }
        let models = query
            .order_by_asc(link_entity::Column::JoinedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}

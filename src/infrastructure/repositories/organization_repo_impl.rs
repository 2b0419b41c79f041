// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::{conflict_on_unique, parse_column};
use crate::domain::models::organization::{
    Organization, PlanTier, Subscription, SubscriptionStatus,
};
use crate::domain::repositories::organization_repository::{
    OrganizationRepository, OrganizationWithSubscription,
};
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{
    billing_event as billing_event_entity, organization as organization_entity,
    subscription as subscription_entity,
};

/// 组织与订阅仓库实现
#[derive(Clone)]
pub struct OrganizationRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl OrganizationRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<organization_entity::Model> for Organization {
    fn from(model: organization_entity::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            slug: model.slug,
            service_id: model.service_id,
            invite_code: model.invite_code,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Organization> for organization_entity::ActiveModel {
    fn from(org: &Organization) -> Self {
        Self {
            id: Set(org.id),
            owner_id: Set(org.owner_id),
            name: Set(org.name.clone()),
            slug: Set(org.slug.clone()),
            service_id: Set(org.service_id.clone()),
            invite_code: Set(org.invite_code.clone()),
            created_at: Set(org.created_at),
            updated_at: Set(org.updated_at),
        }
    }
}

impl TryFrom<subscription_entity::Model> for Subscription {
    type Error = RepositoryError;

    fn try_from(model: subscription_entity::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            organization_id: model.organization_id,
            plan: parse_column(&model.plan)?,
            status: parse_column(&model.status)?,
            current_period_start: model.current_period_start,
            current_period_end: model.current_period_end,
            client_count: model.client_count.max(0),
            customer_ref: model.customer_ref,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Subscription> for subscription_entity::ActiveModel {
    fn from(sub: &Subscription) -> Self {
        Self {
            id: Set(sub.id),
            organization_id: Set(sub.organization_id),
            plan: Set(sub.plan.to_string()),
            status: Set(sub.status.to_string()),
            current_period_start: Set(sub.current_period_start),
            current_period_end: Set(sub.current_period_end),
            client_count: Set(sub.client_count.max(0)),
            customer_ref: Set(sub.customer_ref.clone()),
            created_at: Set(sub.created_at),
            updated_at: Set(sub.updated_at),
        }
    }
}

#[async_trait]
impl OrganizationRepository for OrganizationRepositoryImpl {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, RepositoryError> {
        let model = organization_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<Organization>, RepositoryError> {
        let model = organization_entity::Entity::find()
            .filter(organization_entity::Column::OwnerId.eq(owner_id))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_invite_code(
        &self,
        code: &str,
    ) -> Result<Option<Organization>, RepositoryError> {
        let model = organization_entity::Entity::find()
            .filter(organization_entity::Column::InviteCode.eq(code.trim()))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_subscription(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<Subscription>, RepositoryError> {
        subscription_entity::Entity::find()
            .filter(subscription_entity::Column::OrganizationId.eq(organization_id))
            .one(self.db.as_ref())
            .await?
            .map(Subscription::try_from)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<OrganizationWithSubscription>, RepositoryError> {
        let organizations = organization_entity::Entity::find()
            .order_by_asc(organization_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        let mut subscriptions: HashMap<Uuid, Subscription> = HashMap::new();
        for model in subscription_entity::Entity::find()
            .all(self.db.as_ref())
            .await?
        {
            let sub = Subscription::try_from(model)?;
            subscriptions.insert(sub.organization_id, sub);
        }

        Ok(organizations
            .into_iter()
            .map(|model| {
                let subscription = subscriptions.remove(&model.id);
                OrganizationWithSubscription {
                    organization: model.into(),
                    subscription,
                }
            })
            .collect())
    }

    async fn create_with_subscription(
        &self,
        organization: &Organization,
        subscription: &Subscription,
    ) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        let org_model: organization_entity::ActiveModel = organization.into();
        if let Err(e) = org_model.insert(&txn).await {
            txn.rollback().await?;
            return Err(conflict_on_unique(e, "organization already exists"));
        }

        let sub_model: subscription_entity::ActiveModel = subscription.into();
        if let Err(e) = sub_model.insert(&txn).await {
            txn.rollback().await?;
            return Err(conflict_on_unique(e, "subscription already exists"));
        }

        txn.commit().await?;
        debug!(organization_id = %organization.id, slug = %organization.slug, "organization created");
        Ok(())
    }

    async fn insert_subscription(
        &self,
        subscription: &Subscription,
    ) -> Result<(), RepositoryError> {
        let model: subscription_entity::ActiveModel = subscription.into();
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| conflict_on_unique(e, "subscription already exists"))?;
        Ok(())
    }

    async fn renew_subscription(
        &self,
        organization_id: Uuid,
        plan: PlanTier,
        customer_ref: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Subscription, RepositoryError> {
        let model = subscription_entity::Entity::find()
            .filter(subscription_entity::Column::OrganizationId.eq(organization_id))
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let mut active: subscription_entity::ActiveModel = model.into();
        active.plan = Set(plan.to_string());
        active.status = Set(SubscriptionStatus::Active.to_string());
        active.current_period_start = Set(now);
        active.current_period_end = Set(plan.period_end(now));
        if customer_ref.is_some() {
            active.customer_ref = Set(customer_ref);
        }
        active.updated_at = Set(now);

        active.update(self.db.as_ref()).await?.try_into()
    }

    async fn cancel_by_customer(&self, customer_ref: &str) -> Result<u64, RepositoryError> {
        let result = subscription_entity::Entity::update_many()
            .col_expr(
                subscription_entity::Column::Status,
                Expr::value(SubscriptionStatus::Cancelled.to_string()),
            )
            .col_expr(subscription_entity::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(subscription_entity::Column::CustomerRef.eq(customer_ref))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }

    async fn claim_billing_event(
        &self,
        event_key: &str,
        event_type: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let model = billing_event_entity::ActiveModel {
            event_key: Set(event_key.to_string()),
            event_type: Set(event_type.to_string()),
            processed_at: Set(now),
        };
        match model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| conflict_on_unique(e, "billing event already processed"))
        {
            Ok(_) => Ok(true),
            Err(RepositoryError::Conflict(_)) => {
                debug!(%event_key, "billing event already claimed");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn release_billing_event(&self, event_key: &str) -> Result<(), RepositoryError> {
        billing_event_entity::Entity::delete_by_id(event_key.to_string())
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn update_invite_code(
        &self,
        organization_id: Uuid,
        code: &str,
    ) -> Result<Organization, RepositoryError> {
        let model = organization_entity::Entity::find_by_id(organization_id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let mut active: organization_entity::ActiveModel = model.into();
        active.invite_code = Set(code.to_string());
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(self.db.as_ref())
            .await
            .map_err(|e| conflict_on_unique(e, "invite code already in use"))?;
        Ok(updated.into())
    }
}

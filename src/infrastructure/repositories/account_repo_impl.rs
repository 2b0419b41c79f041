// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{conflict_on_unique, parse_column};
use crate::domain::models::account::{normalize_email, Account, Role, Session};
use crate::domain::models::job::JobKind;
use crate::domain::repositories::account_repository::{AccountRepository, SessionRepository};
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::{
    account as account_entity, client_link as link_entity, job as job_entity,
    product as product_entity, session as session_entity, subscription as subscription_entity,
    task as task_entity,
};

/// 账户仓库实现
#[derive(Clone)]
pub struct AccountRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl AccountRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<account_entity::Model> for Account {
    type Error = RepositoryError;

    fn try_from(model: account_entity::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            email: model.email,
            name: model.name,
            role: parse_column(&model.role)?,
            is_master_admin: model.is_master_admin,
            company_name: model.company_name,
            password_hash: model.password_hash,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Account> for account_entity::ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: Set(account.id),
            email: Set(normalize_email(&account.email)),
            name: Set(account.name.clone()),
            role: Set(account.role.to_string()),
            is_master_admin: Set(account.is_master_admin),
            company_name: Set(account.company_name.clone()),
            password_hash: Set(account.password_hash.clone()),
            created_at: Set(account.created_at),
            updated_at: Set(account.updated_at),
        }
    }
}

#[async_trait]
impl AccountRepository for AccountRepositoryImpl {
    async fn create(&self, account: &Account) -> Result<Account, RepositoryError> {
        let model: account_entity::ActiveModel = account.into();
        let inserted = model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| conflict_on_unique(e, "email already registered"))?;
        inserted.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, RepositoryError> {
        account_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError> {
        account_entity::Entity::find()
            .filter(account_entity::Column::Email.eq(normalize_email(email)))
            .one(self.db.as_ref())
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Account>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        account_entity::Entity::find()
            .filter(account_entity::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(account_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Account>, RepositoryError> {
        account_entity::Entity::find()
            .order_by_asc(account_entity::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    async fn update_role(&self, id: Uuid, role: Role) -> Result<Account, RepositoryError> {
        let model = account_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let mut active: account_entity::ActiveModel = model.into();
        active.role = Set(role.to_string());
        active.is_master_admin = Set(role == Role::MasterAdmin);
        active.updated_at = Set(Utc::now());

        active.update(self.db.as_ref()).await?.try_into()
    }

    async fn purge(&self, id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        // 任务和产品由外键级联删除，后台任务没有外键，需要手动清理
        let task_ids: Vec<Uuid> = task_entity::Entity::find()
            .select_only()
            .column(task_entity::Column::Id)
            .filter(task_entity::Column::OwnerId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;
        let product_ids: Vec<Uuid> = product_entity::Entity::find()
            .select_only()
            .column(product_entity::Column::Id)
            .filter(product_entity::Column::OwnerId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        if !task_ids.is_empty() {
            job_entity::Entity::delete_many()
                .filter(job_entity::Column::Kind.eq(JobKind::CompileBrief.to_string()))
                .filter(job_entity::Column::EntityId.is_in(task_ids))
                .exec(&txn)
                .await?;
        }
        if !product_ids.is_empty() {
            job_entity::Entity::delete_many()
                .filter(job_entity::Column::Kind.eq(JobKind::AnalyzeProduct.to_string()))
                .filter(job_entity::Column::EntityId.is_in(product_ids))
                .exec(&txn)
                .await?;
        }

        // 客户离开的组织计数同步递减
        let linked_orgs: Vec<Uuid> = link_entity::Entity::find()
            .select_only()
            .column(link_entity::Column::OrganizationId)
            .filter(link_entity::Column::ClientId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;
        for organization_id in linked_orgs {
            subscription_entity::Entity::update_many()
                .col_expr(
                    subscription_entity::Column::ClientCount,
                    Expr::col(subscription_entity::Column::ClientCount).sub(1),
                )
                .filter(subscription_entity::Column::OrganizationId.eq(organization_id))
                .filter(subscription_entity::Column::ClientCount.gt(0))
                .exec(&txn)
                .await?;
        }

        let result = account_entity::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        txn.commit().await?;
        Ok(())
    }
}

/// 会话仓库实现
#[derive(Clone)]
pub struct SessionRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl SessionRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<session_entity::Model> for Session {
    fn from(model: session_entity::Model) -> Self {
        Self {
            token: model.token,
            account_id: model.account_id,
            expires_at: model.expires_at,
            created_at: model.created_at,
        }
    }
}

#[async_trait]
impl SessionRepository for SessionRepositoryImpl {
    async fn create(&self, session: &Session) -> Result<(), RepositoryError> {
        let model = session_entity::ActiveModel {
            token: Set(session.token.clone()),
            account_id: Set(session.account_id),
            expires_at: Set(session.expires_at),
            created_at: Set(session.created_at),
        };
        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn find_valid(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, RepositoryError> {
        let model = session_entity::Entity::find_by_id(token.to_string())
            .filter(session_entity::Column::ExpiresAt.gt(now))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn delete(&self, token: &str) -> Result<(), RepositoryError> {
        session_entity::Entity::delete_by_id(token.to_string())
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = session_entity::Entity::delete_many()
            .filter(session_entity::Column::ExpiresAt.lte(now))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::models::account::{Account, Role, Session};

/// 账户仓库特质
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// 创建账户，邮箱重复时返回 `Conflict`
    async fn create(&self, account: &Account) -> Result<Account, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError>;
    /// 批量查询，用于客户名册
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Account>, RepositoryError>;
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Account>, RepositoryError>;
    /// 修改角色；`master_admin` 同时设置管理员标志
    async fn update_role(&self, id: Uuid, role: Role) -> Result<Account, RepositoryError>;
    /// 删除账户及其拥有的全部记录
    async fn purge(&self, id: Uuid) -> Result<(), RepositoryError>;
}

/// 会话仓库特质
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<(), RepositoryError>;
    /// 查找未过期的会话
    async fn find_valid(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, RepositoryError>;
    async fn delete(&self, token: &str) -> Result<(), RepositoryError>;
    /// 清理过期会话，返回删除数量
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError>;
}

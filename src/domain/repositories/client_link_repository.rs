// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::models::client_link::ClientProviderLink;

/// 兑换邀请的结果
#[derive(Debug, Clone)]
pub enum RedeemOutcome {
    Linked(ClientProviderLink),
    /// 事务内发现订阅不是 active
    SubscriptionInactive,
    /// 唯一约束命中
    AlreadyLinked,
}

/// 客户关系仓库特质
#[async_trait]
pub trait ClientLinkRepository: Send + Sync {
    /// 在一个事务中插入关系并原子地递增 `client_count`
    async fn redeem(
        &self,
        client_id: Uuid,
        organization_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RedeemOutcome, RepositoryError>;

    /// 删除关系并递减计数，计数不会低于零
    ///
    /// # 返回值
    ///
    /// 是否删除了关系
    async fn remove(&self, client_id: Uuid, organization_id: Uuid)
        -> Result<bool, RepositoryError>;

    async fn exists(&self, client_id: Uuid, organization_id: Uuid)
        -> Result<bool, RepositoryError>;

    /// 客户的全部关系，按加入时间升序
    async fn list_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<ClientProviderLink>, RepositoryError>;

    /// 组织下的全部关系；`None` 表示所有组织
    async fn list_for_organization(
        &self,
        organization_id: Option<Uuid>,
    ) -> Result<Vec<ClientProviderLink>, RepositoryError>;
}

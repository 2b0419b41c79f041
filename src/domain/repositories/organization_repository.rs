// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::models::organization::{Organization, PlanTier, Subscription};

/// 组织及其订阅
#[derive(Debug, Clone)]
pub struct OrganizationWithSubscription {
    pub organization: Organization,
    /// 缺失时视为未激活
    pub subscription: Option<Subscription>,
}

/// 组织仓库特质
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, RepositoryError>;
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<Organization>, RepositoryError>;
    async fn find_by_invite_code(
        &self,
        code: &str,
    ) -> Result<Option<Organization>, RepositoryError>;
    async fn find_subscription(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<Subscription>, RepositoryError>;
    async fn list(&self) -> Result<Vec<OrganizationWithSubscription>, RepositoryError>;

    /// 在一个事务中创建组织和订阅
    ///
    /// 所有者已有组织时返回 `Conflict`，不会留下半成品
    async fn create_with_subscription(
        &self,
        organization: &Organization,
        subscription: &Subscription,
    ) -> Result<(), RepositoryError>;

    /// 为缺少订阅的组织补建订阅
    async fn insert_subscription(&self, subscription: &Subscription)
        -> Result<(), RepositoryError>;

    /// 开启新的计费周期并激活订阅
    async fn renew_subscription(
        &self,
        organization_id: Uuid,
        plan: PlanTier,
        customer_ref: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Subscription, RepositoryError>;

    /// 按支付客户标识取消订阅，返回受影响的行数
    async fn cancel_by_customer(&self, customer_ref: &str) -> Result<u64, RepositoryError>;

    /// 登记已处理的支付事件
    ///
    /// # 返回值
    ///
    /// 首次登记返回 `true`，事件已登记过返回 `false`
    async fn claim_billing_event(
        &self,
        event_key: &str,
        event_type: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;

    /// 撤销登记，处理失败后允许支付处理方重新投递
    async fn release_billing_event(&self, event_key: &str) -> Result<(), RepositoryError>;

    async fn update_invite_code(
        &self,
        organization_id: Uuid,
        code: &str,
    ) -> Result<Organization, RepositoryError>;
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use metrics::counter;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::models::account::Account;
use crate::domain::models::organization::{Organization, PlanTier, Subscription};
use crate::domain::repositories::organization_repository::{
    OrganizationRepository, OrganizationWithSubscription,
};
use crate::domain::repositories::RepositoryError;
use crate::utils::errors::{ServiceError, ServiceResult};
use crate::utils::tokens::{generate_invite_code, generate_service_id, slug_with_suffix, slugify};

/// 标识冲突时的最大重试次数
const MAX_ATTEMPTS: usize = 5;

/// 组织开通服务
///
/// 开通是显式操作，只在支付完成或管理员提升角色时调用。
/// 组织和订阅在同一事务中创建，重复调用是幂等的。
pub struct ProvisioningService {
    organizations: Arc<dyn OrganizationRepository>,
}

impl ProvisioningService {
    pub fn new(organizations: Arc<dyn OrganizationRepository>) -> Self {
        Self { organizations }
    }

    /// 确保服务商拥有组织和订阅
    ///
    /// - 没有组织：创建组织和订阅
    /// - 已有组织但缺少订阅：补建订阅
    /// - 已有订阅且为付费套餐：开启新周期
    /// - 已有订阅且为演示套餐：保持不变
    ///
    /// # 参数
    ///
    /// * `owner` - 服务商账户
    /// * `organization_name` - 新建组织时使用的名称
    /// * `plan` - 套餐
    /// * `customer_ref` - 支付处理方的客户标识
    /// * `now` - 当前时间
    pub async fn ensure_provisioned(
        &self,
        owner: &Account,
        organization_name: &str,
        plan: PlanTier,
        customer_ref: Option<String>,
        now: DateTime<Utc>,
    ) -> ServiceResult<OrganizationWithSubscription> {
        let name = match organization_name.trim() {
            "" => owner.default_organization_name(),
            trimmed => trimmed.to_string(),
        };
        let base_slug = slugify(&name);

        for attempt in 0..MAX_ATTEMPTS {
            if let Some(existing) = self.organizations.find_by_owner(owner.id).await? {
                return self
                    .refresh_existing(existing, plan, customer_ref, now)
                    .await;
            }

            let slug = if attempt == 0 {
                base_slug.clone()
            } else {
                slug_with_suffix(&base_slug)
            };
            let organization = Organization {
                id: Uuid::new_v4(),
                owner_id: owner.id,
                name: name.clone(),
                slug,
                service_id: generate_service_id(),
                invite_code: generate_invite_code(),
                created_at: now,
                updated_at: now,
            };
            let subscription = Subscription::start(organization.id, plan, customer_ref.clone(), now);

            match self
                .organizations
                .create_with_subscription(&organization, &subscription)
                .await
            {
                Ok(()) => {
                    info!(
                        organization_id = %organization.id,
                        owner_id = %owner.id,
                        plan = %plan,
                        "organization provisioned"
                    );
                    counter!("organizations_provisioned_total", "plan" => plan.as_str())
                        .increment(1);
                    return Ok(OrganizationWithSubscription {
                        organization,
                        subscription: Some(subscription),
                    });
                }
                // 所有者并发开通或标识撞车，下一轮重新检查
                Err(RepositoryError::Conflict(detail)) => {
                    warn!(owner_id = %owner.id, attempt, %detail, "provisioning conflict, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::Conflict(
            "could not allocate unique organization identifiers".to_string(),
        ))
    }

    async fn refresh_existing(
        &self,
        organization: Organization,
        plan: PlanTier,
        customer_ref: Option<String>,
        now: DateTime<Utc>,
    ) -> ServiceResult<OrganizationWithSubscription> {
        let subscription = match self.organizations.find_subscription(organization.id).await? {
            None => {
                let subscription = Subscription::start(organization.id, plan, customer_ref, now);
                self.organizations.insert_subscription(&subscription).await?;
                info!(organization_id = %organization.id, "missing subscription repaired");
                subscription
            }
            Some(current) if plan.is_purchasable() => {
                let renewed = self
                    .organizations
                    .renew_subscription(organization.id, plan, customer_ref, now)
                    .await?;
                info!(
                    organization_id = %organization.id,
                    previous_plan = %current.plan,
                    plan = %plan,
                    "subscription renewed"
                );
                renewed
            }
            Some(current) => current,
        };

        Ok(OrganizationWithSubscription {
            organization,
            subscription: Some(subscription),
        })
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::identity_service::CallerContext;
use crate::domain::models::client_link::ClientProviderLink;
use crate::domain::models::organization::{subscription_is_active, Organization};
use crate::domain::repositories::client_link_repository::{ClientLinkRepository, RedeemOutcome};
use crate::domain::repositories::organization_repository::OrganizationRepository;
use crate::utils::errors::{ServiceError, ServiceResult};

const INVALID_CODE: &str = "invalid invite code";
const SUBSCRIPTION_INACTIVE: &str = "subscription inactive";
const ALREADY_LINKED: &str = "already linked";

/// 邀请码对应组织的公开信息
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitePreview {
    pub organization_name: String,
    pub service_id: String,
    /// 组织当前是否可以接收新客户
    pub accepting_clients: bool,
}

/// 邀请服务
///
/// 处理邀请码的查询、兑换和客户关系解除
pub struct InviteService {
    organizations: Arc<dyn OrganizationRepository>,
    links: Arc<dyn ClientLinkRepository>,
}

impl InviteService {
    pub fn new(
        organizations: Arc<dyn OrganizationRepository>,
        links: Arc<dyn ClientLinkRepository>,
    ) -> Self {
        Self {
            organizations,
            links,
        }
    }

    /// 未登录也可查询邀请码
    pub async fn preview(&self, code: &str, now: DateTime<Utc>) -> ServiceResult<InvitePreview> {
        let organization = self.find_by_code(code).await?;
        let subscription = self.organizations.find_subscription(organization.id).await?;
        Ok(InvitePreview {
            organization_name: organization.name,
            service_id: organization.service_id,
            accepting_clients: subscription_is_active(subscription.as_ref(), now),
        })
    }

    /// 客户兑换邀请码
    ///
    /// # 返回值
    ///
    /// * `Ok(ClientProviderLink)` - 新建的客户关系
    /// * `Err(ServiceError::NotFound)` - 邀请码无效
    /// * `Err(ServiceError::Forbidden)` - 组织订阅未激活
    /// * `Err(ServiceError::Conflict)` - 已经加入过该组织
    pub async fn redeem(
        &self,
        caller: &CallerContext,
        code: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<ClientProviderLink> {
        if !caller.is_client() {
            return Err(ServiceError::forbidden(
                "only client accounts can redeem invite codes",
            ));
        }

        let organization = self.find_by_code(code).await?;
        let subscription = self.organizations.find_subscription(organization.id).await?;
        if !subscription_is_active(subscription.as_ref(), now) {
            counter!("invite_redemptions_total", "outcome" => "inactive").increment(1);
            return Err(ServiceError::forbidden(SUBSCRIPTION_INACTIVE));
        }

        if self
            .links
            .exists(caller.account_id(), organization.id)
            .await?
        {
            return Err(ServiceError::Conflict(ALREADY_LINKED.to_string()));
        }

        // 并发兑换由事务内的条件更新和唯一约束兜底
        match self
            .links
            .redeem(caller.account_id(), organization.id, now)
            .await?
        {
            RedeemOutcome::Linked(link) => {
                info!(
                    client_id = %link.client_id,
                    organization_id = %link.organization_id,
                    "invite redeemed"
                );
                counter!("invite_redemptions_total", "outcome" => "linked").increment(1);
                Ok(link)
            }
            RedeemOutcome::SubscriptionInactive => {
                counter!("invite_redemptions_total", "outcome" => "inactive").increment(1);
                Err(ServiceError::forbidden(SUBSCRIPTION_INACTIVE))
            }
            RedeemOutcome::AlreadyLinked => Err(ServiceError::Conflict(ALREADY_LINKED.to_string())),
        }
    }

    /// 解除客户关系
    ///
    /// 服务商只能解除自己组织的客户；管理员必须指定组织
    pub async fn unlink(
        &self,
        caller: &CallerContext,
        client_id: Uuid,
        organization_id: Option<Uuid>,
    ) -> ServiceResult<()> {
        let organization_id = if caller.is_master_admin() {
            organization_id.ok_or_else(|| ServiceError::validation("organizationId is required"))?
        } else if caller.is_service_provider() {
            let owned = caller
                .primary_organization()
                .ok_or_else(|| ServiceError::not_found("organization"))?;
            match organization_id {
                Some(requested) if requested != owned => {
                    return Err(ServiceError::not_found("client link"))
                }
                _ => owned,
            }
        } else {
            return Err(ServiceError::forbidden(
                "only service providers can remove clients",
            ));
        };

        if !self.links.remove(client_id, organization_id).await? {
            return Err(ServiceError::not_found("client link"));
        }

        info!(%client_id, %organization_id, "client unlinked");
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> ServiceResult<Organization> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ServiceError::NotFound(INVALID_CODE.to_string()));
        }
        self.organizations
            .find_by_invite_code(code)
            .await?
            .ok_or_else(|| ServiceError::NotFound(INVALID_CODE.to_string()))
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::identity_service::CallerContext;
use super::tenancy::{roster_scope, RosterScope};
use crate::domain::models::organization::{subscription_is_active, Organization, Subscription};
use crate::domain::repositories::account_repository::AccountRepository;
use crate::domain::repositories::client_link_repository::ClientLinkRepository;
use crate::domain::repositories::organization_repository::OrganizationRepository;
use crate::utils::errors::{ServiceError, ServiceResult};
use crate::utils::tokens::generate_invite_code;

/// 调用方可见的组织信息
///
/// 邀请码和订阅只对所有者和管理员展示
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationOverview {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub service_id: String,
    pub invite_code: Option<String>,
    pub invite_link: Option<String>,
    pub subscription: Option<Subscription>,
    pub subscription_active: bool,
}

/// 名册中的客户
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company_name: Option<String>,
    pub organization_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

pub struct OrganizationService {
    accounts: Arc<dyn AccountRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    links: Arc<dyn ClientLinkRepository>,
    public_base_url: String,
}

impl OrganizationService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        links: Arc<dyn ClientLinkRepository>,
        public_base_url: String,
    ) -> Self {
        Self {
            accounts,
            organizations,
            links,
            public_base_url,
        }
    }

    /// 调用方范围内的组织
    ///
    /// 管理员看到全部组织，服务商看到自己的组织，客户看到已加入的组织
    pub async fn list_for_caller(
        &self,
        caller: &CallerContext,
        now: DateTime<Utc>,
    ) -> ServiceResult<Vec<OrganizationOverview>> {
        if caller.is_master_admin() {
            let all = self.organizations.list().await?;
            return Ok(all
                .into_iter()
                .map(|o| self.owner_view(o.organization, o.subscription, now))
                .collect());
        }

        let ids = caller.organization_ids().unwrap_or_default();
        let mut views = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(organization) = self.organizations.find_by_id(*id).await? else {
                continue;
            };
            let subscription = self.organizations.find_subscription(*id).await?;
            if caller.is_service_provider() {
                views.push(self.owner_view(organization, subscription, now));
            } else {
                let active = subscription_is_active(subscription.as_ref(), now);
                views.push(OrganizationOverview {
                    id: organization.id,
                    name: organization.name,
                    slug: organization.slug,
                    service_id: organization.service_id,
                    invite_code: None,
                    invite_link: None,
                    subscription: None,
                    subscription_active: active,
                });
            }
        }
        Ok(views)
    }

    /// 服务商重新生成邀请码，旧邀请码立即失效
    pub async fn regenerate_invite_code(
        &self,
        caller: &CallerContext,
        now: DateTime<Utc>,
    ) -> ServiceResult<OrganizationOverview> {
        if !caller.is_service_provider() {
            return Err(ServiceError::forbidden(
                "only service providers can manage invite codes",
            ));
        }
        let organization_id = caller
            .primary_organization()
            .ok_or_else(|| ServiceError::not_found("organization"))?;

        let organization = self
            .organizations
            .update_invite_code(organization_id, &generate_invite_code())
            .await?;
        let subscription = self.organizations.find_subscription(organization_id).await?;
        info!(%organization_id, "invite code regenerated");

        Ok(self.owner_view(organization, subscription, now))
    }

    /// 客户名册
    pub async fn client_roster(&self, caller: &CallerContext) -> ServiceResult<Vec<ClientSummary>> {
        let links = match roster_scope(caller)? {
            RosterScope::Empty => return Ok(Vec::new()),
            RosterScope::All => self.links.list_for_organization(None).await?,
            RosterScope::Organization(id) => self.links.list_for_organization(Some(id)).await?,
        };
        if links.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = links.iter().map(|l| l.client_id).collect();
        let accounts: HashMap<Uuid, _> = self
            .accounts
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        Ok(links
            .into_iter()
            .filter_map(|link| {
                accounts.get(&link.client_id).map(|account| ClientSummary {
                    id: account.id,
                    name: account.name.clone(),
                    email: account.email.clone(),
                    company_name: account.company_name.clone(),
                    organization_id: link.organization_id,
                    joined_at: link.joined_at,
                })
            })
            .collect())
    }

    fn owner_view(
        &self,
        organization: Organization,
        subscription: Option<Subscription>,
        now: DateTime<Utc>,
    ) -> OrganizationOverview {
        let active = subscription_is_active(subscription.as_ref(), now);
        OrganizationOverview {
            invite_link: Some(organization.invite_link(&self.public_base_url)),
            id: organization.id,
            name: organization.name,
            slug: organization.slug,
            service_id: organization.service_id,
            invite_code: Some(organization.invite_code),
            subscription,
            subscription_active: active,
        }
    }
}

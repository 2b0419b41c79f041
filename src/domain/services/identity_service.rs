// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::account::{Account, Role};
use crate::domain::repositories::account_repository::AccountRepository;
use crate::domain::repositories::client_link_repository::ClientLinkRepository;
use crate::domain::repositories::organization_repository::OrganizationRepository;
use crate::utils::errors::{ServiceError, ServiceResult};

/// 组织范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgScope {
    /// 不受限，仅限管理员
    Unrestricted,
    /// 可访问的组织，客户按加入时间排序
    Organizations(Vec<Uuid>),
}

/// 已解析的调用方上下文
///
/// 由处理器显式传给各服务，租户规则不依赖请求框架
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub account: Account,
    /// 实际生效的角色
    pub role: Role,
    pub scope: OrgScope,
}

impl CallerContext {
    pub fn account_id(&self) -> Uuid {
        self.account.id
    }

    pub fn is_master_admin(&self) -> bool {
        self.role == Role::MasterAdmin
    }

    pub fn is_service_provider(&self) -> bool {
        self.role == Role::ServiceProvider
    }

    pub fn is_client(&self) -> bool {
        self.role == Role::Client
    }

    /// 范围内的组织；不受限时为 `None`
    pub fn organization_ids(&self) -> Option<&[Uuid]> {
        match &self.scope {
            OrgScope::Unrestricted => None,
            OrgScope::Organizations(ids) => Some(ids),
        }
    }

    /// 主组织：客户最早加入的组织，或服务商拥有的组织
    pub fn primary_organization(&self) -> Option<Uuid> {
        self.organization_ids().and_then(|ids| ids.first().copied())
    }

    pub fn can_access_organization(&self, organization_id: Uuid) -> bool {
        match &self.scope {
            OrgScope::Unrestricted => true,
            OrgScope::Organizations(ids) => ids.contains(&organization_id),
        }
    }
}

/// 身份与角色解析服务
///
/// 只读，从不创建组织或订阅
pub struct IdentityService {
    accounts: Arc<dyn AccountRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    links: Arc<dyn ClientLinkRepository>,
}

impl IdentityService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        links: Arc<dyn ClientLinkRepository>,
    ) -> Self {
        Self {
            accounts,
            organizations,
            links,
        }
    }

    /// 解析已认证调用方的角色和组织范围
    ///
    /// # 参数
    ///
    /// * `account_id` - 会话对应的账户
    ///
    /// # 返回值
    ///
    /// * `Ok(CallerContext)` - 解析结果
    /// * `Err(ServiceError::NotFound)` - 会话期间账户已被删除
    pub async fn resolve(&self, account_id: Uuid) -> ServiceResult<CallerContext> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("account"))?;

        let role = account.effective_role();
        let scope = match role {
            Role::MasterAdmin => OrgScope::Unrestricted,
            Role::ServiceProvider => {
                // 零个组织只出现在开通完成之前
                let owned = self.organizations.find_by_owner(account.id).await?;
                OrgScope::Organizations(owned.map(|o| o.id).into_iter().collect())
            }
            Role::Client => {
                let links = self.links.list_for_client(account.id).await?;
                OrgScope::Organizations(links.into_iter().map(|l| l.organization_id).collect())
            }
        };

        tracing::debug!(account_id = %account.id, role = %role, "resolved caller");

        Ok(CallerContext {
            account,
            role,
            scope,
        })
    }
}

#[cfg(test)]
#[path = "identity_service_test.rs"]
mod tests;

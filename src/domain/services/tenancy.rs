// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use uuid::Uuid;

use super::identity_service::{CallerContext, OrgScope};
use crate::domain::models::account::Role;
use crate::utils::errors::{ServiceError, ServiceResult};

/// 租户过滤条件
///
/// 适用于任务和产品这类“客户拥有、组织内可见”的资源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenancyFilter {
    /// 不过滤，仅管理员
    Unrestricted,
    /// 范围为空，结果恒为空集
    Empty,
    /// 按组织过滤（服务商）
    Organizations(Vec<Uuid>),
    /// 按组织和所有者同时过滤（客户）
    OwnedWithin {
        owner_id: Uuid,
        organization_ids: Vec<Uuid>,
    },
}

impl TenancyFilter {
    /// 由调用方上下文推导过滤条件
    pub fn for_caller(caller: &CallerContext) -> Self {
        let ids = match &caller.scope {
            OrgScope::Unrestricted => return TenancyFilter::Unrestricted,
            OrgScope::Organizations(ids) if ids.is_empty() => return TenancyFilter::Empty,
            OrgScope::Organizations(ids) => ids.clone(),
        };

        match caller.role {
            Role::ServiceProvider => TenancyFilter::Organizations(ids),
            // 客户即使与他人同属一个组织，也只能看到自己的资源
            Role::Client => TenancyFilter::OwnedWithin {
                owner_id: caller.account_id(),
                organization_ids: ids,
            },
            Role::MasterAdmin => TenancyFilter::Unrestricted,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TenancyFilter::Empty)
    }

    /// 单个资源是否在范围内
    pub fn permits(&self, owner_id: Uuid, organization_id: Option<Uuid>) -> bool {
        match self {
            TenancyFilter::Unrestricted => true,
            TenancyFilter::Empty => false,
            TenancyFilter::Organizations(ids) => organization_id.is_some_and(|o| ids.contains(&o)),
            TenancyFilter::OwnedWithin {
                owner_id: caller,
                organization_ids,
            } => {
                *caller == owner_id
                    && organization_id.is_some_and(|o| organization_ids.contains(&o))
            }
        }
    }
}

/// 客户名册的可见范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterScope {
    /// 所有组织的客户
    All,
    /// 单个组织的客户
    Organization(Uuid),
    /// 服务商尚未开通组织
    Empty,
}

/// 客户名册只对服务商和管理员开放
pub fn roster_scope(caller: &CallerContext) -> ServiceResult<RosterScope> {
    match caller.role {
        Role::MasterAdmin => Ok(RosterScope::All),
        Role::ServiceProvider => Ok(caller
            .primary_organization()
            .map(RosterScope::Organization)
            .unwrap_or(RosterScope::Empty)),
        Role::Client => Err(ServiceError::forbidden(
            "only service providers can view the client roster",
        )),
    }
}

#[cfg(test)]
#[path = "tenancy_test.rs"]
mod tests;

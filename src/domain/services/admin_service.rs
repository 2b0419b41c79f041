// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::identity_service::CallerContext;
use super::provisioning_service::ProvisioningService;
use crate::domain::models::account::{Account, Role};
use crate::domain::models::organization::PlanTier;
use crate::domain::repositories::account_repository::AccountRepository;
use crate::domain::repositories::RepositoryError;
use crate::utils::errors::{ServiceError, ServiceResult};

/// 管理员服务
pub struct AdminService {
    accounts: Arc<dyn AccountRepository>,
    provisioning: Arc<ProvisioningService>,
}

impl AdminService {
    pub fn new(accounts: Arc<dyn AccountRepository>, provisioning: Arc<ProvisioningService>) -> Self {
        Self {
            accounts,
            provisioning,
        }
    }

    pub async fn list_accounts(
        &self,
        caller: &CallerContext,
        limit: u64,
        offset: u64,
    ) -> ServiceResult<Vec<Account>> {
        require_admin(caller)?;
        Ok(self.accounts.list(limit.clamp(1, 500), offset).await?)
    }

    /// 修改账户角色
    ///
    /// 提升为服务商时同时开通演示套餐的组织
    pub async fn set_role(
        &self,
        caller: &CallerContext,
        account_id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> ServiceResult<Account> {
        require_admin(caller)?;

        let account = match self.accounts.update_role(account_id, role).await {
            Ok(account) => account,
            Err(RepositoryError::NotFound) => return Err(ServiceError::not_found("account")),
            Err(e) => return Err(e.into()),
        };

        if role == Role::ServiceProvider {
            let name = account.default_organization_name();
            self.provisioning
                .ensure_provisioned(&account, &name, PlanTier::Demo, None, now)
                .await?;
        }

        info!(%account_id, role = %role, by = %caller.account_id(), "account role changed");
        Ok(account)
    }

    /// 删除账户及其拥有的全部数据
    pub async fn purge(&self, caller: &CallerContext, account_id: Uuid) -> ServiceResult<()> {
        require_admin(caller)?;
        if caller.account_id() == account_id {
            return Err(ServiceError::validation("cannot purge your own account"));
        }
        if self.accounts.find_by_id(account_id).await?.is_none() {
            return Err(ServiceError::not_found("account"));
        }

        self.accounts.purge(account_id).await?;
        info!(%account_id, by = %caller.account_id(), "account purged");
        Ok(())
    }
}

fn require_admin(caller: &CallerContext) -> ServiceResult<()> {
    if caller.is_master_admin() {
        Ok(())
    } else {
        Err(ServiceError::forbidden("admin access required"))
    }
}

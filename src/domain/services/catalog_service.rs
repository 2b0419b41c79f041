// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::identity_service::CallerContext;
use crate::domain::models::catalog::{PricingRule, ServiceOffering};
use crate::domain::repositories::catalog_repository::CatalogRepository;
use crate::utils::errors::{ServiceError, ServiceResult};

/// 价格规则的输入
#[derive(Debug, Clone)]
pub struct PricingRuleInput {
    pub name: String,
    pub category: String,
    pub min_price: f64,
    pub max_price: f64,
    pub is_active: bool,
}

/// 服务项的输入
#[derive(Debug, Clone)]
pub struct ServiceOfferingInput {
    pub name: String,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub is_active: bool,
}

/// 目录服务
///
/// 服务商维护自己组织的价格规则和服务项；
/// 客户只能读取主组织中启用的服务项。
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    pub async fn list_pricing_rules(
        &self,
        caller: &CallerContext,
        organization_id: Option<Uuid>,
    ) -> ServiceResult<Vec<PricingRule>> {
        let Some(organization_id) = self.managed_organization(caller, organization_id)? else {
            return Ok(Vec::new());
        };
        Ok(self
            .catalog
            .list_pricing_rules(organization_id, false)
            .await?)
    }

    pub async fn create_pricing_rule(
        &self,
        caller: &CallerContext,
        organization_id: Option<Uuid>,
        input: PricingRuleInput,
    ) -> ServiceResult<PricingRule> {
        let organization_id = self
            .managed_organization(caller, organization_id)?
            .ok_or_else(|| ServiceError::not_found("organization"))?;
        validate_rule(&input)?;

        let rule = PricingRule {
            id: Uuid::new_v4(),
            organization_id,
            name: input.name.trim().to_string(),
            category: input.category.trim().to_lowercase(),
            min_price: input.min_price,
            max_price: input.max_price,
            is_active: input.is_active,
            created_at: Utc::now(),
        };
        Ok(self.catalog.create_pricing_rule(&rule).await?)
    }

    pub async fn update_pricing_rule(
        &self,
        caller: &CallerContext,
        id: Uuid,
        input: PricingRuleInput,
    ) -> ServiceResult<PricingRule> {
        let mut rule = self.owned_rule(caller, id).await?;
        validate_rule(&input)?;

        rule.name = input.name.trim().to_string();
        rule.category = input.category.trim().to_lowercase();
        rule.min_price = input.min_price;
        rule.max_price = input.max_price;
        rule.is_active = input.is_active;
        Ok(self.catalog.update_pricing_rule(&rule).await?)
    }

    pub async fn delete_pricing_rule(&self, caller: &CallerContext, id: Uuid) -> ServiceResult<()> {
        let rule = self.owned_rule(caller, id).await?;
        Ok(self.catalog.delete_pricing_rule(rule.id).await?)
    }

    /// 服务项列表；客户看到主组织中启用的服务项
    pub async fn list_services(
        &self,
        caller: &CallerContext,
        organization_id: Option<Uuid>,
    ) -> ServiceResult<Vec<ServiceOffering>> {
        if caller.is_client() {
            let Some(primary) = caller.primary_organization() else {
                return Ok(Vec::new());
            };
            return Ok(self.catalog.list_services(primary, true).await?);
        }
        let Some(organization_id) = self.managed_organization(caller, organization_id)? else {
            return Ok(Vec::new());
        };
        Ok(self.catalog.list_services(organization_id, false).await?)
    }

    pub async fn create_service(
        &self,
        caller: &CallerContext,
        organization_id: Option<Uuid>,
        input: ServiceOfferingInput,
    ) -> ServiceResult<ServiceOffering> {
        let organization_id = self
            .managed_organization(caller, organization_id)?
            .ok_or_else(|| ServiceError::not_found("organization"))?;
        let name = required_name(&input.name)?;

        let service = ServiceOffering {
            id: Uuid::new_v4(),
            organization_id,
            name,
            description: input.description,
            keywords: normalize_keywords(input.keywords),
            is_active: input.is_active,
            created_at: Utc::now(),
        };
        Ok(self.catalog.create_service(&service).await?)
    }

    pub async fn update_service(
        &self,
        caller: &CallerContext,
        id: Uuid,
        input: ServiceOfferingInput,
    ) -> ServiceResult<ServiceOffering> {
        let mut service = self.owned_service(caller, id).await?;
        service.name = required_name(&input.name)?;
        service.description = input.description;
        service.keywords = normalize_keywords(input.keywords);
        service.is_active = input.is_active;
        Ok(self.catalog.update_service(&service).await?)
    }

    pub async fn delete_service(&self, caller: &CallerContext, id: Uuid) -> ServiceResult<()> {
        let service = self.owned_service(caller, id).await?;
        Ok(self.catalog.delete_service(service.id).await?)
    }

    /// 调用方可以管理的组织
    ///
    /// 服务商固定为自己的组织（尚未开通时为 `None`），管理员必须指定
    fn managed_organization(
        &self,
        caller: &CallerContext,
        requested: Option<Uuid>,
    ) -> ServiceResult<Option<Uuid>> {
        if caller.is_master_admin() {
            return requested
                .map(Some)
                .ok_or_else(|| ServiceError::validation("organizationId is required"));
        }
        if caller.is_service_provider() {
            return Ok(caller.primary_organization());
        }
        Err(ServiceError::forbidden(
            "only service providers can manage the catalog",
        ))
    }

    async fn owned_rule(&self, caller: &CallerContext, id: Uuid) -> ServiceResult<PricingRule> {
        self.ensure_manager(caller)?;
        match self.catalog.find_pricing_rule(id).await? {
            Some(rule) if caller.can_access_organization(rule.organization_id) => Ok(rule),
            _ => Err(ServiceError::not_found("pricing rule")),
        }
    }

    async fn owned_service(
        &self,
        caller: &CallerContext,
        id: Uuid,
    ) -> ServiceResult<ServiceOffering> {
        self.ensure_manager(caller)?;
        match self.catalog.find_service(id).await? {
            Some(service) if caller.can_access_organization(service.organization_id) => {
                Ok(service)
            }
            _ => Err(ServiceError::not_found("service")),
        }
    }

    fn ensure_manager(&self, caller: &CallerContext) -> ServiceResult<()> {
        if caller.is_client() {
            return Err(ServiceError::forbidden(
                "only service providers can manage the catalog",
            ));
        }
        Ok(())
    }
}

fn validate_rule(input: &PricingRuleInput) -> ServiceResult<()> {
    required_name(&input.name)?;
    if input.category.trim().is_empty() {
        return Err(ServiceError::validation("category is required"));
    }
    if !input.min_price.is_finite() || !input.max_price.is_finite() || input.min_price < 0.0 {
        return Err(ServiceError::validation("minPrice must be a non-negative number"));
    }
    if input.min_price > input.max_price {
        return Err(ServiceError::validation("minPrice must not exceed maxPrice"));
    }
    Ok(())
}

fn required_name(name: &str) -> ServiceResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::validation("name is required"));
    }
    Ok(name.to_string())
}

fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.trim().to_lowercase();
        if !keyword.is_empty() && !normalized.contains(&keyword) {
            normalized.push(keyword);
        }
    }
    normalized
}

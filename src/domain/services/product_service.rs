// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use super::identity_service::CallerContext;
use super::tenancy::TenancyFilter;
use crate::domain::models::job::{Job, JobKind};
use crate::domain::models::product::Product;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::product_repository::ProductRepository;
use crate::utils::errors::{ServiceError, ServiceResult};

/// 新建产品
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub website_url: Option<String>,
    /// 仅管理员需要指定
    pub organization_id: Option<Uuid>,
}

/// 产品服务
///
/// 带网址的产品创建后排队做网站分析，客户轮询产品状态获取结果
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    jobs: Arc<dyn JobRepository>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>, jobs: Arc<dyn JobRepository>) -> Self {
        Self { products, jobs }
    }

    pub async fn list(&self, caller: &CallerContext) -> ServiceResult<Vec<Product>> {
        let filter = TenancyFilter::for_caller(caller);
        if filter.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.products.list(&filter).await?)
    }

    pub async fn get(&self, caller: &CallerContext, id: Uuid) -> ServiceResult<Product> {
        let filter = TenancyFilter::for_caller(caller);
        match self.products.find_by_id(id).await? {
            Some(product) if filter.permits(product.owner_id, product.organization_id) => {
                Ok(product)
            }
            _ => Err(ServiceError::not_found("product")),
        }
    }

    /// 创建产品，有网址时排队分析
    ///
    /// # 返回值
    ///
    /// 产品和分析任务（没有网址时为 `None`）
    pub async fn create(
        &self,
        caller: &CallerContext,
        new_product: NewProduct,
    ) -> ServiceResult<(Product, Option<Job>)> {
        let name = new_product.name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("name is required"));
        }
        let website_url = new_product
            .website_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .map(|u| validate_website(&u).map(|_| u))
            .transpose()?;

        let organization_id = if caller.is_master_admin() {
            new_product
                .organization_id
                .ok_or_else(|| ServiceError::validation("organizationId is required"))?
        } else {
            caller.primary_organization().ok_or_else(|| {
                ServiceError::validation("organizationId: join an organization before adding products")
            })?
        };

        let product = Product::new(
            caller.account_id(),
            organization_id,
            name.to_string(),
            website_url,
        );
        let product = self.products.create(&product).await?;
        info!(product_id = %product.id, %organization_id, "product created");

        let job = if product.website_url.is_some() {
            match self.jobs.enqueue(JobKind::AnalyzeProduct, product.id).await {
                Ok(job) => Some(job),
                Err(e) => {
                    warn!(product_id = %product.id, error = %e, "could not enqueue product analysis");
                    None
                }
            }
        } else {
            None
        };

        Ok((product, job))
    }

    pub async fn delete(&self, caller: &CallerContext, id: Uuid) -> ServiceResult<()> {
        let product = self.get(caller, id).await?;
        self.products.delete(product.id).await?;
        info!(product_id = %product.id, "product deleted");
        Ok(())
    }
}

fn validate_website(raw: &str) -> ServiceResult<()> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => Ok(()),
        _ => Err(ServiceError::validation(
            "websiteUrl must be an http or https URL",
        )),
    }
}

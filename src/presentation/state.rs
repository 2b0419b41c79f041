// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::application::use_cases::analyze_product::{AnalyzeProductUseCase, SiteFetcher};
use crate::application::use_cases::compile_brief::CompileBriefUseCase;
use crate::application::use_cases::list_jobs::ListJobsUseCase;
use crate::application::use_cases::send_message::SendMessageUseCase;
use crate::config::settings::Settings;
use crate::domain::repositories::account_repository::{AccountRepository, SessionRepository};
use crate::domain::repositories::catalog_repository::CatalogRepository;
use crate::domain::repositories::client_link_repository::ClientLinkRepository;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::organization_repository::OrganizationRepository;
use crate::domain::repositories::product_repository::ProductRepository;
use crate::domain::repositories::storage_repository::StorageRepository;
use crate::domain::repositories::task_repository::TaskRepository;
use crate::domain::services::admin_service::AdminService;
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::billing_service::BillingService;
use crate::domain::services::catalog_service::CatalogService;
use crate::domain::services::extraction_service::ExtractionAgent;
use crate::domain::services::identity_service::IdentityService;
use crate::domain::services::invite_service::InviteService;
use crate::domain::services::llm_service::LlmService;
use crate::domain::services::organization_service::OrganizationService;
use crate::domain::services::payment_gateway::PaymentGateway;
use crate::domain::services::product_service::ProductService;
use crate::domain::services::provisioning_service::ProvisioningService;
use crate::domain::services::task_service::TaskService;
use crate::infrastructure::repositories::account_repo_impl::{
    AccountRepositoryImpl, SessionRepositoryImpl,
};
use crate::infrastructure::repositories::catalog_repo_impl::CatalogRepositoryImpl;
use crate::infrastructure::repositories::client_link_repo_impl::ClientLinkRepositoryImpl;
use crate::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use crate::infrastructure::repositories::organization_repo_impl::OrganizationRepositoryImpl;
use crate::infrastructure::repositories::product_repo_impl::ProductRepositoryImpl;
use crate::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;

/// 外部依赖
///
/// 生产环境使用 HTTP 客户端和分层存储，测试中替换为桩实现
pub struct ExternalServices {
    pub llm: Arc<dyn LlmService>,
    pub payments: Arc<dyn PaymentGateway>,
    pub storage: Arc<dyn StorageRepository>,
    pub site_fetcher: Arc<dyn SiteFetcher>,
}

/// 应用状态
///
/// 通过 `Extension` 注入每个请求，字段都是廉价克隆的 `Arc`
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub auth: Arc<AuthService>,
    pub identity: Arc<IdentityService>,
    pub organizations: Arc<OrganizationService>,
    pub invites: Arc<InviteService>,
    pub tasks: Arc<TaskService>,
    pub products: Arc<ProductService>,
    pub catalog: Arc<CatalogService>,
    pub billing: Arc<BillingService>,
    pub admin: Arc<AdminService>,
    pub send_message: Arc<SendMessageUseCase>,
    pub compile_brief: Arc<CompileBriefUseCase>,
    pub analyze_product: Arc<AnalyzeProductUseCase>,
    pub list_jobs: Arc<ListJobsUseCase>,
    pub jobs: Arc<dyn JobRepository>,
}

impl AppState {
    /// 组装仓库、领域服务和用例
    ///
    /// # 参数
    ///
    /// * `settings` - 应用配置
    /// * `db` - 数据库连接
    /// * `external` - 外部服务实现
    pub fn build(
        settings: Arc<Settings>,
        db: Arc<DatabaseConnection>,
        external: ExternalServices,
    ) -> Self {
        let accounts: Arc<dyn AccountRepository> = Arc::new(AccountRepositoryImpl::new(db.clone()));
        let sessions: Arc<dyn SessionRepository> = Arc::new(SessionRepositoryImpl::new(db.clone()));
        let organization_repo: Arc<dyn OrganizationRepository> =
            Arc::new(OrganizationRepositoryImpl::new(db.clone()));
        let links: Arc<dyn ClientLinkRepository> =
            Arc::new(ClientLinkRepositoryImpl::new(db.clone()));
        let task_repo: Arc<dyn TaskRepository> = Arc::new(TaskRepositoryImpl::new(db.clone()));
        let product_repo: Arc<dyn ProductRepository> =
            Arc::new(ProductRepositoryImpl::new(db.clone()));
        let catalog_repo: Arc<dyn CatalogRepository> =
            Arc::new(CatalogRepositoryImpl::new(db.clone()));
        let jobs: Arc<dyn JobRepository> = Arc::new(JobRepositoryImpl::new(db));

        let provisioning = Arc::new(ProvisioningService::new(organization_repo.clone()));
        let tasks = Arc::new(TaskService::new(
            task_repo.clone(),
            organization_repo.clone(),
            links.clone(),
            external.storage,
            settings.storage.max_upload_bytes,
        ));
        let products = Arc::new(ProductService::new(product_repo.clone(), jobs.clone()));
        let agent = Arc::new(ExtractionAgent::new(external.llm.clone()));

        Self {
            auth: Arc::new(AuthService::new(
                accounts.clone(),
                sessions,
                settings.auth.session_ttl_hours,
            )),
            identity: Arc::new(IdentityService::new(
                accounts.clone(),
                organization_repo.clone(),
                links.clone(),
            )),
            organizations: Arc::new(OrganizationService::new(
                accounts.clone(),
                organization_repo.clone(),
                links.clone(),
                settings.server.public_base_url.clone(),
            )),
            invites: Arc::new(InviteService::new(organization_repo.clone(), links)),
            catalog: Arc::new(CatalogService::new(catalog_repo.clone())),
            billing: Arc::new(BillingService::new(
                accounts.clone(),
                organization_repo,
                provisioning.clone(),
                external.payments,
                settings.billing.clone(),
            )),
            admin: Arc::new(AdminService::new(accounts, provisioning)),
            send_message: Arc::new(SendMessageUseCase::new(
                tasks.clone(),
                task_repo.clone(),
                catalog_repo,
                jobs.clone(),
                agent,
            )),
            compile_brief: Arc::new(CompileBriefUseCase::new(
                tasks.clone(),
                task_repo,
                jobs.clone(),
            )),
            analyze_product: Arc::new(AnalyzeProductUseCase::new(
                product_repo,
                external.site_fetcher,
                external.llm,
            )),
            list_jobs: Arc::new(ListJobsUseCase::new(
                tasks.clone(),
                products.clone(),
                jobs.clone(),
            )),
            tasks,
            products,
            jobs,
            settings,
        }
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use briefdesk::application::use_cases::analyze_product::SiteFetcher;
use briefdesk::config::settings::Settings;
use briefdesk::domain::services::llm_service::{
    Completion, CompletionRequest, LlmModel, LlmService, TokenUsage,
};
use briefdesk::domain::services::payment_gateway::{
    CheckoutRequest, CheckoutSession, PaymentGateway,
};
use briefdesk::infrastructure::database::connection;
use briefdesk::infrastructure::storage::InMemoryStorage;
use briefdesk::presentation::routes;
use briefdesk::presentation::state::{AppState, ExternalServices};
use briefdesk::utils::signature::signature_header;
use briefdesk::workers::JobWorker;
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

/// 模型桩：回复、字段提取和网站分析各自返回固定内容
pub struct StubLlm {
    pub reply: String,
    pub extraction: String,
    pub analysis: String,
    /// 每次调用前等待
    pub delay: Duration,
    /// 对话回复返回错误
    pub fail_replies: bool,
}

impl Default for StubLlm {
    fn default() -> Self {
        Self {
            reply: "Thanks! What is the deadline?".to_string(),
            extraction: "{}".to_string(),
            analysis: r#"{"category":"SaaS","guidelines":"Friendly and direct."}"#.to_string(),
            delay: Duration::ZERO,
            fail_replies: false,
        }
    }
}

#[async_trait]
impl LlmService for StubLlm {
    async fn complete(&self, request: CompletionRequest) -> anyhow::Result<Completion> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let content = match request.model {
            LlmModel::Summarizer => self.analysis.clone(),
            _ if request.json_response => self.extraction.clone(),
            _ if self.fail_replies => anyhow::bail!("model overloaded"),
            _ => self.reply.clone(),
        };
        Ok(Completion {
            content,
            usage: TokenUsage::default(),
        })
    }
}

struct StubPayments;

#[async_trait]
impl PaymentGateway for StubPayments {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> anyhow::Result<CheckoutSession> {
        Ok(CheckoutSession {
            id: format!("cs_test_{}", request.plan),
            url: format!("https://checkout.test/{}", request.account_id),
        })
    }
}

struct StubSiteFetcher;

#[async_trait]
impl SiteFetcher for StubSiteFetcher {
    async fn fetch_text(&self, url: &str) -> anyhow::Result<String> {
        Ok(format!("Welcome to {}\nWe build rockets for small teams.", url))
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<DatabaseConnection>,
    pub state: AppState,
    pub settings: Arc<Settings>,
    // 本地存储目录随测试结束删除
    _storage_dir: TempDir,
}

/// 已开通组织的服务商
#[allow(dead_code)]
pub struct Agency {
    pub token: String,
    pub account_id: Uuid,
    pub organization_id: Uuid,
    pub invite_code: String,
    pub customer_ref: String,
}

/// 客户账户
#[allow(dead_code)]
pub struct Client {
    pub token: String,
    pub account_id: Uuid,
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with_llm(StubLlm::default()).await
}

pub async fn create_test_app_with_llm(llm: StubLlm) -> TestApp {
    let storage_dir = tempfile::tempdir().unwrap();

    let mut settings = Settings::defaults().unwrap();
    settings.database.url = "sqlite::memory:".to_string();
    settings.storage.local_path = storage_dir.path().to_string_lossy().into_owned();
    let settings = Arc::new(settings);

    let db = connection::create_pool(&settings.database).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let db = Arc::new(db);

    let external = ExternalServices {
        llm: Arc::new(llm),
        payments: Arc::new(StubPayments),
        storage: Arc::new(InMemoryStorage::new()),
        site_fetcher: Arc::new(StubSiteFetcher),
    };
    let state = AppState::build(settings.clone(), db.clone(), external);
    let server = TestServer::new(routes::routes(state.clone())).unwrap();

    TestApp {
        server,
        db,
        state,
        settings,
        _storage_dir: storage_dir,
    }
}

impl TestApp {
    pub fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// 注册账户并返回令牌和账户 ID
    pub async fn signup(&self, email: &str, name: &str) -> (String, Uuid) {
        let response = self
            .server
            .post("/api/auth/signup")
            .json(&json!({
                "email": email,
                "password": "correct-horse-battery",
                "name": name,
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);

        let body: Value = response.json();
        let token = body["token"].as_str().unwrap().to_string();
        let account_id = Uuid::parse_str(body["account"]["id"].as_str().unwrap()).unwrap();
        (token, account_id)
    }

    /// 以正确签名投递 Webhook
    pub async fn deliver_webhook(&self, event: &Value) -> TestResponse {
        let payload = serde_json::to_vec(event).unwrap();
        let header = signature_header(
            &self.settings.billing.webhook_secret,
            Utc::now().timestamp(),
            &payload,
        );
        self.server
            .post("/api/billing/webhook")
            .add_header("stripe-signature", header)
            .add_header("content-type", "application/json")
            .bytes(Bytes::from(payload))
            .await
    }

    /// 注册服务商并通过结账 Webhook 开通组织
    pub async fn create_agency(&self, email: &str, organization_name: &str) -> Agency {
        let (token, account_id) = self.signup(email, organization_name).await;
        let customer_ref = format!("cus_{}", account_id.simple());

        let response = self
            .deliver_webhook(&checkout_completed(account_id, "monthly", organization_name, &customer_ref))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let organizations: Value = self
            .server
            .get("/api/organization")
            .add_header("Authorization", Self::bearer(&token))
            .await
            .json();
        let organization = &organizations["organizations"][0];

        Agency {
            token,
            account_id,
            organization_id: Uuid::parse_str(organization["id"].as_str().unwrap()).unwrap(),
            invite_code: organization["inviteCode"].as_str().unwrap().to_string(),
            customer_ref,
        }
    }

    /// 注册客户并兑换邀请码
    pub async fn create_client(&self, email: &str, invite_code: &str) -> Client {
        let (token, account_id) = self.signup(email, "Client").await;
        let response = self.redeem(&token, invite_code).await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        Client { token, account_id }
    }

    pub async fn redeem(&self, token: &str, invite_code: &str) -> TestResponse {
        self.server
            .post("/api/invites/redeem")
            .add_header("Authorization", Self::bearer(token))
            .json(&json!({ "code": invite_code }))
            .await
    }

    /// 以客户身份创建任务，返回任务 JSON
    pub async fn create_task(&self, token: &str, body: Value) -> Value {
        let response = self
            .server
            .post("/api/tasks")
            .add_header("Authorization", Self::bearer(token))
            .json(&body)
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json()
    }

    pub async fn subscription(&self, agency: &Agency) -> Value {
        let response = self
            .server
            .get("/api/billing/subscription")
            .add_header("Authorization", Self::bearer(&agency.token))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        response.json()
    }

    pub fn job_worker(&self) -> JobWorker {
        JobWorker::new(
            self.state.jobs.clone(),
            self.state.compile_brief.clone(),
            self.state.analyze_product.clone(),
            self.settings.jobs.clone(),
        )
    }
}

/// 支付完成事件
pub fn checkout_completed(
    account_id: Uuid,
    plan: &str,
    organization_name: &str,
    customer_ref: &str,
) -> Value {
    json!({
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": format!("cs_{}_{}", account_id.simple(), plan),
                "customer": customer_ref,
                "metadata": {
                    "accountId": account_id.to_string(),
                    "plan": plan,
                    "organizationName": organization_name,
                }
            }
        }
    })
}

/// 订阅取消事件
pub fn subscription_deleted(customer_ref: &str) -> Value {
    json!({
        "type": "customer.subscription.deleted",
        "data": { "object": { "customer": customer_ref } }
    })
}

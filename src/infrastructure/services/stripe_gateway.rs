// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use crate::config::settings::BillingSettings;
use crate::domain::services::payment_gateway::{CheckoutRequest, CheckoutSession, PaymentGateway};

/// Stripe 兼容的托管结账客户端
///
/// 通过 `POST /v1/checkout/sessions` 表单接口创建一次性付款会话，
/// 元数据带回 `accountId`、`plan` 和 `organizationName` 供 Webhook 使用
pub struct StripeGateway {
    client: reqwest::Client,
    api_base_url: String,
    secret_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

impl StripeGateway {
    pub fn new(settings: &BillingSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .context("Failed to build payment HTTP client")?;

        Ok(Self {
            client,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            secret_key: settings.secret_key.clone(),
        })
    }
}

fn checkout_form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "payment".to_string()),
        ("customer_creation", "always".to_string()),
        ("customer_email", request.customer_email.clone()),
        ("client_reference_id", request.account_id.to_string()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("line_items[0][quantity]", "1".to_string()),
        ("line_items[0][price_data][currency]", request.currency.clone()),
        (
            "line_items[0][price_data][unit_amount]",
            request.amount_cents.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            format!("{} plan: {}", request.plan, request.organization_name),
        ),
        ("metadata[accountId]", request.account_id.to_string()),
        ("metadata[plan]", request.plan.to_string()),
        ("metadata[organizationName]", request.organization_name.clone()),
    ]
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        let secret_key = self
            .secret_key
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("payment secret key not configured"))?;

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base_url))
            .bearer_auth(secret_key)
            .form(&checkout_form(request))
            .send()
            .await
            .context("Failed to reach payment provider")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "payment provider returned error: {} - {}",
                status,
                error_text
            ));
        }

        let session: SessionResponse = response
            .json()
            .await
            .context("Failed to parse checkout session")?;
        let url = session
            .url
            .ok_or_else(|| anyhow::anyhow!("checkout session has no url"))?;

        info!(session_id = %session.id, plan = %request.plan, "checkout session created");
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;
    use crate::domain::models::organization::PlanTier;
    use uuid::Uuid;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            account_id: Uuid::nil(),
            customer_email: "owner@studio.test".into(),
            plan: PlanTier::Quarterly,
            organization_name: "Studio".into(),
            amount_cents: 12900,
            currency: "usd".into(),
            success_url: "http://localhost/ok".into(),
            cancel_url: "http://localhost/cancel".into(),
        }
    }

    fn gateway(server: &MockServer, key: Option<&str>) -> StripeGateway {
        let mut settings = Settings::defaults().unwrap().billing;
        settings.api_base_url = server.uri();
        settings.secret_key = key.map(str::to_string);
        StripeGateway::new(&settings).unwrap()
    }

    #[tokio::test]
    async fn test_creates_session_with_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("authorization", "Bearer sk_test"))
            .and(body_string_contains("metadata%5Bplan%5D=quarterly"))
            .and(body_string_contains("unit_amount%5D=12900"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_1",
                "url": "https://checkout.example.com/cs_test_1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = gateway(&server, Some("sk_test"))
            .create_checkout_session(&request())
            .await
            .unwrap();

        assert_eq!(
            session,
            CheckoutSession {
                id: "cs_test_1".into(),
                url: "https://checkout.example.com/cs_test_1".into()
            }
        );
    }

    #[tokio::test]
    async fn test_provider_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(402).set_body_string("card_declined"))
            .mount(&server)
            .await;

        let err = gateway(&server, Some("sk_test"))
            .create_checkout_session(&request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("402"));
    }

    #[tokio::test]
    async fn test_missing_secret_key() {
        let server = MockServer::start().await;
        let err = gateway(&server, None)
            .create_checkout_session(&request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}

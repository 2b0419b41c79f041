// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::identity_service::CallerContext;
use super::payment_gateway::{CheckoutRequest, CheckoutSession, PaymentGateway};
use super::provisioning_service::ProvisioningService;
use crate::config::settings::BillingSettings;
use crate::domain::models::account::Role;
use crate::domain::models::organization::{PlanTier, Subscription, SubscriptionStatus};
use crate::domain::repositories::account_repository::AccountRepository;
use crate::domain::repositories::organization_repository::OrganizationRepository;
use crate::utils::errors::{ServiceError, ServiceResult};
use crate::utils::signature::verify_signature;

/// Webhook 时间戳允许的偏差
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// 订阅概况
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSummary {
    pub organization_id: Uuid,
    pub plan: PlanTier,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub client_count: i32,
    pub is_active: bool,
    /// 按客户增量计费的应付金额（分）
    pub per_client_amount_due: i64,
    pub currency: String,
}

/// Webhook 处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// 已开通或续期
    Provisioned { organization_id: Uuid },
    /// 按客户标识取消，附带受影响的订阅数
    Cancelled { affected: u64 },
    /// 同一结账会话已处理过
    Duplicate,
    /// 不关心的事件类型
    Ignored,
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    kind: String,
    data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
struct WebhookEventData {
    object: Value,
}

/// 计费服务
///
/// 结账、Webhook 和订阅查询都经过这里
pub struct BillingService {
    accounts: Arc<dyn AccountRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    provisioning: Arc<ProvisioningService>,
    gateway: Arc<dyn PaymentGateway>,
    settings: BillingSettings,
}

impl BillingService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        provisioning: Arc<ProvisioningService>,
        gateway: Arc<dyn PaymentGateway>,
        settings: BillingSettings,
    ) -> Self {
        Self {
            accounts,
            organizations,
            provisioning,
            gateway,
            settings,
        }
    }

    /// 套餐价格（分）
    pub fn plan_price_cents(&self, plan: PlanTier) -> Option<i64> {
        match plan {
            PlanTier::Demo => None,
            PlanTier::Monthly => Some(self.settings.monthly_price_cents),
            PlanTier::Quarterly => Some(self.settings.quarterly_price_cents),
            PlanTier::SemiAnnual => Some(self.settings.semi_annual_price_cents),
            PlanTier::Annual => Some(self.settings.annual_price_cents),
        }
    }

    /// 创建托管结账会话
    ///
    /// # 参数
    ///
    /// * `caller` - 调用方
    /// * `plan` - 付费套餐，演示套餐不可购买
    /// * `organization_name` - 开通时使用的组织名称，为空时使用账户默认名称
    pub async fn start_checkout(
        &self,
        caller: &CallerContext,
        plan: PlanTier,
        organization_name: Option<&str>,
    ) -> ServiceResult<CheckoutSession> {
        let amount_cents = self
            .plan_price_cents(plan)
            .ok_or_else(|| ServiceError::validation("plan: demo plan is not purchasable"))?;

        let organization_name = organization_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| caller.account.default_organization_name());

        let request = CheckoutRequest {
            account_id: caller.account_id(),
            customer_email: caller.account.email.clone(),
            plan,
            organization_name,
            amount_cents,
            currency: self.settings.currency.clone(),
            success_url: self.settings.success_url.clone(),
            cancel_url: self.settings.cancel_url.clone(),
        };

        let session = self
            .gateway
            .create_checkout_session(&request)
            .await
            .map_err(|e| {
                error!(account_id = %caller.account_id(), error = ?e, "checkout session creation failed");
                ServiceError::Upstream("payment provider unavailable".to_string())
            })?;

        info!(account_id = %caller.account_id(), plan = %plan, session_id = %session.id, "checkout started");
        Ok(session)
    }

    /// 处理支付处理方的 Webhook
    ///
    /// 签名校验在解析和任何修改之前完成
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: DateTime<Utc>,
    ) -> ServiceResult<WebhookOutcome> {
        let header = signature.ok_or_else(|| ServiceError::validation("invalid signature"))?;
        if let Err(e) = verify_signature(
            &self.settings.webhook_secret,
            payload,
            header,
            now.timestamp(),
            SIGNATURE_TOLERANCE_SECS,
        ) {
            warn!(reason = %e, "webhook signature rejected");
            counter!("billing_webhooks_total", "outcome" => "rejected").increment(1);
            return Err(ServiceError::validation("invalid signature"));
        }

        let event: WebhookEvent = serde_json::from_slice(payload)
            .map_err(|_| ServiceError::validation("malformed event payload"))?;

        let outcome = match event.kind.as_str() {
            "checkout.session.completed" => self.complete_checkout(&event.data.object, now).await?,
            "customer.subscription.deleted" | "invoice.payment_failed" => {
                self.cancel(&event.data.object).await?
            }
            other => {
                info!(event_type = %other, "webhook event ignored");
                WebhookOutcome::Ignored
            }
        };

        counter!("billing_webhooks_total", "outcome" => "accepted").increment(1);
        Ok(outcome)
    }

    /// 服务商的订阅概况
    pub async fn subscription_summary(
        &self,
        caller: &CallerContext,
        now: DateTime<Utc>,
    ) -> ServiceResult<SubscriptionSummary> {
        if caller.is_client() {
            return Err(ServiceError::forbidden(
                "only service providers have subscriptions",
            ));
        }
        let organization_id = caller
            .primary_organization()
            .ok_or_else(|| ServiceError::not_found("organization"))?;
        let subscription = self
            .organizations
            .find_subscription(organization_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("subscription"))?;

        Ok(self.summarize(&subscription, now))
    }

    fn summarize(&self, subscription: &Subscription, now: DateTime<Utc>) -> SubscriptionSummary {
        SubscriptionSummary {
            organization_id: subscription.organization_id,
            plan: subscription.plan,
            status: subscription.status,
            current_period_start: subscription.current_period_start,
            current_period_end: subscription.current_period_end,
            client_count: subscription.client_count,
            is_active: subscription.is_active_at(now),
            per_client_amount_due: i64::from(subscription.client_count)
                * self.settings.per_client_fee_cents,
            currency: self.settings.currency.clone(),
        }
    }

    async fn complete_checkout(
        &self,
        object: &Value,
        now: DateTime<Utc>,
    ) -> ServiceResult<WebhookOutcome> {
        // 会话标识缺失时无法去重，照常处理
        let Some(session_id) = object["id"].as_str().filter(|id| !id.is_empty()) else {
            warn!("checkout event without session id");
            return self.provision_from_checkout(object, now).await;
        };

        if !self
            .organizations
            .claim_billing_event(session_id, "checkout.session.completed", now)
            .await?
        {
            info!(%session_id, "duplicate checkout event ignored");
            return Ok(WebhookOutcome::Duplicate);
        }

        match self.provision_from_checkout(object, now).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                if let Err(release) = self.organizations.release_billing_event(session_id).await {
                    error!(%session_id, error = %release, "could not release checkout event");
                }
                Err(e)
            }
        }
    }

    async fn provision_from_checkout(
        &self,
        object: &Value,
        now: DateTime<Utc>,
    ) -> ServiceResult<WebhookOutcome> {
        let metadata = &object["metadata"];
        let account_id = metadata["accountId"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| ServiceError::validation("metadata.accountId is missing"))?;
        let plan: PlanTier = metadata["plan"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .filter(PlanTier::is_purchasable)
            .ok_or_else(|| ServiceError::validation("metadata.plan is invalid"))?;
        let organization_name = metadata["organizationName"].as_str().unwrap_or_default();
        let customer_ref = object["customer"].as_str().map(str::to_string);

        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("account"))?;

        // 管理员保持原角色
        let account = if account.is_master_admin() || account.role == Role::ServiceProvider {
            account
        } else {
            self.accounts
                .update_role(account.id, Role::ServiceProvider)
                .await?
        };

        let provisioned = self
            .provisioning
            .ensure_provisioned(&account, organization_name, plan, customer_ref, now)
            .await?;

        info!(
            account_id = %account.id,
            organization_id = %provisioned.organization.id,
            plan = %plan,
            "checkout completed"
        );
        Ok(WebhookOutcome::Provisioned {
            organization_id: provisioned.organization.id,
        })
    }

    async fn cancel(&self, object: &Value) -> ServiceResult<WebhookOutcome> {
        let customer_ref = object["customer"]
            .as_str()
            .ok_or_else(|| ServiceError::validation("customer is missing"))?;
        let affected = self.organizations.cancel_by_customer(customer_ref).await?;
        if affected == 0 {
            warn!(%customer_ref, "cancellation for unknown customer");
        } else {
            info!(%customer_ref, affected, "subscription cancelled");
        }
        Ok(WebhookOutcome::Cancelled { affected })
    }
}

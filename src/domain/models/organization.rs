// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ParseEnumError;

/// 组织（租户边界），由一个服务商账户拥有
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub slug: String,
    /// 形如 `SVC-XXXXX` 的对外标识
    pub service_id: String,
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// 邀请链接由配置的基础 URL 派生，不落库
    pub fn invite_link(&self, public_base_url: &str) -> String {
        format!(
            "{}/join/{}",
            public_base_url.trim_end_matches('/'),
            self.invite_code
        )
    }
}

/// 套餐档位，每档对应固定时长
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    /// 演示套餐，固定 6 个月
    Demo,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Demo => "demo",
            PlanTier::Monthly => "monthly",
            PlanTier::Quarterly => "quarterly",
            PlanTier::SemiAnnual => "semi_annual",
            PlanTier::Annual => "annual",
        }
    }

    /// 套餐时长（月）
    pub fn term_months(&self) -> u32 {
        match self {
            PlanTier::Demo => 6,
            PlanTier::Monthly => 1,
            PlanTier::Quarterly => 3,
            PlanTier::SemiAnnual => 6,
            PlanTier::Annual => 12,
        }
    }

    /// 演示套餐只能由管理员授予
    pub fn is_purchasable(&self) -> bool {
        !matches!(self, PlanTier::Demo)
    }

    /// 从 `start` 起算的计费周期结束时间
    pub fn period_end(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start
            .checked_add_months(Months::new(self.term_months()))
            .unwrap_or_else(|| start + chrono::Duration::days(30 * self.term_months() as i64))
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "demo" => Ok(PlanTier::Demo),
            "monthly" => Ok(PlanTier::Monthly),
            "quarterly" => Ok(PlanTier::Quarterly),
            "semi_annual" => Ok(PlanTier::SemiAnnual),
            "annual" => Ok(PlanTier::Annual),
            other => Err(ParseEnumError::new("plan", other)),
        }
    }
}

/// 订阅状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            other => Err(ParseEnumError::new("subscription status", other)),
        }
    }
}

/// 订阅，与组织一对一
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub plan: PlanTier,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    /// 按客户增量计费使用的计数，永不为负
    pub client_count: i32,
    /// 支付处理方的客户标识
    pub customer_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// 为组织开启一个新周期的订阅
    pub fn start(
        organization_id: Uuid,
        plan: PlanTier,
        customer_ref: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            plan,
            status: SubscriptionStatus::Active,
            current_period_start: now,
            current_period_end: plan.period_end(now),
            client_count: 0,
            customer_ref,
            created_at: now,
            updated_at: now,
        }
    }

    /// 过期只是时间比较，没有定时任务
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && now < self.current_period_end
    }
}

/// 订阅缺失时视为未激活
pub fn subscription_is_active(subscription: Option<&Subscription>, now: DateTime<Utc>) -> bool {
    subscription.is_some_and(|s| s.is_active_at(now))
}

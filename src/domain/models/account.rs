// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ParseEnumError;

/// 账户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// 客户，通过邀请码加入服务商组织
    #[default]
    Client,
    /// 服务商，拥有一个组织
    ServiceProvider,
    /// 平台管理员
    MasterAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::ServiceProvider => "service_provider",
            Role::MasterAdmin => "master_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "service_provider" => Ok(Role::ServiceProvider),
            "master_admin" => Ok(Role::MasterAdmin),
            other => Err(ParseEnumError::new("role", other)),
        }
    }
}

/// 账户实体
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    /// 小写邮箱，全局唯一
    pub email: String,
    pub name: String,
    /// 存储的角色字符串
    pub role: Role,
    /// 管理员覆盖标志，优先于存储的角色
    pub is_master_admin: bool,
    pub company_name: Option<String>,
    /// Argon2id PHC 字符串，委托登录创建的账户没有本地密码
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// 创建新的客户账户
    pub fn new_client(
        email: &str,
        name: String,
        company_name: Option<String>,
        password_hash: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            name,
            role: Role::Client,
            is_master_admin: false,
            company_name,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// 是否拥有管理员权限（标志位或角色任一成立）
    pub fn is_master_admin(&self) -> bool {
        self.is_master_admin || self.role == Role::MasterAdmin
    }

    /// 实际生效的角色
    pub fn effective_role(&self) -> Role {
        if self.is_master_admin() {
            Role::MasterAdmin
        } else {
            self.role
        }
    }

    /// 组织默认名称：公司名优先，否则使用显示名
    pub fn default_organization_name(&self) -> String {
        self.company_name
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// 邮箱统一为去空白的小写形式
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 登录会话
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub account_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

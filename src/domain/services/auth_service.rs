// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::models::account::{normalize_email, Account, Session};
use crate::domain::repositories::account_repository::{AccountRepository, SessionRepository};
use crate::domain::repositories::RepositoryError;
use crate::utils::errors::{ServiceError, ServiceResult};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::tokens::generate_session_token;

/// 注册信息
#[derive(Debug, Clone)]
pub struct Signup {
    pub email: String,
    pub password: String,
    pub name: String,
    pub company_name: Option<String>,
}

/// 认证服务
///
/// 本地邮箱密码登录，会话令牌不透明且存储在数据库中
pub struct AuthService {
    accounts: Arc<dyn AccountRepository>,
    sessions: Arc<dyn SessionRepository>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        sessions: Arc<dyn SessionRepository>,
        session_ttl_hours: i64,
    ) -> Self {
        Self {
            accounts,
            sessions,
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    /// 注册客户账户并登录
    ///
    /// 新账户一律是客户，服务商身份只能通过付费或管理员授予
    pub async fn signup(
        &self,
        signup: Signup,
        now: DateTime<Utc>,
    ) -> ServiceResult<(Account, Session)> {
        let email = normalize_email(&signup.email);
        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("email already registered".to_string()));
        }

        let password_hash = hash_password(&signup.password).map_err(|e| {
            error!(error = %e, "password hashing failed");
            ServiceError::Upstream("could not create account".to_string())
        })?;

        let company_name = signup
            .company_name
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let account = Account::new_client(
            &email,
            signup.name.trim().to_string(),
            company_name,
            Some(password_hash),
        );

        let account = match self.accounts.create(&account).await {
            Ok(account) => account,
            Err(RepositoryError::Conflict(_)) => {
                return Err(ServiceError::Conflict("email already registered".to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let session = self.open_session(account.id, now).await?;
        info!(account_id = %account.id, "account registered");
        counter!("signups_total").increment(1);
        Ok((account, session))
    }

    /// 邮箱密码登录
    ///
    /// 邮箱不存在和密码错误返回相同的消息
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<(Account, Session)> {
        let account = self
            .accounts
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        let verified = match account.password_hash.as_deref() {
            Some(hash) => verify_password(password, hash).unwrap_or_else(|e| {
                error!(account_id = %account.id, error = %e, "stored password hash unusable");
                false
            }),
            None => false,
        };
        if !verified {
            counter!("login_failures_total").increment(1);
            return Err(ServiceError::InvalidCredentials);
        }

        let session = self.open_session(account.id, now).await?;
        info!(account_id = %account.id, "account logged in");
        Ok((account, session))
    }

    pub async fn logout(&self, token: &str) -> ServiceResult<()> {
        self.sessions.delete(token).await?;
        Ok(())
    }

    /// 会话令牌对应的账户
    pub async fn authenticate(&self, token: &str, now: DateTime<Utc>) -> ServiceResult<Uuid> {
        self.sessions
            .find_valid(token, now)
            .await?
            .map(|s| s.account_id)
            .ok_or(ServiceError::Unauthenticated)
    }

    async fn open_session(&self, account_id: Uuid, now: DateTime<Utc>) -> ServiceResult<Session> {
        let session = Session {
            token: generate_session_token(),
            account_id,
            expires_at: now + self.session_ttl,
            created_at: now,
        };
        self.sessions.create(&session).await?;
        Ok(session)
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::domain::services::identity_service::CallerContext;
use crate::presentation::errors::AppError;
use crate::presentation::state::AppState;
use crate::utils::errors::ServiceError;

/// 认证中间件写入请求扩展的会话信息
#[derive(Debug, Clone)]
pub struct SessionAccount {
    pub account_id: Uuid,
    pub token: String,
}

/// 已解析的调用方
///
/// 每个请求重新解析角色和组织范围，角色变更立即生效
pub struct Caller(pub CallerContext);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<SessionAccount>()
            .cloned()
            .ok_or(ServiceError::Unauthenticated)?;
        let state = parts
            .extensions
            .get::<AppState>()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("application state missing from request"))?;

        let context = state.identity.resolve(session.account_id).await?;
        Ok(Caller(context))
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use crate::presentation::errors::AppError;
use crate::presentation::extractors::caller::SessionAccount;
use crate::presentation::state::AppState;
use crate::utils::errors::ServiceError;

/// 认证中间件
///
/// 校验 `Authorization: Bearer <token>` 会话令牌，
/// 成功后把会话账户写入请求扩展
///
/// # 参数
///
/// * `state` - 应用状态
/// * `req` - HTTP请求
/// * `next` - 下一个中间件
///
/// # 返回值
///
/// * `Ok(Response)` - 认证成功的响应
/// * `Err(AppError)` - 缺少或无效的令牌，返回 401
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or(ServiceError::Unauthenticated)?
        .to_string();

    let account_id = state.auth.authenticate(&token, Utc::now()).await?;
    debug!(%account_id, path = %req.uri().path(), "session authenticated");

    req.extensions_mut().insert(SessionAccount { account_id, token });
    Ok(next.run(req).await)
}

/// 提取 Bearer 令牌，前缀大小写不敏感
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
#[path = "auth_middleware_test.rs"]
mod tests;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Extension, http::StatusCode, Json};
use chrono::Utc;
use validator::Validate;

use crate::application::dto::auth_request::{
    AuthResponseDto, LoginRequestDto, MeResponseDto, SignupRequestDto,
};
use crate::domain::services::auth_service::Signup;
use crate::presentation::errors::{validation_failure, AppError};
use crate::presentation::extractors::caller::{Caller, SessionAccount};
use crate::presentation::state::AppState;

/// 注册客户账户
pub async fn signup(
    Extension(state): Extension<AppState>,
    Json(request): Json<SignupRequestDto>,
) -> Result<(StatusCode, Json<AuthResponseDto>), AppError> {
    request.validate().map_err(|e| validation_failure(&e))?;

    let (account, session) = state
        .auth
        .signup(
            Signup {
                email: request.email,
                password: request.password,
                name: request.name,
                company_name: request.company_name,
            },
            Utc::now(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponseDto {
            token: session.token,
            expires_at: session.expires_at,
            account,
        }),
    ))
}

/// 邮箱密码登录
pub async fn login(
    Extension(state): Extension<AppState>,
    Json(request): Json<LoginRequestDto>,
) -> Result<Json<AuthResponseDto>, AppError> {
    request.validate().map_err(|e| validation_failure(&e))?;

    let (account, session) = state
        .auth
        .login(&request.email, &request.password, Utc::now())
        .await?;

    Ok(Json(AuthResponseDto {
        token: session.token,
        expires_at: session.expires_at,
        account,
    }))
}

/// 注销当前会话
pub async fn logout(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionAccount>,
) -> Result<StatusCode, AppError> {
    state.auth.logout(&session.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 当前调用方的账户、角色和组织范围
pub async fn me(Caller(caller): Caller) -> Json<MeResponseDto> {
    let organization_ids = caller.organization_ids().map(<[_]>::to_vec);
    let primary_organization_id = caller.primary_organization();
    Json(MeResponseDto {
        role: caller.role,
        organization_ids,
        primary_organization_id,
        account: caller.account,
    })
}

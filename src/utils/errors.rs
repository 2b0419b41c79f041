// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

use crate::domain::repositories::RepositoryError;

/// 服务层错误类型
///
/// 每个变体对应一种 HTTP 状态，由表示层统一映射
#[derive(Error, Debug)]
pub enum ServiceError {
    /// 没有有效会话
    #[error("authentication required")]
    Unauthenticated,

    /// 登录失败，不区分邮箱不存在和密码错误
    #[error("invalid email or password")]
    InvalidCredentials,

    /// 身份已确认但没有权限
    #[error("{0}")]
    Forbidden(String),

    /// 实体不存在，或不在调用方的租户范围内
    #[error("{0}")]
    NotFound(String),

    /// 输入缺失或格式错误，消息中包含出错的字段名
    #[error("{0}")]
    Validation(String),

    /// 与现有状态冲突
    #[error("{0}")]
    Conflict(String),

    /// 第三方服务失败
    #[error("{0}")]
    Upstream(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self {
        ServiceError::NotFound(format!("{} not found", entity))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }
}

/// 服务层结果类型
pub type ServiceResult<T> = Result<T, ServiceError>;

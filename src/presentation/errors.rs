// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use validator::ValidationErrors;

use crate::domain::repositories::RepositoryError;
use crate::utils::errors::ServiceError;

const INTERNAL_MESSAGE: &str = "internal server error";

/// 应用错误类型
///
/// 封装处理器中的所有错误，响应体统一为 `{"error": "<message>"}`
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    /// 状态码和对外消息；5xx 不暴露内部细节
    fn classify(&self) -> (StatusCode, String) {
        if let Some(err) = self.0.downcast_ref::<ServiceError>() {
            return match err {
                ServiceError::Unauthenticated | ServiceError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, err.to_string())
                }
                ServiceError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
                ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                ServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                ServiceError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
                ServiceError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
                ServiceError::Repository(repo) => repository_status(repo),
            };
        }
        if let Some(repo) = self.0.downcast_ref::<RepositoryError>() {
            return repository_status(repo);
        }
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
    }
}

fn repository_status(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
        RepositoryError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        RepositoryError::Database(_) | RepositoryError::Corrupt(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            INTERNAL_MESSAGE.to_string(),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.classify();
        if status.is_server_error() {
            error!(error = ?self.0, "request failed");
        }

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// 校验失败转换为 400，消息列出出错的字段（camelCase）
pub fn validation_failure(errors: &ValidationErrors) -> ServiceError {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|field| camel_case(field))
        .collect();
    fields.sort();
    ServiceError::validation(format!("invalid fields: {}", fields.join(", ")))
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

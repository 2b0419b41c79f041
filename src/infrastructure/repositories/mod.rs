// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::{ColumnTrait, Condition, DbErr, SqlErr};
use std::str::FromStr;

use crate::domain::models::ParseEnumError;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::tenancy::TenancyFilter;

/// 仓库实现模块
///
/// 基于 SeaORM 实现领域层定义的仓库接口
pub mod account_repo_impl;
pub mod catalog_repo_impl;
pub mod client_link_repo_impl;
pub mod job_repo_impl;
pub mod organization_repo_impl;
pub mod product_repo_impl;
pub mod task_repo_impl;

/// 唯一约束冲突映射为 `Conflict`，其他错误原样保留
pub(crate) fn conflict_on_unique(err: DbErr, message: &str) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            RepositoryError::Conflict(message.to_string())
        }
        _ => RepositoryError::Database(err),
    }
}

/// 解析以字符串存储的枚举列
pub(crate) fn parse_column<T>(value: &str) -> Result<T, RepositoryError>
where
    T: FromStr<Err = ParseEnumError>,
{
    value
        .parse()
        .map_err(|e: ParseEnumError| RepositoryError::Corrupt(e.to_string()))
}

/// 把租户过滤条件转换为查询条件
///
/// # 返回值
///
/// `None` 表示范围为空，调用方应直接返回空集
pub(crate) fn tenancy_condition<C: ColumnTrait>(
    filter: &TenancyFilter,
    owner_column: C,
    organization_column: C,
) -> Option<Condition> {
    match filter {
        TenancyFilter::Unrestricted => Some(Condition::all()),
        TenancyFilter::Empty => None,
        TenancyFilter::Organizations(ids) => {
            Some(Condition::all().add(organization_column.is_in(ids.iter().copied())))
        }
        TenancyFilter::OwnedWithin {
            owner_id,
            organization_ids,
        } => Some(
            Condition::all()
                .add(owner_column.eq(*owner_id))
                .add(organization_column.is_in(organization_ids.iter().copied())),
        ),
    }
}

/// JSON 数组列转换为字符串列表，非字符串元素被忽略
pub(crate) fn json_strings(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn strings_json(values: &[String]) -> serde_json::Value {
    serde_json::Value::Array(
        values
            .iter()
            .map(|v| serde_json::Value::String(v.clone()))
            .collect(),
    )
}


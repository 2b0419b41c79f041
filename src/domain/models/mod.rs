// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 领域模型
///
/// 账户、组织与订阅、客户关系、任务与对话、产品、目录和后台任务
pub mod account;
pub mod asset;
pub mod catalog;
pub mod client_link;
pub mod job;
pub mod message;
pub mod organization;
pub mod product;
pub mod task;

/// 存储中的枚举字符串无法识别
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

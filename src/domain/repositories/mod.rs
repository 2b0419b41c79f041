// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::DbErr;
use thiserror::Error;

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 具体实现由基础设施层基于 SeaORM 提供。
///
/// 包含的仓库接口：
/// - 账户仓库（account_repository）：账户与登录会话
/// - 组织仓库（organization_repository）：组织与订阅
/// - 客户关系仓库（client_link_repository）：邀请兑换与解除
/// - 任务仓库（task_repository）：任务、对话和附件
/// - 产品仓库（product_repository）
/// - 目录仓库（catalog_repository）：价格规则与服务项
/// - 后台任务仓库（job_repository）
/// - 存储仓库（storage_repository）：文件存储层级
pub mod account_repository;
pub mod catalog_repository;
pub mod client_link_repository;
pub mod job_repository;
pub mod organization_repository;
pub mod product_repository;
pub mod storage_repository;
pub mod task_repository;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 唯一约束冲突
    #[error("Conflict: {0}")]
    Conflict(String),
    /// 存储的数据无法转换为领域模型
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

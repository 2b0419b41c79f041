// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 请求 DTO 以及跨多个领域服务的用例（对话、简报编译、产品分析）
pub mod application;

/// 配置模块
///
/// 依次叠加 `config/default.toml`、按 `APP_ENVIRONMENT` 选择的配置文件和 `BRIEFDESK__` 前缀环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、服务和仓库接口
pub mod domain;

/// 基础设施模块
///
/// 提供外部服务集成，如数据库、存储、生成式模型和支付处理方
pub mod infrastructure;

/// 表示层模块
///
/// axum 路由、处理器、会话认证中间件和调用方提取器
pub mod presentation;

/// 工具模块
///
/// 错误类型、密码哈希、Webhook 签名、令牌生成和日志初始化
pub mod utils;

/// 工作器模块
///
/// 实现后台任务处理和过期会话清理
pub mod workers;

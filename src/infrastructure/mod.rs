// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，负责与外部系统交互。
///
/// 包含的子模块：
/// - 数据库（database）：连接池和 SeaORM 实体
/// - 指标（metrics）：Prometheus 导出与指标描述
/// - 仓库实现（repositories）：领域仓库接口的具体实现
/// - 外部服务（services）：生成式模型、支付处理方和网站抓取
/// - 存储（storage）：文档同步、S3 和本地磁盘三层文件存储
///
/// 基础设施层依赖领域层的抽象接口，领域层不感知具体实现。
pub mod database;
pub mod metrics;
pub mod repositories;
pub mod services;
pub mod storage;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：账户、组织、任务等业务实体
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 服务（services）：租户规则、对话提取、简报编译和计费
///
/// 领域层不依赖任何外部实现，调用方上下文由表示层显式传入。
pub mod models;
pub mod repositories;
pub mod services;

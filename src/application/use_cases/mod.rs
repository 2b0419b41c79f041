// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 用例模块
///
/// 跨越多个仓库和外部服务的业务流程：对话轮次、简报编译、
/// 产品分析和后台任务查询
pub mod analyze_product;
pub mod compile_brief;
pub mod list_jobs;
pub mod send_message;

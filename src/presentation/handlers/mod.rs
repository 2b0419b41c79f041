// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP请求处理器模块
///
/// 每个处理器解析请求、取得调用方上下文，然后交给领域服务或用例
pub mod admin_handler;
pub mod auth_handler;
pub mod billing_handler;
pub mod catalog_handler;
pub mod job_handler;
pub mod organization_handler;
pub mod product_handler;
pub mod task_handler;

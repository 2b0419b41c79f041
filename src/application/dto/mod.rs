// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据传输对象模块
///
/// 定义 API 请求和响应的数据结构，请求体使用 `validator` 校验
pub mod auth_request;
pub mod organization_request;
pub mod task_request;

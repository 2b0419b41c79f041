// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 请求/响应 DTO 以及编排领域服务的用例
pub mod dto;
pub mod use_cases;

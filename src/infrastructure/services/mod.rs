// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 外部服务实现
///
/// 生成式模型、支付处理方和网站抓取的 HTTP 客户端
pub mod openai_llm_service;
pub mod site_fetcher;
pub mod stripe_gateway;

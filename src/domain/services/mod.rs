// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含系统的核心业务规则：
/// - 身份解析（identity_service）与租户过滤（tenancy）
/// - 组织开通（provisioning_service）、邀请（invite_service）和组织管理（organization_service）
/// - 任务（task_service）、产品（product_service）和目录（catalog_service）
/// - 对话提取（extraction_service）及其纯函数规则：截止时间（deadline）和报价（pricing）
/// - 简报编译（brief_compiler）
/// - 计费（billing_service）、认证（auth_service）和管理员（admin_service）
///
/// 生成式模型（llm_service）和支付处理方（payment_gateway）以特质的形式定义，
/// 由基础设施层实现。
pub mod admin_service;
pub mod auth_service;
pub mod billing_service;
pub mod brief_compiler;
pub mod catalog_service;
pub mod deadline;
pub mod extraction_service;
pub mod identity_service;
pub mod invite_service;
pub mod llm_service;
pub mod organization_service;
pub mod payment_gateway;
pub mod pricing;
pub mod product_service;
pub mod provisioning_service;
pub mod task_service;
pub mod tenancy;

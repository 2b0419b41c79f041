// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库实体模块
///
/// 每张表对应一个 SeaORM 实体，枚举列以字符串存储，
/// 转换为领域模型的逻辑位于各仓库实现中
pub mod account;
pub mod asset;
pub mod billing_event;
pub mod client_link;
pub mod job;
pub mod message;
pub mod organization;
pub mod pricing_rule;
pub mod product;
pub mod service_offering;
pub mod session;
pub mod subscription;
pub mod task;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 后台任务处理（简报编译、产品分析）和过期会话清理
pub mod expiration_worker;
pub mod job_worker;

pub use expiration_worker::ExpirationWorker;
pub use job_worker::JobWorker;

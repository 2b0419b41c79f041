// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::domain::repositories::account_repository::SessionRepository;
use crate::domain::repositories::RepositoryError;

/// 过期会话清理工作器
///
/// 负责定期删除已过期的登录会话
pub struct ExpirationWorker {
    sessions: Arc<dyn SessionRepository>,
    interval: Duration,
}

impl ExpirationWorker {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self {
            sessions,
            interval: Duration::from_secs(60 * 60), // 每小时运行一次
        }
    }

    /// 运行工作器
    pub async fn run(&self) {
        info!("session expiration worker started");

        let mut interval = tokio::time::interval(self.interval);

        loop {
            interval.tick().await;

            match self.sweep().await {
                Ok(count) if count > 0 => info!(count, "expired sessions removed"),
                Ok(_) => {}
                Err(e) => error!(error = %e, "failed to remove expired sessions"),
            }
        }
    }

    /// 启动后台运行
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// 删除当前已过期的会话
    pub async fn sweep(&self) -> Result<u64, RepositoryError> {
        self.sessions.delete_expired(Utc::now()).await
    }
}

#[cfg(test)]
#[path = "expiration_worker_test.rs"]
mod tests;

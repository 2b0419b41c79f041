// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::models::job::{Job, JobKind};

/// 回收长时间运行中任务的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaleJobs {
    /// 放回队列
    pub requeued: u64,
    /// 尝试次数已用完，标记为失败
    pub failed: u64,
}

/// 后台任务仓库特质
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// 入队；同一实体同类型已有待处理任务时直接返回该任务
    async fn enqueue(&self, kind: JobKind, entity_id: Uuid) -> Result<Job, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError>;
    /// 领取最多 `limit` 个待处理任务并置为运行中，尝试次数加一
    async fn claim_batch(&self, limit: u64) -> Result<Vec<Job>, RepositoryError>;
    async fn mark_succeeded(&self, id: Uuid) -> Result<(), RepositoryError>;
    /// 标记失败；`retry` 为真时回到待处理
    async fn mark_failed(&self, id: Uuid, error: &str, retry: bool) -> Result<(), RepositoryError>;
    /// 实体的全部任务，按创建时间倒序
    async fn list_for_entity(&self, entity_id: Uuid) -> Result<Vec<Job>, RepositoryError>;
    /// 回收长时间处于运行中的任务
    ///
    /// 尝试次数达到 `max_attempts` 的任务标记为失败，其余放回队列
    async fn requeue_stale(
        &self,
        older_than_secs: i64,
        max_attempts: i32,
    ) -> Result<StaleJobs, RepositoryError>;
}

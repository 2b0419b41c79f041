// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::models::job::{Job, JobKind};
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::task_repository::TaskRepository;
use crate::domain::services::brief_compiler::compile_brief;
use crate::domain::services::identity_service::CallerContext;
use crate::domain::services::task_service::TaskService;
use crate::utils::errors::{ServiceError, ServiceResult};

/// 编译好的简报
#[derive(Debug, Clone)]
pub struct CompiledBrief {
    pub task_id: Uuid,
    pub brief: String,
    pub generated_at: DateTime<Utc>,
}

/// 简报编译用例
///
/// 后台任务和按需读取共用同一套编译逻辑
pub struct CompileBriefUseCase {
    task_service: Arc<TaskService>,
    tasks: Arc<dyn TaskRepository>,
    jobs: Arc<dyn JobRepository>,
}

impl CompileBriefUseCase {
    pub fn new(
        task_service: Arc<TaskService>,
        tasks: Arc<dyn TaskRepository>,
        jobs: Arc<dyn JobRepository>,
    ) -> Self {
        Self {
            task_service,
            tasks,
            jobs,
        }
    }

    /// 编译并保存简报，不做租户检查，供后台任务使用
    pub async fn execute(&self, task_id: Uuid, now: DateTime<Utc>) -> ServiceResult<CompiledBrief> {
        let task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("task"))?;
        let messages = self.tasks.list_messages(task.id).await?;
        let assets = self.tasks.list_assets(task.id).await?;

        let brief = compile_brief(&task, &messages, &assets, now);
        self.tasks.save_brief(task.id, &brief, now).await?;
        info!(%task_id, messages = messages.len(), assets = assets.len(), "brief compiled");

        Ok(CompiledBrief {
            task_id,
            brief,
            generated_at: now,
        })
    }

    /// 调用方按需编译
    pub async fn compile_for(
        &self,
        caller: &CallerContext,
        task_id: Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<CompiledBrief> {
        let task = self.task_service.get(caller, task_id).await?;
        self.execute(task.id, now).await
    }

    /// 调用方请求后台编译
    pub async fn enqueue_for(&self, caller: &CallerContext, task_id: Uuid) -> ServiceResult<Job> {
        let task = self.task_service.get(caller, task_id).await?;
        Ok(self.jobs.enqueue(JobKind::CompileBrief, task.id).await?)
    }
}

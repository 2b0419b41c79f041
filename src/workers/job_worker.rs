// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use futures::StreamExt;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::use_cases::analyze_product::AnalyzeProductUseCase;
use crate::application::use_cases::compile_brief::CompileBriefUseCase;
use crate::config::settings::JobSettings;
use crate::domain::models::job::{Job, JobKind};
use crate::domain::repositories::job_repository::JobRepository;
use crate::utils::errors::ServiceError;

/// 运行超过此时长的任务视为工作进程已退出，重新排队
const STALE_AFTER_SECS: i64 = 15 * 60;

/// 单批内的并发上限
const CONCURRENCY: usize = 4;

/// 后台任务工作器
///
/// 定期领取待处理任务，按种类分发给用例，
/// 把结果写回任务状态，失败时按尝试次数决定是否重试
pub struct JobWorker {
    jobs: Arc<dyn JobRepository>,
    compile_brief: Arc<CompileBriefUseCase>,
    analyze_product: Arc<AnalyzeProductUseCase>,
    settings: JobSettings,
}

impl JobWorker {
    /// 创建新的后台任务工作器
    ///
    /// # 参数
    ///
    /// * `jobs` - 任务仓库
    /// * `compile_brief` - 简报编译用例
    /// * `analyze_product` - 产品分析用例
    /// * `settings` - 轮询间隔、批大小和最大尝试次数
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        compile_brief: Arc<CompileBriefUseCase>,
        analyze_product: Arc<AnalyzeProductUseCase>,
        settings: JobSettings,
    ) -> Self {
        Self {
            jobs,
            compile_brief,
            analyze_product,
            settings,
        }
    }

    /// 运行工作器
    pub async fn run(&self) {
        info!(
            poll_interval_secs = self.settings.poll_interval_secs,
            batch_size = self.settings.batch_size,
            "job worker started"
        );
        let mut interval =
            tokio::time::interval(Duration::from_secs(self.settings.poll_interval_secs.max(1)));

        loop {
            interval.tick().await;
            if let Err(e) = self.process_batch().await {
                error!(error = ?e, "job batch failed");
            }
        }
    }

    /// 启动后台运行
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// 领取并处理一批任务
    ///
    /// # 返回值
    ///
    /// 本批处理的任务数
    pub async fn process_batch(&self) -> anyhow::Result<usize> {
        let stale = self
            .jobs
            .requeue_stale(STALE_AFTER_SECS, self.settings.max_attempts)
            .await?;
        if stale.requeued > 0 || stale.failed > 0 {
            warn!(requeued = stale.requeued, failed = stale.failed, "recovered stale jobs");
            counter!("stale_jobs_failed_total").increment(stale.failed);
        }

        let batch = self.jobs.claim_batch(self.settings.batch_size).await?;
        if batch.is_empty() {
            return Ok(0);
        }

        let count = batch.len();
        futures::stream::iter(batch)
            .for_each_concurrent(CONCURRENCY, |job| self.process(job))
            .await;

        Ok(count)
    }

    async fn process(&self, job: Job) {
        let started = Instant::now();
        let result = match job.kind {
            JobKind::CompileBrief => self
                .compile_brief
                .execute(job.entity_id, Utc::now())
                .await
                .map(|_| ()),
            JobKind::AnalyzeProduct => self
                .analyze_product
                .execute(job.entity_id)
                .await
                .map(|_| ()),
        };
        histogram!("job_duration_seconds", "kind" => job.kind.as_str())
            .record(started.elapsed().as_secs_f64());

        let outcome = match result {
            Ok(()) => {
                info!(job_id = %job.id, kind = %job.kind, entity_id = %job.entity_id, "job succeeded");
                self.jobs.mark_succeeded(job.id).await.map(|_| "succeeded")
            }
            Err(e) => {
                let retry = is_retryable(&e) && job.attempts < self.settings.max_attempts;
                warn!(
                    job_id = %job.id,
                    kind = %job.kind,
                    attempts = job.attempts,
                    retry,
                    error = %e,
                    "job failed"
                );
                self.jobs
                    .mark_failed(job.id, &e.to_string(), retry)
                    .await
                    .map(|_| if retry { "retrying" } else { "failed" })
            }
        };

        match outcome {
            Ok(label) => {
                counter!("jobs_processed_total", "kind" => job.kind.as_str(), "outcome" => label)
                    .increment(1);
            }
            Err(e) => error!(job_id = %job.id, error = %e, "could not record job outcome"),
        }
    }
}

/// 输入错误和缺失实体重试也不会成功
fn is_retryable(err: &ServiceError) -> bool {
    matches!(err, ServiceError::Upstream(_) | ServiceError::Repository(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::RepositoryError;

    #[test]
    fn test_retryable_errors() {
        assert!(is_retryable(&ServiceError::Upstream("llm down".into())));
        assert!(is_retryable(&ServiceError::Repository(RepositoryError::NotFound)));
        assert!(!is_retryable(&ServiceError::validation("websiteUrl is required")));
        assert!(!is_retryable(&ServiceError::not_found("task")));
    }
}

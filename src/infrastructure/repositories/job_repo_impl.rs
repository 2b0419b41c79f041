// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    sea_query::{Expr, LockBehavior, LockType},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::parse_column;
use crate::domain::models::job::{Job, JobKind, JobStatus};
use crate::domain::repositories::job_repository::{JobRepository, StaleJobs};
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::job as job_entity;

/// 运行中断、尝试次数用完的任务记录的错误
const STALE_ERROR: &str = "worker stopped before completion";

/// 后台任务仓库实现
///
/// 领取使用 `FOR UPDATE SKIP LOCKED`，多个工作进程不会拿到同一任务
#[derive(Clone)]
pub struct JobRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl JobRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<job_entity::Model> for Job {
    type Error = RepositoryError;

    fn try_from(model: job_entity::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            kind: parse_column(&model.kind)?,
            entity_id: model.entity_id,
            status: parse_column(&model.status)?,
            attempts: model.attempts,
            last_error: model.last_error,
            created_at: model.created_at,
            updated_at: model.updated_at,
            finished_at: model.finished_at,
        })
    }
}

#[async_trait]
impl JobRepository for JobRepositoryImpl {
    async fn enqueue(&self, kind: JobKind, entity_id: Uuid) -> Result<Job, RepositoryError> {
        let pending = job_entity::Entity::find()
            .filter(job_entity::Column::Kind.eq(kind.to_string()))
            .filter(job_entity::Column::EntityId.eq(entity_id))
            .filter(job_entity::Column::Status.eq(JobStatus::Pending.to_string()))
            .one(self.db.as_ref())
            .await?;
        if let Some(existing) = pending {
            return existing.try_into();
        }

        let job = Job::new(kind, entity_id);
        let model = job_entity::ActiveModel {
            id: Set(job.id),
            kind: Set(job.kind.to_string()),
            entity_id: Set(job.entity_id),
            status: Set(job.status.to_string()),
            attempts: Set(job.attempts),
            last_error: Set(None),
            created_at: Set(job.created_at),
            updated_at: Set(job.updated_at),
            finished_at: Set(None),
        };
        model.insert(self.db.as_ref()).await?.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        job_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(Job::try_from)
            .transpose()
    }

    async fn claim_batch(&self, limit: u64) -> Result<Vec<Job>, RepositoryError> {
        let txn = self.db.begin().await?;

        let candidates = job_entity::Entity::find()
            .filter(job_entity::Column::Status.eq(JobStatus::Pending.to_string()))
            .order_by_asc(job_entity::Column::CreatedAt)
            .limit(limit)
            .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
            .all(&txn)
            .await?;

        let now = Utc::now();
        let mut claimed = Vec::with_capacity(candidates.len());
        for model in candidates {
            let attempts = model.attempts + 1;
            let mut active: job_entity::ActiveModel = model.into();
            active.status = Set(JobStatus::Running.to_string());
            active.attempts = Set(attempts);
            active.updated_at = Set(now);
            claimed.push(active.update(&txn).await?.try_into()?);
        }

        txn.commit().await?;
        Ok(claimed)
    }

    async fn mark_succeeded(&self, id: Uuid) -> Result<(), RepositoryError> {
        let now = Utc::now();
        job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(JobStatus::Succeeded.to_string()),
            )
            .col_expr(job_entity::Column::LastError, Expr::value(Option::<String>::None))
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(now))
            .col_expr(job_entity::Column::FinishedAt, Expr::value(Some(now)))
            .filter(job_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error: &str, retry: bool) -> Result<(), RepositoryError> {
        let now = Utc::now();
        let (status, finished_at) = if retry {
            (JobStatus::Pending, None)
        } else {
            (JobStatus::Failed, Some(now))
        };

        job_entity::Entity::update_many()
            .col_expr(job_entity::Column::Status, Expr::value(status.to_string()))
            .col_expr(
                job_entity::Column::LastError,
                Expr::value(Some(error.to_string())),
            )
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(now))
            .col_expr(
                job_entity::Column::FinishedAt,
                Expr::value::<Option<DateTime<Utc>>>(finished_at),
            )
            .filter(job_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn list_for_entity(&self, entity_id: Uuid) -> Result<Vec<Job>, RepositoryError> {
        job_entity::Entity::find()
            .filter(job_entity::Column::EntityId.eq(entity_id))
            .order_by_desc(job_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Job::try_from)
            .collect()
    }

    async fn requeue_stale(
        &self,
        older_than_secs: i64,
        max_attempts: i32,
    ) -> Result<StaleJobs, RepositoryError> {
        let now = Utc::now();
        let threshold = now - Duration::seconds(older_than_secs);
        let txn = self.db.begin().await?;

        let failed = job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(JobStatus::Failed.to_string()),
            )
            .col_expr(
                job_entity::Column::LastError,
                Expr::value(Some(STALE_ERROR.to_string())),
            )
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(now))
            .col_expr(job_entity::Column::FinishedAt, Expr::value(Some(now)))
            .filter(job_entity::Column::Status.eq(JobStatus::Running.to_string()))
            .filter(job_entity::Column::UpdatedAt.lt(threshold))
            .filter(job_entity::Column::Attempts.gte(max_attempts))
            .exec(&txn)
            .await?;

        let requeued = job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(JobStatus::Pending.to_string()),
            )
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(now))
            .filter(job_entity::Column::Status.eq(JobStatus::Running.to_string()))
            .filter(job_entity::Column::UpdatedAt.lt(threshold))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(StaleJobs {
            requeued: requeued.rows_affected,
            failed: failed.rows_affected,
        })
    }
}

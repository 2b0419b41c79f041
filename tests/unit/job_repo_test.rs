// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use briefdesk::config::settings::Settings;
use briefdesk::domain::models::job::{JobKind, JobStatus};
use briefdesk::domain::repositories::job_repository::{JobRepository, StaleJobs};
use briefdesk::infrastructure::database::connection;
use briefdesk::infrastructure::database::entities::job as job_entity;
use briefdesk::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use chrono::{Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{sea_query::Expr, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;
use uuid::Uuid;

async fn memory_db() -> Arc<DatabaseConnection> {
    let mut settings = Settings::defaults().unwrap();
    settings.database.url = "sqlite::memory:".to_string();
    let db = connection::create_pool(&settings.database).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    Arc::new(db)
}

/// 把运行中的任务改成一小时前开始，并设定尝试次数
async fn age_running_job(db: &DatabaseConnection, id: Uuid, attempts: i32) {
    job_entity::Entity::update_many()
        .col_expr(job_entity::Column::Attempts, Expr::value(attempts))
        .col_expr(
            job_entity::Column::UpdatedAt,
            Expr::value(Utc::now() - Duration::hours(1)),
        )
        .filter(job_entity::Column::Id.eq(id))
        .exec(db)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_stale_jobs_fail_once_attempts_are_exhausted() {
    let db = memory_db().await;
    let jobs = JobRepositoryImpl::new(db.clone());

    let retryable = jobs.enqueue(JobKind::CompileBrief, Uuid::new_v4()).await.unwrap();
    let exhausted = jobs.enqueue(JobKind::AnalyzeProduct, Uuid::new_v4()).await.unwrap();
    let fresh = jobs.enqueue(JobKind::CompileBrief, Uuid::new_v4()).await.unwrap();
    assert_eq!(jobs.claim_batch(10).await.unwrap().len(), 3);

    age_running_job(&db, retryable.id, 1).await;
    age_running_job(&db, exhausted.id, 3).await;

    let stale = jobs.requeue_stale(15 * 60, 3).await.unwrap();
    assert_eq!(stale, StaleJobs { requeued: 1, failed: 1 });

    let retryable = jobs.find_by_id(retryable.id).await.unwrap().unwrap();
    assert_eq!(retryable.status, JobStatus::Pending);
    assert!(retryable.finished_at.is_none());

    let exhausted = jobs.find_by_id(exhausted.id).await.unwrap().unwrap();
    assert_eq!(exhausted.status, JobStatus::Failed);
    assert_eq!(exhausted.attempts, 3);
    assert_eq!(exhausted.last_error.as_deref(), Some("worker stopped before completion"));
    assert!(exhausted.finished_at.is_some());

    let fresh = jobs.find_by_id(fresh.id).await.unwrap().unwrap();
    assert_eq!(fresh.status, JobStatus::Running);

    // 失败的任务不会再被领取
    let claimed = jobs.claim_batch(10).await.unwrap();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].id, retryable.id);
    assert_eq!(claimed[0].attempts, 2);
}

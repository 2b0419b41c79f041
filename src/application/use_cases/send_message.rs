// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::NaiveDate;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};
use url::Url;
use uuid::Uuid;

use crate::domain::models::job::JobKind;
use crate::domain::models::message::{Message, MessageRole};
use crate::domain::models::task::Task;
use crate::domain::repositories::catalog_repository::CatalogRepository;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::task_repository::TaskRepository;
use crate::domain::services::extraction_service::{
    ConversationContext, ExtractionAgent, HISTORY_LIMIT,
};
use crate::domain::services::identity_service::CallerContext;
use crate::domain::services::pricing::PriceEstimate;
use crate::domain::services::task_service::TaskService;
use crate::utils::errors::{ServiceError, ServiceResult};

/// 一轮对话的结果
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub user_message: Message,
    pub assistant_message: Message,
    pub updated_fields: Vec<&'static str>,
    pub price_estimate: Option<PriceEstimate>,
    pub task: Task,
}

/// 对话用例
///
/// 调用提取代理，回复成功后在同一事务中保存两条消息并填充仍为空的字段；
/// 实际写入了字段时排队重新编译简报。
pub struct SendMessageUseCase {
    task_service: Arc<TaskService>,
    tasks: Arc<dyn TaskRepository>,
    catalog: Arc<dyn CatalogRepository>,
    jobs: Arc<dyn JobRepository>,
    agent: Arc<ExtractionAgent>,
}

impl SendMessageUseCase {
    pub fn new(
        task_service: Arc<TaskService>,
        tasks: Arc<dyn TaskRepository>,
        catalog: Arc<dyn CatalogRepository>,
        jobs: Arc<dyn JobRepository>,
        agent: Arc<ExtractionAgent>,
    ) -> Self {
        Self {
            task_service,
            tasks,
            catalog,
            jobs,
            agent,
        }
    }

    /// 执行一轮对话
    ///
    /// # 参数
    ///
    /// * `caller` - 调用方
    /// * `task_id` - 任务
    /// * `content` - 用户消息
    /// * `image_urls` - 附带图片
    /// * `today` - 调用方的本地日期
    pub async fn execute(
        &self,
        caller: &CallerContext,
        task_id: Uuid,
        content: String,
        image_urls: Vec<String>,
        today: NaiveDate,
    ) -> ServiceResult<ChatTurn> {
        let content = content.trim().to_string();
        if content.is_empty() && image_urls.is_empty() {
            return Err(ServiceError::validation("content is required"));
        }
        if let Some(bad) = image_urls.iter().find(|u| !is_http_url(u)) {
            return Err(ServiceError::validation(format!(
                "imageUrls: {} is not an http URL",
                bad
            )));
        }

        let started = Instant::now();
        let task = self.task_service.get(caller, task_id).await?;

        // 上下文不含本轮消息
        let history = self.tasks.recent_messages(task.id, HISTORY_LIMIT).await?;
        let asset_names: Vec<String> = self
            .tasks
            .list_assets(task.id)
            .await?
            .into_iter()
            .map(|a| a.file_name)
            .collect();
        let pricing_rules = match task.organization_id {
            Some(org) => self.catalog.list_pricing_rules(org, true).await?,
            None => Vec::new(),
        };

        // 回复成功之前不写入任何内容
        let user_message = Message::new(
            task.id,
            MessageRole::User,
            content.clone(),
            image_urls.clone(),
        );

        let ctx = ConversationContext {
            task: &task,
            history: &history,
            asset_names: &asset_names,
            pricing_rules: &pricing_rules,
            today,
        };
        let turn = self
            .agent
            .respond(&content, &image_urls, &ctx)
            .await
            .map_err(|e| {
                error!(task_id = %task_id, error = ?e, "assistant reply failed");
                counter!("chat_turn_failures_total").increment(1);
                ServiceError::Upstream("assistant is unavailable, please retry".to_string())
            })?;

        let assistant_message =
            Message::new(task.id, MessageRole::Assistant, turn.reply, Vec::new());
        let recorded = self
            .tasks
            .record_turn(&user_message, &assistant_message, &turn.update)
            .await?;

        if !recorded.applied_fields.is_empty() {
            if let Err(e) = self.jobs.enqueue(JobKind::CompileBrief, task.id).await {
                warn!(task_id = %task.id, error = %e, "could not enqueue brief compilation");
            }
        }

        counter!("chat_turns_total").increment(1);
        histogram!("chat_turn_duration_seconds").record(started.elapsed().as_secs_f64());

        Ok(ChatTurn {
            user_message: recorded.user_message,
            assistant_message: recorded.assistant_message,
            updated_fields: recorded.applied_fields,
            price_estimate: turn.price_estimate,
            task: recorded.task,
        })
    }
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::models::asset::Asset;
use crate::domain::models::message::Message;
use crate::domain::models::task::{Task, TaskFieldUpdate, TaskStatus};
use crate::domain::services::tenancy::TenancyFilter;

/// 任务列表查询参数
#[derive(Debug, Clone)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    pub limit: u64,
    pub offset: u64,
}

impl Default for TaskListQuery {
    fn default() -> Self {
        Self {
            status: None,
            limit: 100,
            offset: 0,
        }
    }
}

/// 按列写入的任务修改
///
/// 外层 `None` 表示保留数据库中的值，可清空的列用内层 `None` 清空
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub product_name: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub client_name: Option<Option<String>>,
    pub client_email: Option<Option<String>>,
    pub deadline: Option<NaiveDateTime>,
    pub estimated_price: Option<f64>,
    pub status: Option<TaskStatus>,
    pub final_price: Option<f64>,
}

/// 已持久化的一轮对话
#[derive(Debug, Clone)]
pub struct RecordedTurn {
    pub user_message: Message,
    pub assistant_message: Message,
    /// 实际写入的字段，按 `TaskFieldUpdate::field_names` 的顺序
    pub applied_fields: Vec<&'static str>,
    pub task: Task,
}

/// 任务仓库特质
///
/// 定义任务、对话记录和附件的数据访问接口
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 创建新任务
    async fn create(&self, task: &Task) -> Result<Task, RepositoryError>;
    /// 根据ID查找任务，不做租户过滤
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, RepositoryError>;
    /// 按租户过滤列出任务，按创建时间倒序
    async fn list(
        &self,
        filter: &TenancyFilter,
        query: &TaskListQuery,
    ) -> Result<Vec<Task>, RepositoryError>;
    /// 只写入 `changes` 中出现的列，返回更新后的任务
    async fn apply_changes(&self, id: Uuid, changes: &TaskChanges)
        -> Result<Task, RepositoryError>;
    /// 删除任务，级联删除对话、附件和相关后台任务
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
    /// 保存编译好的简报
    async fn save_brief(
        &self,
        id: Uuid,
        brief: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// 在一个事务中追加用户消息和回复，并填充仍为空的字段
    ///
    /// 每个字段单独以 `IS NULL` 为条件写入，并发的对话轮次不会互相覆盖
    async fn record_turn(
        &self,
        user_message: &Message,
        assistant_message: &Message,
        update: &TaskFieldUpdate,
    ) -> Result<RecordedTurn, RepositoryError>;
    /// 完整对话，按时间正序
    async fn list_messages(&self, task_id: Uuid) -> Result<Vec<Message>, RepositoryError>;
    /// 最近的 `limit` 条对话，按时间正序
    async fn recent_messages(
        &self,
        task_id: Uuid,
        limit: u64,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// 记录附件
    async fn add_asset(&self, asset: &Asset) -> Result<Asset, RepositoryError>;
    /// 任务的附件，按上传时间正序
    async fn list_assets(&self, task_id: Uuid) -> Result<Vec<Asset>, RepositoryError>;
}

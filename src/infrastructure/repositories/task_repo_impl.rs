// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, Value,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{json_strings, parse_column, strings_json, tenancy_condition};
use crate::domain::models::asset::Asset;
use crate::domain::models::message::Message;
use crate::domain::models::task::{Task, TaskFieldUpdate};
use crate::domain::repositories::task_repository::{
    RecordedTurn, TaskChanges, TaskListQuery, TaskRepository,
};
use crate::domain::repositories::RepositoryError;
use crate::domain::services::tenancy::TenancyFilter;
use crate::infrastructure::database::entities::{
    asset as asset_entity, job as job_entity, message as message_entity, task as task_entity,
};

/// 任务仓库实现
///
/// 基于SeaORM实现的任务、对话记录和附件数据访问层
#[derive(Clone)]
pub struct TaskRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl TaskRepositoryImpl {
    /// 创建新的任务仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<task_entity::Model> for Task {
    type Error = RepositoryError;

    fn try_from(model: task_entity::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            organization_id: model.organization_id,
            title: model.title,
            product_name: model.product_name,
            description: model.description,
            client_name: model.client_name,
            client_email: model.client_email,
            // 旧拼写也能解析
            status: parse_column(&model.status)?,
            deadline: model.deadline,
            estimated_price: model.estimated_price,
            final_price: model.final_price,
            brief: model.brief,
            brief_generated_at: model.brief_generated_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Task> for task_entity::ActiveModel {
    fn from(task: &Task) -> Self {
        Self {
            id: Set(task.id),
            owner_id: Set(task.owner_id),
            organization_id: Set(task.organization_id),
            title: Set(task.title.clone()),
            product_name: Set(task.product_name.clone()),
            description: Set(task.description.clone()),
            client_name: Set(task.client_name.clone()),
            client_email: Set(task.client_email.clone()),
            status: Set(task.status.to_string()),
            deadline: Set(task.deadline),
            estimated_price: Set(task.estimated_price),
            final_price: Set(task.final_price),
            brief: Set(task.brief.clone()),
            brief_generated_at: Set(task.brief_generated_at),
            created_at: Set(task.created_at),
            updated_at: Set(task.updated_at),
        }
    }
}

impl TryFrom<message_entity::Model> for Message {
    type Error = RepositoryError;

    fn try_from(model: message_entity::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            task_id: model.task_id,
            role: parse_column(&model.role)?,
            content: model.content,
            image_urls: json_strings(&model.image_urls),
            created_at: model.created_at,
        })
    }
}

impl From<&Message> for message_entity::ActiveModel {
    fn from(message: &Message) -> Self {
        Self {
            id: Set(message.id),
            task_id: Set(message.task_id),
            role: Set(message.role.to_string()),
            content: Set(message.content.clone()),
            image_urls: Set(strings_json(&message.image_urls)),
            created_at: Set(message.created_at),
        }
    }
}

/// 对话提取出的字段及其列，顺序与 `TaskFieldUpdate::field_names` 一致
fn fill_columns(update: &TaskFieldUpdate) -> Vec<(&'static str, task_entity::Column, Value)> {
    use task_entity::Column;

    let candidates = [
        ("clientName", Column::ClientName, update.client_name.clone().map(Value::from)),
        ("clientEmail", Column::ClientEmail, update.client_email.clone().map(Value::from)),
        ("productName", Column::ProductName, update.product_name.clone().map(Value::from)),
        ("description", Column::Description, update.description.clone().map(Value::from)),
        ("deadline", Column::Deadline, update.deadline.map(Value::from)),
        ("estimatedPrice", Column::EstimatedPrice, update.estimated_price.map(Value::from)),
    ];
    candidates
        .into_iter()
        .filter_map(|(name, column, value)| value.map(|v| (name, column, v)))
        .collect()
}

async fn load_task<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Task, RepositoryError> {
    task_entity::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .try_into()
}

impl From<asset_entity::Model> for Asset {
    fn from(model: asset_entity::Model) -> Self {
        Self {
            id: model.id,
            task_id: model.task_id,
            file_name: model.file_name,
            url: model.url,
            mime_type: model.mime_type,
            size_bytes: model.size_bytes,
            metadata: model.metadata,
            created_at: model.created_at,
        }
    }
}

#[async_trait]
impl TaskRepository for TaskRepositoryImpl {
    async fn create(&self, task: &Task) -> Result<Task, RepositoryError> {
        let model: task_entity::ActiveModel = task.into();
        model.insert(self.db.as_ref()).await?.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, RepositoryError> {
        task_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(Task::try_from)
            .transpose()
    }

    async fn list(
        &self,
        filter: &TenancyFilter,
        query: &TaskListQuery,
    ) -> Result<Vec<Task>, RepositoryError> {
        let Some(condition) = tenancy_condition(
            filter,
            task_entity::Column::OwnerId,
            task_entity::Column::OrganizationId,
        ) else {
            return Ok(Vec::new());
        };

        let mut select = task_entity::Entity::find().filter(condition);
        if let Some(status) = query.status {
            select = select.filter(task_entity::Column::Status.eq(status.to_string()));
        }

        select
            .order_by_desc(task_entity::Column::CreatedAt)
            .limit(query.limit)
            .offset(query.offset)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Task::try_from)
            .collect()
    }

    async fn apply_changes(
        &self,
        id: Uuid,
        changes: &TaskChanges,
    ) -> Result<Task, RepositoryError> {
        use task_entity::Column;

        let mut update = task_entity::Entity::update_many()
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(id));
        if let Some(title) = &changes.title {
            update = update.col_expr(Column::Title, Expr::value(title.clone()));
        }
        if let Some(value) = &changes.product_name {
            update = update.col_expr(Column::ProductName, Expr::value(value.clone()));
        }
        if let Some(value) = &changes.description {
            update = update.col_expr(Column::Description, Expr::value(value.clone()));
        }
        if let Some(value) = &changes.client_name {
            update = update.col_expr(Column::ClientName, Expr::value(value.clone()));
        }
        if let Some(value) = &changes.client_email {
            update = update.col_expr(Column::ClientEmail, Expr::value(value.clone()));
        }
        if let Some(deadline) = changes.deadline {
            update = update.col_expr(Column::Deadline, Expr::value(Some(deadline)));
        }
        if let Some(price) = changes.estimated_price {
            update = update.col_expr(Column::EstimatedPrice, Expr::value(Some(price)));
        }
        if let Some(status) = changes.status {
            update = update.col_expr(Column::Status, Expr::value(status.to_string()));
        }
        if let Some(price) = changes.final_price {
            update = update.col_expr(Column::FinalPrice, Expr::value(Some(price)));
        }

        let result = update.exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        load_task(self.db.as_ref(), id).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        job_entity::Entity::delete_many()
            .filter(job_entity::Column::EntityId.eq(id))
            .exec(&txn)
            .await?;
        message_entity::Entity::delete_many()
            .filter(message_entity::Column::TaskId.eq(id))
            .exec(&txn)
            .await?;
        asset_entity::Entity::delete_many()
            .filter(asset_entity::Column::TaskId.eq(id))
            .exec(&txn)
            .await?;
        let result = task_entity::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        txn.commit().await?;
        Ok(())
    }

    async fn save_brief(
        &self,
        id: Uuid,
        brief: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = task_entity::Entity::update_many()
            .col_expr(task_entity::Column::Brief, Expr::value(brief.to_string()))
            .col_expr(task_entity::Column::BriefGeneratedAt, Expr::value(generated_at))
            .filter(task_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn record_turn(
        &self,
        user_message: &Message,
        assistant_message: &Message,
        update: &TaskFieldUpdate,
    ) -> Result<RecordedTurn, RepositoryError> {
        let task_id = user_message.task_id;
        let txn = self.db.begin().await?;

        let user_model: message_entity::ActiveModel = user_message.into();
        let user_message: Message = user_model.insert(&txn).await?.try_into()?;
        let assistant_model: message_entity::ActiveModel = assistant_message.into();
        let assistant_message: Message = assistant_model.insert(&txn).await?.try_into()?;

        let mut applied_fields = Vec::new();
        for (name, column, value) in fill_columns(update) {
            let result = task_entity::Entity::update_many()
                .col_expr(column, Expr::value(value))
                .filter(task_entity::Column::Id.eq(task_id))
                .filter(column.is_null())
                .exec(&txn)
                .await?;
            if result.rows_affected > 0 {
                applied_fields.push(name);
            }
        }
        if !applied_fields.is_empty() {
            task_entity::Entity::update_many()
                .col_expr(task_entity::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(task_entity::Column::Id.eq(task_id))
                .exec(&txn)
                .await?;
        }

        let task = load_task(&txn, task_id).await?;
        txn.commit().await?;

        Ok(RecordedTurn {
            user_message,
            assistant_message,
            applied_fields,
            task,
        })
    }

    async fn list_messages(&self, task_id: Uuid) -> Result<Vec<Message>, RepositoryError> {
        message_entity::Entity::find()
            .filter(message_entity::Column::TaskId.eq(task_id))
            .order_by_asc(message_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Message::try_from)
            .collect()
    }

    async fn recent_messages(
        &self,
        task_id: Uuid,
        limit: u64,
    ) -> Result<Vec<Message>, RepositoryError> {
        let mut messages = message_entity::Entity::find()
            .filter(message_entity::Column::TaskId.eq(task_id))
            .order_by_desc(message_entity::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Message::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        messages.reverse();
        Ok(messages)
    }

    async fn add_asset(&self, asset: &Asset) -> Result<Asset, RepositoryError> {
        let model = asset_entity::ActiveModel {
            id: Set(asset.id),
            task_id: Set(asset.task_id),
            file_name: Set(asset.file_name.clone()),
            url: Set(asset.url.clone()),
            mime_type: Set(asset.mime_type.clone()),
            size_bytes: Set(asset.size_bytes),
            metadata: Set(asset.metadata.clone()),
            created_at: Set(asset.created_at),
        };
        Ok(model.insert(self.db.as_ref()).await?.into())
    }

    async fn list_assets(&self, task_id: Uuid) -> Result<Vec<Asset>, RepositoryError> {
        let models = asset_entity::Entity::find()
            .filter(asset_entity::Column::TaskId.eq(task_id))
            .order_by_asc(asset_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}

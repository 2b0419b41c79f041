// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use super::identity_service::CallerContext;
use super::tenancy::TenancyFilter;
use crate::domain::models::asset::Asset;
use crate::domain::models::message::Message;
use crate::domain::models::organization::subscription_is_active;
use crate::domain::models::task::{Task, TaskStatus};
use crate::domain::repositories::client_link_repository::ClientLinkRepository;
use crate::domain::repositories::organization_repository::OrganizationRepository;
use crate::domain::repositories::storage_repository::StorageRepository;
use crate::domain::repositories::task_repository::{TaskChanges, TaskListQuery, TaskRepository};
use crate::utils::errors::{ServiceError, ServiceResult};

/// 新建任务
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    /// 客户可显式指定已加入的组织，默认使用主组织
    pub organization_id: Option<Uuid>,
    /// 服务商和管理员代客户创建时必填
    pub client_id: Option<Uuid>,
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<NaiveDateTime>,
    pub estimated_price: Option<f64>,
}

/// 任务修改
///
/// `status` 和 `final_price` 只有服务商和管理员可以修改
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub deadline: Option<NaiveDateTime>,
    pub estimated_price: Option<f64>,
    pub status: Option<TaskStatus>,
    pub final_price: Option<f64>,
}

/// 上传的文件
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// 任务服务
///
/// 所有读写都先经过租户过滤，范围外的任务与不存在的任务同样返回 404
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    links: Arc<dyn ClientLinkRepository>,
    storage: Arc<dyn StorageRepository>,
    max_upload_bytes: usize,
}

impl TaskService {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        links: Arc<dyn ClientLinkRepository>,
        storage: Arc<dyn StorageRepository>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            tasks,
            organizations,
            links,
            storage,
            max_upload_bytes,
        }
    }

    /// 范围内的任务，范围为空时返回空列表
    pub async fn list(
        &self,
        caller: &CallerContext,
        query: &TaskListQuery,
    ) -> ServiceResult<Vec<Task>> {
        let filter = TenancyFilter::for_caller(caller);
        if filter.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.tasks.list(&filter, query).await?)
    }

    /// 读取单个任务
    pub async fn get(&self, caller: &CallerContext, id: Uuid) -> ServiceResult<Task> {
        let filter = TenancyFilter::for_caller(caller);
        match self.tasks.find_by_id(id).await? {
            Some(task) if filter.permits(task.owner_id, task.organization_id) => Ok(task),
            _ => Err(ServiceError::not_found("task")),
        }
    }

    /// 创建任务
    ///
    /// 组织订阅必须处于激活状态
    pub async fn create(&self, caller: &CallerContext, new_task: NewTask) -> ServiceResult<Task> {
        let title = new_task.title.trim();
        if title.is_empty() {
            return Err(ServiceError::validation("title is required"));
        }

        let (owner_id, organization_id) = self.resolve_placement(caller, &new_task).await?;

        let subscription = self.organizations.find_subscription(organization_id).await?;
        if !subscription_is_active(subscription.as_ref(), Utc::now()) {
            return Err(ServiceError::forbidden("subscription inactive"));
        }

        let mut task = Task::new(owner_id, organization_id, title.to_string());
        task.product_name = trimmed(new_task.product_name);
        task.description = trimmed(new_task.description);
        task.deadline = new_task.deadline;
        task.estimated_price = new_task.estimated_price;

        let task = self.tasks.create(&task).await?;
        info!(task_id = %task.id, %owner_id, %organization_id, "task created");
        Ok(task)
    }

    /// 修改任务
    pub async fn update(
        &self,
        caller: &CallerContext,
        id: Uuid,
        patch: TaskPatch,
    ) -> ServiceResult<Task> {
        if caller.is_client() && (patch.status.is_some() || patch.final_price.is_some()) {
            return Err(ServiceError::forbidden(
                "only service providers can change status or final price",
            ));
        }

        let title = match patch.title {
            Some(title) => {
                let title = title.trim();
                if title.is_empty() {
                    return Err(ServiceError::validation("title must not be empty"));
                }
                Some(title.to_string())
            }
            None => None,
        };
        let changes = TaskChanges {
            title,
            product_name: patch.product_name.map(|v| trimmed(Some(v))),
            description: patch.description.map(|v| trimmed(Some(v))),
            client_name: patch.client_name.map(|v| trimmed(Some(v))),
            client_email: patch
                .client_email
                .map(|v| trimmed(Some(v)).map(|e| e.to_lowercase())),
            deadline: patch.deadline,
            estimated_price: patch.estimated_price,
            status: patch.status,
            final_price: patch.final_price,
        };

        // 只写入请求里出现的列
        let task = self.get(caller, id).await?;
        Ok(self.tasks.apply_changes(task.id, &changes).await?)
    }

    /// 删除任务及其对话、附件和后台任务
    pub async fn delete(&self, caller: &CallerContext, id: Uuid) -> ServiceResult<()> {
        let task = self.get(caller, id).await?;
        self.tasks.delete(task.id).await?;
        info!(task_id = %task.id, by = %caller.account_id(), "task deleted");
        Ok(())
    }

    pub async fn messages(&self, caller: &CallerContext, id: Uuid) -> ServiceResult<Vec<Message>> {
        let task = self.get(caller, id).await?;
        Ok(self.tasks.list_messages(task.id).await?)
    }

    pub async fn assets(&self, caller: &CallerContext, id: Uuid) -> ServiceResult<Vec<Asset>> {
        let task = self.get(caller, id).await?;
        Ok(self.tasks.list_assets(task.id).await?)
    }

    /// 上传附件
    ///
    /// 依次尝试各存储层级，元数据记录实际使用的层级
    pub async fn upload_asset(
        &self,
        caller: &CallerContext,
        id: Uuid,
        upload: Upload,
        now: DateTime<Utc>,
    ) -> ServiceResult<Asset> {
        let task = self.get(caller, id).await?;

        if upload.data.is_empty() {
            return Err(ServiceError::validation("file must not be empty"));
        }
        if upload.data.len() > self.max_upload_bytes {
            return Err(ServiceError::validation(format!(
                "file exceeds the {} byte limit",
                self.max_upload_bytes
            )));
        }
        let file_name = sanitize_file_name(&upload.file_name);
        let asset_id = Uuid::new_v4();
        let key = format!("tasks/{}/{}-{}", task.id, asset_id, file_name);

        let stored = self
            .storage
            .save(&key, &upload.data, &upload.content_type)
            .await
            .map_err(|e| {
                error!(task_id = %task.id, error = %e, "asset upload failed on every tier");
                ServiceError::Upstream("file storage unavailable".to_string())
            })?;

        let asset = Asset {
            id: asset_id,
            task_id: task.id,
            file_name,
            url: stored.url,
            mime_type: upload.content_type,
            size_bytes: upload.data.len() as i64,
            metadata: json!({
                "storageTier": stored.tier.as_str(),
                "storageKey": stored.key,
            }),
            created_at: now,
        };

        let asset = self.tasks.add_asset(&asset).await?;
        info!(task_id = %task.id, asset_id = %asset.id, tier = %stored.tier, "asset stored");
        Ok(asset)
    }

    /// 确定任务的所有者和组织
    async fn resolve_placement(
        &self,
        caller: &CallerContext,
        new_task: &NewTask,
    ) -> ServiceResult<(Uuid, Uuid)> {
        if caller.is_client() {
            let organization_id = match new_task.organization_id {
                Some(id) if caller.can_access_organization(id) => id,
                Some(_) => return Err(ServiceError::not_found("organization")),
                None => caller.primary_organization().ok_or_else(|| {
                    ServiceError::validation(
                        "organizationId: join an organization before creating tasks",
                    )
                })?,
            };
            return Ok((caller.account_id(), organization_id));
        }

        let organization_id = if caller.is_master_admin() {
            new_task
                .organization_id
                .ok_or_else(|| ServiceError::validation("organizationId is required"))?
        } else {
            caller
                .primary_organization()
                .ok_or_else(|| ServiceError::not_found("organization"))?
        };
        let client_id = new_task
            .client_id
            .ok_or_else(|| ServiceError::validation("clientId is required"))?;
        if !self.links.exists(client_id, organization_id).await? {
            return Err(ServiceError::validation(
                "clientId: client is not linked to this organization",
            ));
        }
        Ok((client_id, organization_id))
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 文件名只保留字母数字和 `.-_`，避免路径穿越
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload.bin".to_string()
    } else {
        cleaned
    }
}

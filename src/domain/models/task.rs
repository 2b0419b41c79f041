// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ParseEnumError;

/// 任务实体
///
/// 客户的一项创意工作，通过对话逐步收集需求字段，
/// 最终编译为简报交付给服务商。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// 任务唯一标识符
    pub id: Uuid,
    /// 拥有该任务的客户账户
    pub owner_id: Uuid,
    /// 所属组织，历史数据可能为空
    pub organization_id: Option<Uuid>,
    pub title: String,
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    /// 任务状态，只能由服务商修改
    pub status: TaskStatus,
    /// 截止时间，本地时间
    pub deadline: Option<NaiveDateTime>,
    pub estimated_price: Option<f64>,
    pub final_price: Option<f64>,
    /// 最近一次编译的简报
    pub brief: Option<String>,
    pub brief_generated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(owner_id: Uuid, organization_id: Uuid, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            organization_id: Some(organization_id),
            title,
            product_name: None,
            description: None,
            client_name: None,
            client_email: None,
            status: TaskStatus::Draft,
            deadline: None,
            estimated_price: None,
            final_price: None,
            brief: None,
            brief_generated_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 任务状态
///
/// 旧版本使用的 `pending`、`in_progress`、`completed`、`archived`
/// 只在边界处接受，存储中统一为当前拼写。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    #[serde(alias = "pending")]
    Draft,
    #[serde(alias = "in_progress")]
    Started,
    #[serde(alias = "completed")]
    Done,
    #[serde(alias = "archived")]
    Archive,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Draft => "draft",
            TaskStatus::Started => "started",
            TaskStatus::Done => "done",
            TaskStatus::Archive => "archive",
        }
    }

    /// 旧拼写到当前状态的映射表
    pub fn from_legacy(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(TaskStatus::Draft),
            "in_progress" => Some(TaskStatus::Started),
            "completed" => Some(TaskStatus::Done),
            "archived" => Some(TaskStatus::Archive),
            _ => None,
        }
    }

    /// 展示用标签
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Draft => "Draft",
            TaskStatus::Started => "Started",
            TaskStatus::Done => "Done",
            TaskStatus::Archive => "Archive",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(TaskStatus::Draft),
            "started" => Ok(TaskStatus::Started),
            "done" => Ok(TaskStatus::Done),
            "archive" => Ok(TaskStatus::Archive),
            other => TaskStatus::from_legacy(other)
                .ok_or_else(|| ParseEnumError::new("task status", other)),
        }
    }
}

/// 对话提取出的字段更新
///
/// 只包含本轮新发现的字段，已有值的字段不会出现在这里。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFieldUpdate {
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<NaiveDateTime>,
    pub estimated_price: Option<f64>,
}

impl TaskFieldUpdate {
    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }

    /// 已设置字段的名称
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.client_name.is_some() {
            names.push("clientName");
        }
        if self.client_email.is_some() {
            names.push("clientEmail");
        }
        if self.product_name.is_some() {
            names.push("productName");
        }
        if self.description.is_some() {
            names.push("description");
        }
        if self.deadline.is_some() {
            names.push("deadline");
        }
        if self.estimated_price.is_some() {
            names.push("estimatedPrice");
        }
        names
    }

    /// 合并到任务，只填充任务上仍为空的字段
    ///
    /// # 返回值
    ///
    /// 任务状态是否发生变化
    pub fn apply_to(&self, task: &mut Task) -> bool {
        fn fill<T: Clone>(slot: &mut Option<T>, value: &Option<T>) -> bool {
            match (slot.is_none(), value) {
                (true, Some(v)) => {
                    *slot = Some(v.clone());
                    true
                }
                _ => false,
            }
        }

        let mut changed = false;
        changed |= fill(&mut task.client_name, &self.client_name);
        changed |= fill(&mut task.client_email, &self.client_email);
        changed |= fill(&mut task.product_name, &self.product_name);
        changed |= fill(&mut task.description, &self.description);
        changed |= fill(&mut task.deadline, &self.deadline);
        changed |= fill(&mut task.estimated_price, &self.estimated_price);
        changed
    }
}

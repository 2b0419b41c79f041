// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 提供文件 URL 的存储层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageTier {
    /// 云端文档同步服务
    DocSync,
    /// S3 兼容对象存储
    ObjectStorage,
    /// 本地磁盘
    Local,
}

impl StorageTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageTier::DocSync => "doc_sync",
            StorageTier::ObjectStorage => "object_storage",
            StorageTier::Local => "local",
        }
    }
}

impl fmt::Display for StorageTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 任务下上传的文件，创建后不再修改
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    pub task_id: Uuid,
    pub file_name: String,
    pub url: String,
    pub mime_type: String,
    pub size_bytes: i64,
    /// 至少包含 `storageTier`
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    pub fn storage_tier(&self) -> Option<&str> {
        self.metadata.get("storageTier").and_then(|v| v.as_str())
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 客户与组织之间的成员关系，(client_id, organization_id) 唯一
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProviderLink {
    pub id: Uuid,
    pub client_id: Uuid,
    pub organization_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

impl ClientProviderLink {
    pub fn new(client_id: Uuid, organization_id: Uuid, joined_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            organization_id,
            joined_at,
        }
    }
}

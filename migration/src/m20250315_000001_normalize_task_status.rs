// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

use crate::m20250301_000003_create_tasks::Tasks;

/// 旧状态值到当前状态值的一次性映射
const LEGACY_STATUSES: &[(&str, &str)] = &[
    ("pending", "draft"),
    ("in_progress", "started"),
    ("completed", "done"),
    ("archived", "archive"),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (legacy, current) in LEGACY_STATUSES {
            let stmt = Query::update()
                .table(Tasks::Table)
                .value(Tasks::Status, *current)
                .and_where(Expr::col(Tasks::Status).eq(*legacy))
                .to_owned();
            manager.exec_stmt(stmt).await?;
        }
        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // Irreversible: the legacy spellings carried no extra information
        Ok(())
    }
}

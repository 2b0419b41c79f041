// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_accounts;
mod m20250301_000002_create_organizations;
mod m20250301_000003_create_tasks;
mod m20250301_000004_create_products_and_catalog;
mod m20250301_000005_create_jobs;
mod m20250315_000001_normalize_task_status;
mod m20250401_000001_create_billing_events;

/// 数据库迁移器
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    /// 获取所有迁移
    ///
    /// # 返回值
    ///
    /// 返回迁移列表
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_accounts::Migration),
            Box::new(m20250301_000002_create_organizations::Migration),
            Box::new(m20250301_000003_create_tasks::Migration),
            Box::new(m20250301_000004_create_products_and_catalog::Migration),
            Box::new(m20250301_000005_create_jobs::Migration),
            Box::new(m20250315_000001_normalize_task_status::Migration),
            Box::new(m20250401_000001_create_billing_events::Migration),
        ]
    }
}

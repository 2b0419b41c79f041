// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// briefdesk 数据库迁移命令行，支持 up/down/status/fresh
#[async_std::main]
async fn main() {
    cli::run_cli(migration::Migrator).await;
}

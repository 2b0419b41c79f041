// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub title: String,
    pub product_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub status: String,
    pub deadline: Option<ChronoDateTime>,
    #[sea_orm(column_type = "Double", nullable)]
    pub estimated_price: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub final_price: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub brief: Option<String>,
    pub brief_generated_at: Option<ChronoDateTimeUtc>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

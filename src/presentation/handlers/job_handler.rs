// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Query},
    Json,
};
use serde_json::{json, Value};

use crate::application::dto::organization_request::JobListParams;
use crate::presentation::errors::AppError;
use crate::presentation::extractors::caller::Caller;
use crate::presentation::state::AppState;

/// 某个任务或产品的后台任务，最新的在前
pub async fn list_jobs(
    Extension(state): Extension<AppState>,
    Caller(caller): Caller,
    Query(params): Query<JobListParams>,
) -> Result<Json<Value>, AppError> {
    let jobs = state.list_jobs.execute(&caller, params.entity_id).await?;
    Ok(Json(json!({ "jobs": jobs })))
}

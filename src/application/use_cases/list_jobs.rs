// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::job::Job;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::services::identity_service::CallerContext;
use crate::domain::services::product_service::ProductService;
use crate::domain::services::task_service::TaskService;
use crate::utils::errors::{ServiceError, ServiceResult};

/// 后台任务查询
///
/// 实体可以是任务或产品，租户检查沿用对应服务的规则
pub struct ListJobsUseCase {
    tasks: Arc<TaskService>,
    products: Arc<ProductService>,
    jobs: Arc<dyn JobRepository>,
}

impl ListJobsUseCase {
    pub fn new(
        tasks: Arc<TaskService>,
        products: Arc<ProductService>,
        jobs: Arc<dyn JobRepository>,
    ) -> Self {
        Self {
            tasks,
            products,
            jobs,
        }
    }

    pub async fn execute(&self, caller: &CallerContext, entity_id: Uuid) -> ServiceResult<Vec<Job>> {
        let visible = match self.tasks.get(caller, entity_id).await {
            Ok(_) => true,
            Err(ServiceError::NotFound(_)) => match self.products.get(caller, entity_id).await {
                Ok(_) => true,
                Err(ServiceError::NotFound(_)) => false,
                Err(e) => return Err(e),
            },
            Err(e) => return Err(e),
        };

        if !visible {
            return Err(ServiceError::not_found("entity"));
        }
        Ok(self.jobs.list_for_entity(entity_id).await?)
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::presentation::handlers::{
    admin_handler, auth_handler, billing_handler, catalog_handler, job_handler,
    organization_handler, product_handler,
};
use crate::presentation::middleware::auth_middleware::auth_middleware;
use crate::presentation::state::AppState;

pub mod task;

/// JSON 包装和 base64 膨胀的余量
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// 创建应用路由
///
/// # 参数
///
/// * `state` - 应用状态
///
/// # 返回值
///
/// 返回配置好的路由，本地存储目录挂载在 `/files`
pub fn routes(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/version", get(version))
        .route("/api/auth/signup", post(auth_handler::signup))
        .route("/api/auth/login", post(auth_handler::login))
        .route("/api/invites/{code}", get(organization_handler::preview_invite))
        .route("/api/billing/webhook", post(billing_handler::webhook));

    let protected_routes = Router::new()
        .route("/api/auth/logout", post(auth_handler::logout))
        .route("/api/me", get(auth_handler::me))
        .route(
            "/api/organization",
            get(organization_handler::list_organizations),
        )
        .route(
            "/api/organization/invite-code",
            post(organization_handler::regenerate_invite_code),
        )
        .route(
            "/api/invites/redeem",
            post(organization_handler::redeem_invite),
        )
        .route("/api/clients", get(organization_handler::list_clients))
        .route(
            "/api/clients/{client_id}",
            delete(organization_handler::remove_client),
        )
        .merge(task::task_routes())
        .route(
            "/api/products",
            get(product_handler::list_products).post(product_handler::create_product),
        )
        .route(
            "/api/products/{id}",
            get(product_handler::get_product).delete(product_handler::delete_product),
        )
        .route(
            "/api/catalog/pricing-rules",
            get(catalog_handler::list_pricing_rules).post(catalog_handler::create_pricing_rule),
        )
        .route(
            "/api/catalog/pricing-rules/{id}",
            patch(catalog_handler::update_pricing_rule)
                .delete(catalog_handler::delete_pricing_rule),
        )
        .route(
            "/api/catalog/services",
            get(catalog_handler::list_services).post(catalog_handler::create_service),
        )
        .route(
            "/api/catalog/services/{id}",
            patch(catalog_handler::update_service).delete(catalog_handler::delete_service),
        )
        .route("/api/billing/checkout", post(billing_handler::checkout))
        .route(
            "/api/billing/subscription",
            get(billing_handler::subscription),
        )
        .route("/api/jobs", get(job_handler::list_jobs))
        .route("/api/admin/accounts", get(admin_handler::list_accounts))
        .route(
            "/api/admin/accounts/{id}",
            delete(admin_handler::purge_account),
        )
        .route(
            "/api/admin/accounts/{id}/role",
            patch(admin_handler::update_role),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let body_limit = state.settings.storage.max_upload_bytes * 2 + BODY_OVERHEAD_BYTES;
    let files = ServeDir::new(&state.settings.storage.local_path);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/files", files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
pub async fn version() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

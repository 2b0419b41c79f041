// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use briefdesk::config::settings::Settings;
use briefdesk::domain::repositories::account_repository::SessionRepository;
use briefdesk::infrastructure::database::connection;
use briefdesk::infrastructure::repositories::account_repo_impl::SessionRepositoryImpl;
use briefdesk::infrastructure::services::openai_llm_service::OpenAiLlmService;
use briefdesk::infrastructure::services::site_fetcher::HttpSiteFetcher;
use briefdesk::infrastructure::services::stripe_gateway::StripeGateway;
use briefdesk::infrastructure::storage::create_storage;
use briefdesk::presentation::routes;
use briefdesk::presentation::state::{AppState, ExternalServices};
use briefdesk::utils::telemetry;
use briefdesk::workers::{ExpirationWorker, JobWorker};
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry();
    info!("Starting briefdesk...");

    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    briefdesk::infrastructure::metrics::init_metrics(&settings.metrics);

    let db = connection::create_pool(&settings.database).await?;
    let db = Arc::new(db);
    info!("Database connection established");

    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    let storage = create_storage(&settings.storage, &settings.server.public_base_url)?;
    info!(tiers = storage.len(), "File storage initialized");

    if settings.llm.api_key.is_none() {
        warn!("llm.api_key is not set; chat turns and product analysis will fail");
    }

    let external = ExternalServices {
        llm: Arc::new(OpenAiLlmService::new(&settings.llm)?),
        payments: Arc::new(StripeGateway::new(&settings.billing)?),
        storage: Arc::new(storage),
        site_fetcher: Arc::new(HttpSiteFetcher::new(settings.llm.timeout_secs)?),
    };
    let state = AppState::build(settings.clone(), db.clone(), external);

    JobWorker::new(
        state.jobs.clone(),
        state.compile_brief.clone(),
        state.analyze_product.clone(),
        settings.jobs.clone(),
    )
    .start();

    let sessions: Arc<dyn SessionRepository> = Arc::new(SessionRepositoryImpl::new(db.clone()));
    ExpirationWorker::new(sessions).start();
    info!("Background workers started");

    let app = routes::routes(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

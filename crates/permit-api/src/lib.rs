//! Permit API /v1: REST surface over the permit pipeline
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /v1/projects` | ingest, score and gate a project |
//! | `POST /v1/projects/:id/generate` | resolve, assemble and package |
//! | `GET /v1/projects/:id` | status and results |
//! | `GET /v1/projects/:id/events` | run events |
//! | `GET /v1/health` | liveness and version |
//! | `GET /metrics` | prometheus counters |

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;

use axum::{
    routing::{get, post},
    Router,
};
use config::ServiceConfig;
use error::StartupError;
use handlers::AppState;
use metrics::PipelineMetrics;
use permit_clients::{
    ChatCompletionsClient, DesignPlatformClient, Endpoint, HttpDocumentFetcher,
    KeywordSearchClient, Unconfigured,
};
use permit_core::{
    BlobStore, DesignPlatform, InMemoryBlobStore, InMemoryEventLog, InMemoryStateStore,
    LocalBlobStore, ReasoningService, SearchService,
};
use permit_docs::{TemplateRenderer, TemplatesFile};
use permit_pipeline::{Orchestrator, PipelineServices};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState, enable_cors: bool) -> Router {
    let router = Router::new()
        .route("/v1/projects", post(handlers::analyze))
        .route("/v1/projects/:id", get(handlers::project_status))
        .route("/v1/projects/:id/generate", post(handlers::generate))
        .route("/v1/projects/:id/events", get(handlers::project_events))
        .route("/v1/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::version_header))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router.layer(middleware::cors())
    } else {
        router
    }
}

/// Wire stores, clients and the orchestrator from configuration.
pub fn create_app(config: &ServiceConfig) -> Result<Router, StartupError> {
    let blobs: Arc<dyn BlobStore> = match &config.storage.blob_dir {
        Some(dir) => Arc::new(LocalBlobStore::new(dir, &config.storage.public_base_url)),
        None => Arc::new(InMemoryBlobStore::new(&config.storage.public_base_url)),
    };

    let platform_timeout = Duration::from_secs(config.design_platform.timeout_secs);
    let platform: Arc<dyn DesignPlatform> = match (
        &config.design_platform.url,
        &config.design_platform.token,
        &config.design_platform.org_id,
    ) {
        (Some(url), Some(token), Some(org)) => Arc::new(DesignPlatformClient::new(
            Endpoint::new(url).with_api_key(token).with_timeout(platform_timeout),
            org,
        )?),
        _ => {
            tracing::warn!("design platform not configured; projects will ingest as degraded");
            Arc::new(Unconfigured::new("design platform"))
        }
    };

    let call_timeout = Duration::from_secs(config.resolver.call_timeout_secs);
    let search: Arc<dyn SearchService> = match (&config.search.url, &config.search.api_key) {
        (Some(url), Some(key)) => Arc::new(KeywordSearchClient::new(
            Endpoint::new(url).with_api_key(key).with_timeout(call_timeout),
        )?),
        _ => {
            tracing::warn!("search service not configured; specifications will not resolve");
            Arc::new(Unconfigured::new("search service"))
        }
    };

    let reasoning: Arc<dyn ReasoningService> = match (&config.reasoning.url, &config.reasoning.api_key) {
        (Some(url), Some(key)) => Arc::new(ChatCompletionsClient::new(
            Endpoint::new(url)
                .with_api_key(key)
                .with_timeout(Duration::from_secs(config.scorer.call_timeout_secs)),
            &config.reasoning.model,
        )?),
        _ => {
            tracing::warn!("reasoning service not configured; scores will be estimated");
            Arc::new(Unconfigured::new("reasoning service"))
        }
    };

    let renderer = match &config.templates_path {
        Some(path) => TemplateRenderer::new(TemplatesFile::load(path)?)?,
        None => TemplateRenderer::embedded()?,
    };

    let services = PipelineServices {
        state: Arc::new(InMemoryStateStore::new()),
        blobs,
        events: Arc::new(InMemoryEventLog::new()),
        platform,
        search,
        reasoning,
        fetcher: Arc::new(HttpDocumentFetcher::new(call_timeout)?),
    };
    let orchestrator = Orchestrator::new(services, config.pipeline_config(), renderer);

    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        metrics: Arc::new(PipelineMetrics::new()?),
    };
    Ok(router(state, config.server.enable_cors))
}

pub async fn run(config: ServiceConfig) -> anyhow::Result<()> {
    let app = create_app(&config)?;
    let listener = tokio::net::TcpListener::bind(&config.server.addr).await?;

    tracing::info!(addr = %config.server.addr, "permit API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

//! Binary entrypoint for the permit API server.
use anyhow::Context;
use permit_api::{config::ServiceConfig, run};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // PERMIT_CONFIG points at an optional YAML file; env vars override it
    let path = std::env::var("PERMIT_CONFIG").ok();
    let config = ServiceConfig::load(path.as_deref()).context("failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(version = permit_core::PERMIT_VERSION, "starting permit API");
    run(config).await
}

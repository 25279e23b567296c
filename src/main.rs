//! get-analysis-id server binary

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use get_analysis_id::api::{create_router, AppState};
use get_analysis_id::apps::AppsClient;
use get_analysis_id::config::{AppConfig, LogFormat};
use get_analysis_id::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    init_tracing(&config)?;

    config.validate().context("invalid configuration")?;

    let apps = AppsClient::new(&config.apps).context("failed to build apps client")?;
    tracing::info!(url = %config.apps.url, user = %config.apps.user, "Using apps service");

    let router = create_router(AppState::new(apps));

    server::serve(&config.server, router).await
}

fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.logging.level.clone()))
        .unwrap_or_else(|_| EnvFilter::new("get_analysis_id=info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }

    Ok(())
}

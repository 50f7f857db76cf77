pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod identity;
pub mod models;
pub mod services;
pub mod state;
pub mod tenant;
pub mod web;

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;
use db::Store;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    init_tracing(&config)?;

    match cli.command() {
        Commands::Serve => {
            config.validate()?;
            let prometheus_handle = init_metrics(&config)?;
            run_server(config, prometheus_handle).await
        }
        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("Created config.toml");
            } else {
                println!("config.toml already exists");
            }
            Ok(())
        }
        Commands::Migrate => {
            config.validate()?;
            Store::with_pool_options(
                &config.general.database_url,
                config.general.max_db_connections,
                config.general.min_db_connections,
            )
            .await
            .context("Failed to apply migrations")?;
            info!("Migrations applied");
            Ok(())
        }
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "medfolio")?
            .extra_field("root_domain", config.server.root_domain.clone())?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}

fn init_metrics(config: &Config) -> anyhow::Result<Option<PrometheusHandle>> {
    if !config.observability.metrics_enabled {
        return Ok(None);
    }

    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics recorder initialized");
    Ok(Some(handle))
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Medfolio v{} starting...", env!("CARGO_PKG_VERSION"));

    let port = config.server.port;
    let root_domain = config.server.root_domain.clone();

    let state = api::create_app_state_from_config(config, prometheus_handle).await?;
    let app = api::router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        "Web server running at http://0.0.0.0:{} (practices at *.{})",
        port, root_domain
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}

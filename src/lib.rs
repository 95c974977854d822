pub mod core;
pub mod fetcher;
pub mod providers;
pub mod scheduler;

use crate::core::config::AppConfig;
use crate::fetcher::RateFetcher;
use crate::scheduler::{POLL_INTERVAL, Scheduler};
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub fn build_fetcher(config: &AppConfig) -> Result<RateFetcher> {
    let source = providers::bcb::BcbProvider::new(config.bcb_url())?;
    let action = providers::process::ShellCommandAction::new(&config.restart_command);
    RateFetcher::new(Arc::new(source), Arc::new(action), &config.date_format)
}

/// Polls every `period` until `shutdown` resolves.
pub async fn run_until<F>(config: &AppConfig, period: Duration, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let fetcher = Arc::new(build_fetcher(config)?);
    let scheduler = Scheduler::start(fetcher, period);

    shutdown.await;
    info!("Shutdown requested");
    scheduler.shutdown().await;
    Ok(())
}

pub async fn run(config_path: Option<&str>) -> Result<()> {
    info!("PTAX watcher starting...");

    let config = load_config(config_path)?;

    run_until(&config, POLL_INTERVAL, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
    })
    .await
}

use anyhow::Result;
use tracing::info;

use toogether_service::{app, config, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;
    logging::init_logging(&config.logging);

    info!(
        production = config.server.production,
        "Starting Toogether data service v{}",
        env!("CARGO_PKG_VERSION")
    );

    let metrics_addr = config.metrics_addr()?;
    if let Some(addr) = metrics_addr {
        app::install_metrics_exporter(addr)?;
    }

    let policy = config.http_policy();
    info!(
        debug = policy.debug,
        allowed_hosts = ?policy.allowed_hosts,
        cors_allow_all = policy.cors_allow_all,
        "HTTP policy selected"
    );

    let services = app::bootstrap(&config).await?;

    let purged = services.auth.purge_expired_tokens().await?;
    info!(purged, "Expired blacklist entries removed");

    info!("Data layer ready");

    // Keep the scrape endpoint up until asked to stop.
    if metrics_addr.is_some() {
        tokio::signal::ctrl_c().await?;
        info!("Shutting down");
    }

    Ok(())
}

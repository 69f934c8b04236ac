use anyhow::Result;
use apctray::config::TrayConfig;
use apctray::dialogs::WindowSet;
use apctray::status::SharedStatus;
use apctray::tray::TrayAgent;
use apctray::version;
use std::sync::Arc;
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    log::info!("Starting {}", version::banner());

    let config = TrayConfig::load();

    // The monitoring subsystem publishes through this handle; until it
    // reports in, the tray shows communication lost.
    let status = SharedStatus::comm_lost();

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

    let tray = TrayAgent::start(
        &config,
        Arc::new(status.clone()),
        WindowSet::logging(),
        shutdown_tx,
    )?;

    shutdown_rx.recv().await.ok();
    drop(tray);
    log::info!("Shutdown signal received, exiting...");
    Ok(())
}

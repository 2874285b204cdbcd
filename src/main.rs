use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use custom_lists::config::Config;
use custom_lists::init::{setup_logging, start_engine};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load Config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or("custom-lists.toml".to_string());
    let config_exists = std::path::Path::new(&config_path).exists();
    let config = if config_exists {
        Config::load(&config_path).await?
    } else {
        Config::default()
    };

    // 2. Setup Logging
    setup_logging(&config);
    info!("Starting custom-lists...");

    if !config_exists {
        info!("Config file not found, using defaults.");
    }

    // 3. Start store, reload controller and check task
    let engine = start_engine(&config);

    // 4. Start API Server
    if config.api.enable {
        let addr: SocketAddr = format!("{}:{}", config.api.host, config.api.port)
            .parse()
            .context("Invalid API listen address")?;
        let controller = engine.controller.clone();
        let path_sender = engine.path_sender;

        tokio::spawn(async move {
            if let Err(e) =
                custom_lists::api::start_api_server(controller, path_sender, addr).await
            {
                error!("{:#}", e);
            }
        });
    }

    // 5. Graceful Shutdown
    signal::ctrl_c().await?;
    info!("Shutdown signal received.");

    Ok(())
}

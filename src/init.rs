//! Initialization helpers for the application startup.

use crate::config::Config;
use crate::engine::{FileParser, FilterStore, ReloadController, Scheduler, TaskScheduler};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::info;

/// Sets up the tracing subscriber with the configured filters.
pub fn setup_logging(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

/// The running custom list engine.
pub struct Engine {
    pub store: Arc<FilterStore>,
    pub controller: Arc<ReloadController>,
    /// Publishing a new path here triggers a check.
    pub path_sender: watch::Sender<String>,
}

/// Builds the store and reload controller, and starts the check task with
/// the first check after the configured initial delay.
pub fn start_engine(config: &Config) -> Engine {
    let (path_sender, path_receiver) = watch::channel(config.customlists.file_path.clone());

    let store = Arc::new(FilterStore::new());
    let scheduler = TaskScheduler::new();
    let controller = Arc::new(ReloadController::new(
        store.clone(),
        Arc::new(FileParser::new()),
        Arc::new(path_receiver.clone()),
        scheduler.clone(),
        config.customlists.check_interval(),
    ));

    let first_check = Instant::now() + config.customlists.initial_delay();
    scheduler.schedule_at(first_check);
    scheduler.clone().spawn(controller.clone(), path_receiver);

    if config.customlists.file_path.is_empty() {
        info!("No custom filter list configured");
    } else {
        info!(
            "Custom filter list {} will be loaded in {}s",
            config.customlists.file_path, config.customlists.initial_delay_secs
        );
    }

    Engine {
        store,
        controller,
        path_sender,
    }
}

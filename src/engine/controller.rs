use super::lists::{ListSource, ListSummary};
use super::store::FilterStore;
use super::traits::{ListParser, ListPathSource, Scheduler};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Result of one update check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No file path configured; filtering is inactive.
    Disabled,
    /// Same path and modification time as the loaded list.
    Unchanged,
    Reloaded(ListSummary),
    /// Parsing failed; the previous list stays active.
    Failed(String),
}

#[derive(Debug, Default)]
struct ReloadState {
    next_check: Option<Instant>,
}

/// Decides when the list file needs re-parsing and publishes the result.
///
/// Checks are serialized: concurrent callers wait for the running check and
/// then see its result as the loaded source, so one file version is parsed
/// once.
pub struct ReloadController {
    store: Arc<FilterStore>,
    parser: Arc<dyn ListParser>,
    paths: Arc<dyn ListPathSource>,
    scheduler: Arc<dyn Scheduler>,
    interval: Duration,
    state: Mutex<ReloadState>,
}

impl ReloadController {
    pub fn new(
        store: Arc<FilterStore>,
        parser: Arc<dyn ListParser>,
        paths: Arc<dyn ListPathSource>,
        scheduler: Arc<dyn Scheduler>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            parser,
            paths,
            scheduler,
            interval,
            state: Mutex::new(ReloadState::default()),
        }
    }

    pub fn store(&self) -> &Arc<FilterStore> {
        &self.store
    }

    /// When the next periodic check is due, if one is scheduled.
    pub async fn next_check(&self) -> Option<Instant> {
        self.state.lock().await.next_check
    }

    pub async fn check_and_update(&self) -> CheckOutcome {
        let mut state = self.state.lock().await;

        let file_path = self.paths.file_path();
        if file_path.is_empty() {
            state.next_check = None;
            if self.store.snapshot().source().is_some() {
                self.store.clear();
            }
            return CheckOutcome::Disabled;
        }

        // Re-arm first so a failing parse cannot stop future checks.
        let next = Instant::now() + self.interval;
        self.scheduler.schedule_at(next);
        state.next_check = Some(next);

        let path = PathBuf::from(file_path);
        let modified = match tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                // Using "now" retries the parse on every check until the
                // file is readable again.
                debug!("Failed to stat filter list {}: {}", path.display(), e);
                SystemTime::now()
            }
        };

        let current = self.store.snapshot();
        if let Some(source) = current.source() {
            if source.path == path && source.modified == modified {
                debug!("Filter list {} unchanged", path.display());
                return CheckOutcome::Unchanged;
            }
        }

        info!("Loading custom filter list from {}", path.display());
        match self.parser.parse(&path).await {
            Ok(lists) => {
                let lists = lists.with_source(ListSource { path, modified });
                let summary = lists.summary();
                self.store.reload(lists);
                CheckOutcome::Reloaded(summary)
            }
            Err(e) => {
                warn!("Keeping previous custom filter list: {}", e);
                CheckOutcome::Failed(e.to_string())
            }
        }
    }
}

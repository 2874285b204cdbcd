use super::lists::FilterLists;
use super::parser::ParseError;
use std::path::Path;
use std::time::Instant;
use tokio::sync::watch;

/// Turns a list file into a complete, unpublished snapshot.
#[async_trait::async_trait]
pub trait ListParser: Send + Sync {
    async fn parse(&self, path: &Path) -> Result<FilterLists, ParseError>;
}

/// Supplies the configured list file path. An empty path disables filtering.
pub trait ListPathSource: Send + Sync {
    fn file_path(&self) -> String;
}

impl ListPathSource for watch::Receiver<String> {
    fn file_path(&self) -> String {
        self.borrow().trim().to_string()
    }
}

/// Accepts "run the update check again at `at`" requests.
pub trait Scheduler: Send + Sync {
    fn schedule_at(&self, at: Instant);
}

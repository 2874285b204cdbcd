use super::controller::{CheckOutcome, ReloadController};
use super::traits::Scheduler;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Runs update checks on a tokio task at the instants requested through
/// [`Scheduler::schedule_at`], and whenever the configured path changes.
///
/// Only the latest requested instant is kept, like re-scheduling a task.
pub struct TaskScheduler {
    deadline: watch::Sender<Option<Instant>>,
}

impl TaskScheduler {
    pub fn new() -> Arc<Self> {
        let (deadline, _) = watch::channel(None);
        Arc::new(Self { deadline })
    }

    pub fn next_run(&self) -> Option<Instant> {
        *self.deadline.borrow()
    }

    pub fn spawn(
        self: Arc<Self>,
        controller: Arc<ReloadController>,
        mut path_changes: watch::Receiver<String>,
    ) -> JoinHandle<()> {
        let mut deadline_rx = self.deadline.subscribe();

        tokio::spawn(async move {
            let mut watching_config = true;

            loop {
                let next = *deadline_rx.borrow_and_update();
                let due = async move {
                    match next {
                        Some(at) => tokio::time::sleep_until(at.into()).await,
                        None => std::future::pending().await,
                    }
                };

                tokio::select! {
                    _ = due => {
                        debug!("Scheduled custom filter list check");
                        self.deadline.send_replace(None);
                        log_outcome(controller.check_and_update().await);
                    }
                    _ = deadline_rx.changed() => {
                        // Re-read the deadline on the next iteration.
                    }
                    changed = path_changes.changed(), if watching_config => {
                        if changed.is_err() {
                            watching_config = false;
                            continue;
                        }
                        info!("Custom filter list path changed, checking for update");
                        log_outcome(controller.check_and_update().await);
                    }
                }
            }
        })
    }
}

impl Scheduler for TaskScheduler {
    fn schedule_at(&self, at: Instant) {
        self.deadline.send_replace(Some(at));
    }
}

fn log_outcome(outcome: CheckOutcome) {
    match outcome {
        CheckOutcome::Disabled => debug!("No custom filter list configured"),
        CheckOutcome::Unchanged => debug!("Custom filter list unchanged"),
        CheckOutcome::Reloaded(summary) => info!(
            "Custom filter list reloaded: {} IPs, {} domains, {} ASNs, {} countries",
            summary.ips, summary.domains, summary.asns, summary.countries
        ),
        CheckOutcome::Failed(reason) => debug!("Custom filter list check failed: {}", reason),
    }
}

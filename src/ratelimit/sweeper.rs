//! Periodic background sweep of the rate limiter store.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use super::limiter::RateLimiter;

/// Handle to a running sweep task.
///
/// Dropping the handle also stops the task, but only [`shutdown`](Self::shutdown)
/// waits for it to finish.
pub struct SweeperHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop scheduling sweeps and wait for the task to exit.
    ///
    /// A sweep that is already running completes before this returns.
    pub async fn shutdown(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Err(e) = self.task.await {
            error!(error = %e, "Rate limit sweeper terminated abnormally");
        }
    }

    /// Whether the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl RateLimiter {
    /// Spawn the periodic sweep on the current tokio runtime.
    ///
    /// The first sweep runs one `sweep_interval` after the call.
    pub fn start_sweeper(self: &Arc<Self>) -> SweeperHandle {
        let (stop_tx, stop_rx) = oneshot::channel();
        let limiter = Arc::clone(self);
        let task = tokio::spawn(run_sweeper(limiter, stop_rx));

        SweeperHandle {
            stop_tx: Some(stop_tx),
            task,
        }
    }
}

async fn run_sweeper(limiter: Arc<RateLimiter>, mut stop_rx: oneshot::Receiver<()>) {
    let period = limiter.settings().sweep_interval;
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval = ?period, "Rate limit sweeper started");

    loop {
        tokio::select! {
            // Fires on an explicit stop and when the handle is dropped
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                let report = limiter.sweep(Instant::now());
                debug!(
                    evicted = report.evicted,
                    unblocked = report.unblocked,
                    remaining = report.remaining,
                    "Rate limit sweep completed"
                );
            }
        }
    }

    info!("Rate limit sweeper stopped");
}

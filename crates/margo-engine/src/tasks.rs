//! Cancellable recurring tasks scoped to one session.
//!
//! Every periodic behavior of a session (full refresh, reconciliation sweep,
//! stale-mark sweep, URL poll) runs as one of these tasks so that destroy can
//! signal each one's shutdown channel and wait for none of them.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::debug;

use margo_core::{Error, Result};

/// Handle for a recurring background task.
///
/// Dropping the handle also stops the task, because the shutdown channel
/// closes.
pub struct PeriodicTask {
    name: &'static str,
    shutdown_tx: mpsc::Sender<()>,
}

impl PeriodicTask {
    /// Spawn a task that runs `tick` every `period`.
    ///
    /// Ticks never overlap: the next sleep starts only after the previous
    /// tick completes.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        tokio::spawn(async move {
            debug!(
                task = name,
                period_ms = period.as_millis() as u64,
                "Periodic task started"
            );
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!(task = name, "Periodic task shut down");
                        break;
                    }
                    _ = sleep(period) => {
                        tick().await;
                    }
                }
            }
        });
        Self { name, shutdown_tx }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Signal the task to shut down gracefully.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| Error::Internal(format!("Failed to stop task {}", self.name)))?;
        Ok(())
    }
}

impl std::fmt::Debug for PeriodicTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicTask")
            .field("name", &self.name)
            .finish()
    }
}

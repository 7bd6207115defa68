/*!
 * Cache Sweeper
 * Background task removing expired cache entries on a fixed interval
 */

use super::AccessCache;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Control messages for the cleanup task
#[derive(Debug, Clone, Copy)]
enum CleanupCommand {
    /// Sweep now without waiting for the next tick
    Trigger,
    Shutdown,
}

/// Handle to the cleanup background task
pub struct CleanupTask {
    command_tx: mpsc::UnboundedSender<CleanupCommand>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl CleanupTask {
    /// Spawn the sweeper. It holds only a weak reference and exits once the cache is dropped.
    pub fn spawn(cache: &Arc<AccessCache>, interval: Duration) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let cache = Arc::downgrade(cache);

        let handle = tokio::spawn(async move {
            run_cleanup_loop(cache, interval, command_rx).await;
        });

        info!(interval_secs = interval.as_secs(), "Cache cleanup task spawned");

        Self {
            command_tx,
            handle: Some(handle),
        }
    }

    pub fn trigger(&self) {
        let _ = self.command_tx.send(CleanupCommand::Trigger);
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the task and wait for it to finish
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(CleanupCommand::Shutdown);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Cache cleanup task shutdown error: {}", e);
            } else {
                info!("Cache cleanup task shutdown complete");
            }
        }
    }
}

async fn run_cleanup_loop(
    cache: Weak<AccessCache>,
    period: Duration,
    mut command_rx: mpsc::UnboundedReceiver<CleanupCommand>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // First tick fires immediately; nothing can have expired yet
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if !sweep(&cache) {
                    break;
                }
            }

            cmd = command_rx.recv() => {
                match cmd {
                    Some(CleanupCommand::Trigger) => {
                        if !sweep(&cache) {
                            break;
                        }
                    }
                    Some(CleanupCommand::Shutdown) | None => {
                        info!("Cache cleanup task shutting down");
                        break;
                    }
                }
            }
        }
    }
}

/// Returns false once the cache is gone
fn sweep(cache: &Weak<AccessCache>) -> bool {
    match cache.upgrade() {
        Some(cache) => {
            let removed = cache.cleanup_expired();
            debug!(removed, "cache sweep complete");
            true
        }
        None => {
            debug!("Access cache dropped, cleanup task exiting");
            false
        }
    }
}

impl Drop for CleanupTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.command_tx.send(CleanupCommand::Shutdown);
            if !handle.is_finished() {
                warn!("CleanupTask dropped without shutdown(), aborting task");
                handle.abort();
            }
        }
    }
}

//! Background expiry sweep for [`SitemapCache`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::SitemapCache;

/// Handle to a running sweep task. Dropping it without calling
/// [`Sweeper::shutdown`] leaves the task running until the runtime stops.
#[derive(Debug)]
pub struct Sweeper {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Sweeper {
    pub(super) fn spawn(cache: Arc<SitemapCache>, interval: Duration) -> Self {
        let (stop, mut stopped) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = cache.sweep();
                        if removed > 0 {
                            tracing::debug!(removed, remaining = cache.len(), "swept expired cache records");
                        }
                    }
                    _ = stopped.changed() => break,
                }
            }

            tracing::debug!("cache sweeper stopped");
        });

        Self { stop, task }
    }

    /// Stop the sweep task and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!("cache sweeper task failed: {}", e);
        }
    }
}

//! Background expiry sweeper.
//!
//! Periodically deletes listings whose expiry time has passed. Reservations
//! pointing at a swept listing are left behind and tolerated by the read
//! side.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::domain::ListingService;

pub struct ExpirySweeper {
    listings: Arc<ListingService>,
    period: Duration,
}

impl ExpirySweeper {
    pub fn new(listings: Arc<ListingService>, period: Duration) -> Self {
        Self { listings, period }
    }

    /// Spawn the sweep loop. The returned handle stops it.
    pub fn spawn(self) -> SweeperHandle {
        let cancel = CancellationToken::new();
        let child = cancel.clone();
        let task = tokio::spawn(async move { self.run(child).await });
        SweeperHandle { cancel, task }
    }

    async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.period);
        // The first tick fires immediately; skip it so startup is quiet.
        ticker.tick().await;
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!("expiry sweeper stopping");
                    return;
                }
                _ = ticker.tick() => {
                    match self.listings.sweep_expired(Utc::now()).await {
                        Ok(0) => {}
                        Ok(n) => tracing::info!(deleted = n, "swept expired listings"),
                        Err(e) => tracing::error!(error = %e, "expiry sweep failed"),
                    }
                }
            }
        }
    }
}

pub struct SweeperHandle {
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the loop and wait for the task to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

//! Expiry sweep worker
//!
//! Periodically cancels pending reservations whose hold deadline has
//! passed, freeing their seats. Expiry is also applied lazily at payment
//! initiation; the sweep bounds how long an abandoned hold can keep a
//! seat when the passenger never returns.
//!
//! Registered with the background task manager in
//! `start_background_tasks()`.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::manager::BookingManager;

/// Periodic reservation-expiry sweeper
pub struct ExpiryWorker {
    manager: Arc<BookingManager>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl ExpiryWorker {
    pub fn new(
        manager: Arc<BookingManager>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            manager,
            interval,
            shutdown,
        }
    }

    /// Main loop: sweep once per interval until shutdown
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Expiry worker started");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Expiry worker received shutdown signal");
                    return;
                }
            }

            let now = shared::util::now_millis();
            match self.manager.sweep_expired(now) {
                Ok(0) => {}
                Ok(count) => {
                    tracing::debug!(count, "Expiry sweep released seats");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Expiry sweep failed");
                }
            }
        }
    }
}

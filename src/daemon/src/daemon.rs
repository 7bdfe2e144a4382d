use std::time::Duration;

use anyhow::Result;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::cleaner::ContainerCleaner;

/// Runs cleanup passes at a fixed period until cancelled.
pub struct CleanupDaemon {
    cleaner: ContainerCleaner,
    period: Duration,
}

impl CleanupDaemon {
    pub fn new(cleaner: ContainerCleaner, period: Duration) -> Self {
        Self { cleaner, period }
    }

    /// The first pass runs one period after start. A pass that overruns the
    /// period delays the next tick instead of triggering catch-up passes.
    pub async fn run(self, cancellation_token: CancellationToken) -> Result<()> {
        if self.period.is_zero() {
            anyhow::bail!("cleanup period must be greater than zero");
        }

        let Some(first_tick) = Instant::now().checked_add(self.period) else {
            anyhow::bail!("cleanup period {:?} is too long", self.period);
        };
        let mut interval = interval_at(first_tick, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_secs = self.period.as_secs(), "container cleanup scheduled");

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    info!("container cleanup stopped");
                    break;
                }
                _ = interval.tick() => {
                    let report = self.cleaner.run_once().await;
                    if report.listing_error.is_some() {
                        error!(%report, "cleanup pass aborted");
                    } else {
                        info!(%report, "cleanup pass finished");
                    }
                }
            }
        }

        Ok(())
    }
}

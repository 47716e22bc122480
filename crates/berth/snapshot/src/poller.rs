//! Periodic snapshot refresh loop.

use berth_types::SnapshotConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::builder::SnapshotBuilder;
use crate::error::SnapshotResult;
use crate::handle::SnapshotHandle;

/// Rebuilds the fleet snapshot on a fixed interval.
///
/// The first build happens immediately when the loop starts. A failed
/// build is logged and the previous snapshot is kept; the loop never dies
/// on build errors.
pub struct SnapshotPoller {
    builder: SnapshotBuilder,
    handle: Arc<SnapshotHandle>,
    poll_interval: Duration,
}

impl SnapshotPoller {
    pub fn new(
        builder: SnapshotBuilder,
        handle: Arc<SnapshotHandle>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            builder,
            handle,
            poll_interval,
        }
    }

    /// Construct from the operator-facing snapshot configuration.
    pub fn from_config(
        builder: SnapshotBuilder,
        handle: Arc<SnapshotHandle>,
        config: &SnapshotConfig,
    ) -> Self {
        Self::new(builder, handle, config.poll_interval)
    }

    /// Build once and publish the result, returning the new generation.
    pub async fn refresh_once(&self) -> SnapshotResult<u64> {
        let snapshot = self.builder.build().await?;
        let generation = snapshot.generation();
        self.handle.store(snapshot).await;
        Ok(generation)
    }

    /// Run the refresh loop forever. Spawn this on its own task.
    pub async fn run(self) {
        let mut ticker = interval(self.poll_interval);
        loop {
            ticker.tick().await;
            match self.refresh_once().await {
                Ok(generation) => {
                    info!(generation, "fleet snapshot refreshed");
                }
                Err(err) => {
                    warn!(error = %err, "fleet snapshot build failed; keeping previous snapshot");
                }
            }
        }
    }
}

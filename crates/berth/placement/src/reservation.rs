//! Serialized check-then-reserve.

use berth_resources::{ClusterCapacity, DatastoreCapacity};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{PlacementError, PlacementResult};

/// Serializes capacity checks with the allocation that commits them.
///
/// A single read of `free_memory` racing another placement is not enough to
/// decide a reservation: both callers could observe the same free figure
/// and both allocate. Holding this guard's lock across check-and-allocate
/// closes that window for every caller routing through the same guard.
pub struct ReservationGuard {
    gate: Mutex<()>,
}

impl ReservationGuard {
    pub fn new() -> Self {
        Self {
            gate: Mutex::new(()),
        }
    }

    /// Check capacity and extend the speculative overlay atomically.
    ///
    /// Memory is admitted only when the cluster keeps
    /// [`ClusterCapacity::MEMORY_HEADROOM_MB`] of slack after the
    /// reservation would land. On any refusal nothing is allocated.
    pub async fn reserve(
        &self,
        cluster: &ClusterCapacity,
        memory_mb: i64,
        disk: Option<(&DatastoreCapacity, i64)>,
    ) -> PlacementResult<()> {
        let _gate = self.gate.lock().await;

        let free_mb = cluster.free_memory().await?;
        if free_mb - ClusterCapacity::MEMORY_HEADROOM_MB < memory_mb {
            return Err(PlacementError::InsufficientMemory {
                cluster: cluster.name().to_string(),
                requested_mb: memory_mb,
                free_mb,
            });
        }

        if let Some((datastore, disk_mb)) = disk {
            let free_space = datastore.free_space();
            if free_space < disk_mb {
                return Err(PlacementError::InsufficientDisk {
                    datastore: datastore.name().to_string(),
                    requested_mb: disk_mb,
                    free_mb: free_space,
                });
            }
        }

        cluster.allocate(memory_mb);
        if let Some((datastore, disk_mb)) = disk {
            datastore.allocate(disk_mb);
        }

        debug!(
            cluster = %cluster.name(),
            memory_mb,
            disk_mb = disk.map(|(_, mb)| mb).unwrap_or(0),
            "reserved capacity"
        );
        Ok(())
    }
}

impl Default for ReservationGuard {
    fn default() -> Self {
        Self::new()
    }
}

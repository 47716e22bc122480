//! Picker traits implemented by the placement policy.

use async_trait::async_trait;
use berth_resources::{ClusterCapacity, DatastoreCapacity};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::PlacementResult;

/// Chooses the cluster for a new workload.
///
/// Implementations receive live accounting records and are expected to read
/// `free_memory` and disk totals at decision time, factoring in
/// [`ClusterCapacity::MEMORY_HEADROOM_MB`] and any locality the existing
/// persistent disks impose.
#[async_trait]
pub trait ClusterPicker: Send + Sync {
    async fn pick_cluster(
        &self,
        candidates: &HashMap<String, Arc<ClusterCapacity>>,
        memory_mb: i64,
        ephemeral_disk_mb: i64,
        existing_disks: &HashMap<String, i64>,
    ) -> PlacementResult<String>;
}

/// Chooses the ephemeral datastore within an already-picked cluster.
#[async_trait]
pub trait DatastorePicker: Send + Sync {
    async fn pick_datastore(
        &self,
        candidates: &HashMap<String, Arc<DatastoreCapacity>>,
        disk_mb: i64,
    ) -> PlacementResult<String>;
}

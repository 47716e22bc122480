//! Per-cycle construction of the fleet's accounting records.

use berth_resources::ClusterCapacity;
use berth_telemetry::TelemetrySource;
use berth_types::{ClusterConfig, ClusterFailurePolicy, DatacenterConfig, DatastorePatterns};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{SnapshotError, SnapshotResult};
use crate::snapshot::FleetSnapshot;

/// Assembles one [`FleetSnapshot`] per poll cycle.
///
/// Construction runs serially on the calling task. Each cluster's property
/// bag is fetched up front so that record construction itself performs no
/// network calls; the expensive utilization fetch stays deferred inside the
/// records.
pub struct SnapshotBuilder {
    telemetry: Arc<dyn TelemetrySource>,
    datacenter: DatacenterConfig,
    patterns: DatastorePatterns,
    failure_policy: ClusterFailurePolicy,
    generation: AtomicU64,
}

impl fmt::Debug for SnapshotBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotBuilder")
            .field("datacenter", &self.datacenter)
            .field("failure_policy", &self.failure_policy)
            .field("generation", &self.generation)
            .finish()
    }
}

impl SnapshotBuilder {
    /// Create a builder for the given datacenter.
    ///
    /// Compiles the datacenter's datastore patterns once; every record of
    /// every cycle partitions with the same compiled patterns.
    pub fn new(
        telemetry: Arc<dyn TelemetrySource>,
        datacenter: DatacenterConfig,
        failure_policy: ClusterFailurePolicy,
    ) -> SnapshotResult<Self> {
        let patterns = DatastorePatterns::from_datacenter(&datacenter)?;
        Ok(Self {
            telemetry,
            datacenter,
            patterns,
            failure_policy,
            generation: AtomicU64::new(0),
        })
    }

    /// Build a fresh snapshot from current telemetry.
    ///
    /// A cluster whose telemetry fetch hard-fails is handled per the
    /// configured [`ClusterFailurePolicy`]: dropped from this cycle's pool,
    /// or failing the whole cycle. A degraded cluster is NOT a failure; it
    /// stays in the pool and accounts itself as having no free memory.
    pub async fn build(&self) -> SnapshotResult<FleetSnapshot> {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        let mut clusters = HashMap::new();
        for config in &self.datacenter.clusters {
            match self.build_cluster(config).await {
                Ok(record) => {
                    clusters.insert(config.name.clone(), Arc::new(record));
                }
                Err(err) => match self.failure_policy {
                    ClusterFailurePolicy::DropCluster => {
                        warn!(
                            cluster = %config.name,
                            error = %err,
                            "dropping cluster from this snapshot cycle"
                        );
                    }
                    ClusterFailurePolicy::AbortCycle => return Err(err),
                },
            }
        }

        debug!(
            datacenter = %self.datacenter.name,
            generation,
            clusters = clusters.len(),
            "assembled fleet snapshot"
        );
        Ok(FleetSnapshot::new(clusters, generation))
    }

    async fn build_cluster(&self, config: &ClusterConfig) -> SnapshotResult<ClusterCapacity> {
        let properties = self
            .telemetry
            .cluster_properties(&config.name)
            .await
            .map_err(|source| SnapshotError::ClusterFailed {
                cluster: config.name.clone(),
                source,
            })?
            .ok_or_else(|| SnapshotError::ClusterMissing {
                cluster: config.name.clone(),
            })?;

        Ok(ClusterCapacity::new(
            config,
            self.patterns.clone(),
            self.datacenter.mem_overcommit,
            properties,
            Arc::clone(&self.telemetry),
        ))
    }
}

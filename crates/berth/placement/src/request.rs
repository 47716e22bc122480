//! A single workload-placement request.

use berth_resources::ClusterCapacity;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::OnceLock;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::error::{PlacementError, PlacementResult};
use crate::picker::{ClusterPicker, DatastorePicker};

/// The resolved outcome of a placement request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Generated workload name.
    pub vm_name: String,

    /// Name of the selected cluster.
    pub cluster: String,

    /// Name of the selected ephemeral datastore.
    pub datastore: String,
}

/// Sizing parameters for one workload, with memoized pick results.
///
/// Pick decisions are computed once per request: repeated `place` calls
/// return the same cluster and datastore, and the generated workload name
/// is stable for the request's lifetime.
pub struct PlacementRequest {
    memory_mb: i64,
    ephemeral_disk_mb: i64,
    stemcell_size_mb: i64,
    existing_disks: HashMap<String, i64>,

    vm_name: OnceLock<String>,
    cluster_name: OnceCell<String>,
    datastore_name: OnceCell<String>,
}

impl PlacementRequest {
    pub fn new(memory_mb: i64, ephemeral_disk_mb: i64, stemcell_size_mb: i64) -> Self {
        Self {
            memory_mb,
            ephemeral_disk_mb,
            stemcell_size_mb,
            existing_disks: HashMap::new(),
            vm_name: OnceLock::new(),
            cluster_name: OnceCell::new(),
            datastore_name: OnceCell::new(),
        }
    }

    /// Attach the workload's existing persistent disks (datastore name to
    /// disk size in MB) so the cluster picker can weigh locality.
    pub fn with_existing_disks(mut self, existing_disks: HashMap<String, i64>) -> Self {
        self.existing_disks = existing_disks;
        self
    }

    pub fn memory_mb(&self) -> i64 {
        self.memory_mb
    }

    pub fn ephemeral_disk_mb(&self) -> i64 {
        self.ephemeral_disk_mb
    }

    /// Disk footprint the ephemeral datastore must absorb: the ephemeral
    /// disk itself, swap sized to memory, and the stemcell image.
    pub fn total_ephemeral_footprint_mb(&self) -> i64 {
        self.ephemeral_disk_mb + self.memory_mb + self.stemcell_size_mb
    }

    /// Generated workload name, stable per request.
    pub fn vm_name(&self) -> &str {
        self.vm_name
            .get_or_init(|| format!("vm-{}", Uuid::new_v4()))
    }

    /// Resolve cluster and datastore through the pickers.
    ///
    /// Both picks are memoized; the pickers run at most once per request
    /// even when `place` is called again (for example to re-read the
    /// decision after a reservation).
    pub async fn place(
        &self,
        clusters: &HashMap<String, Arc<ClusterCapacity>>,
        cluster_picker: &dyn ClusterPicker,
        datastore_picker: &dyn DatastorePicker,
    ) -> PlacementResult<Placement> {
        let cluster_name = self
            .cluster_name
            .get_or_try_init(|| {
                cluster_picker.pick_cluster(
                    clusters,
                    self.memory_mb,
                    self.total_ephemeral_footprint_mb(),
                    &self.existing_disks,
                )
            })
            .await?;

        let cluster = clusters
            .get(cluster_name)
            .ok_or_else(|| PlacementError::UnknownCluster {
                name: cluster_name.clone(),
            })?;

        let datastore_name = self
            .datastore_name
            .get_or_try_init(|| {
                datastore_picker.pick_datastore(cluster.ephemeral_datastores(), self.ephemeral_disk_mb)
            })
            .await?;

        Ok(Placement {
            vm_name: self.vm_name().to_string(),
            cluster: cluster_name.clone(),
            datastore: datastore_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use berth_telemetry::mock::StaticTelemetry;
    use berth_telemetry::{
        ClusterProperties, DatastoreProperties, HealthStatus, MemoryUsage, ResourcePoolSummary,
    };
    use berth_types::{
        ClusterConfig, ClusterRef, DatastorePatterns, DatastoreRef, ResourcePoolRef, BYTES_PER_MB,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Picks the first candidate (name order) with room; counts its calls.
    struct FirstFit {
        calls: AtomicUsize,
    }

    impl FirstFit {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ClusterPicker for FirstFit {
        async fn pick_cluster(
            &self,
            candidates: &HashMap<String, Arc<ClusterCapacity>>,
            memory_mb: i64,
            ephemeral_disk_mb: i64,
            _existing_disks: &HashMap<String, i64>,
        ) -> PlacementResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut names: Vec<_> = candidates.keys().cloned().collect();
            names.sort();
            for name in names {
                let cluster = &candidates[&name];
                if cluster.free_memory().await? >= memory_mb
                    && cluster.total_free_ephemeral_disk_in_mb() >= ephemeral_disk_mb
                {
                    return Ok(name);
                }
            }
            Err(PlacementError::NoClusterFits {
                requested_mb: memory_mb,
            })
        }
    }

    #[async_trait]
    impl DatastorePicker for FirstFit {
        async fn pick_datastore(
            &self,
            candidates: &HashMap<String, Arc<berth_resources::DatastoreCapacity>>,
            disk_mb: i64,
        ) -> PlacementResult<String> {
            let mut names: Vec<_> = candidates.keys().cloned().collect();
            names.sort();
            for name in names {
                if candidates[&name].free_space() >= disk_mb {
                    return Ok(name);
                }
            }
            Err(PlacementError::NoDatastoreFits {
                requested_mb: disk_mb,
            })
        }
    }

    fn pool_cluster(name: &str, pool: &str, telemetry: &StaticTelemetry) -> ClusterCapacity {
        ClusterCapacity::new(
            &ClusterConfig::new(name).with_resource_pool("workloads"),
            DatastorePatterns::compile("^eph-", "^persist-").unwrap(),
            1.0,
            ClusterProperties {
                moref: ClusterRef::new(format!("domain-{name}")),
                resource_pool: ResourcePoolRef::new(pool),
                hosts: vec![],
                datastores: vec![DatastoreProperties {
                    name: format!("eph-{name}"),
                    moref: DatastoreRef::new(format!("datastore-{name}")),
                    capacity_bytes: 65536 * BYTES_PER_MB,
                    free_space_bytes: 32768 * BYTES_PER_MB,
                }],
            },
            Arc::new(telemetry.clone()),
        )
    }

    fn green_pool(free_mb: i64) -> ResourcePoolSummary {
        ResourcePoolSummary {
            status: HealthStatus::Green,
            memory: MemoryUsage {
                max_usage_bytes: free_mb * BYTES_PER_MB,
                overall_usage_bytes: 0,
            },
        }
    }

    fn candidates(telemetry: &StaticTelemetry) -> HashMap<String, Arc<ClusterCapacity>> {
        let mut clusters = HashMap::new();
        clusters.insert(
            "cl-a".to_string(),
            Arc::new(pool_cluster("cl-a", "resgroup-a", telemetry)),
        );
        clusters.insert(
            "cl-b".to_string(),
            Arc::new(pool_cluster("cl-b", "resgroup-b", telemetry)),
        );
        clusters
    }

    fn telemetry() -> StaticTelemetry {
        StaticTelemetry::new()
            .with_pool(ResourcePoolRef::new("resgroup-a"), green_pool(1024))
            .with_pool(ResourcePoolRef::new("resgroup-b"), green_pool(8192))
    }

    #[tokio::test]
    async fn test_place_skips_clusters_without_room() {
        let telemetry = telemetry();
        let clusters = candidates(&telemetry);
        let picker = FirstFit::new();
        let request = PlacementRequest::new(4096, 1024, 512);

        let placement = request.place(&clusters, &picker, &picker).await.unwrap();
        assert_eq!(placement.cluster, "cl-b");
        assert_eq!(placement.datastore, "eph-cl-b");
        assert!(placement.vm_name.starts_with("vm-"));
    }

    #[tokio::test]
    async fn test_place_memoizes_pick_decisions() {
        let telemetry = telemetry();
        let clusters = candidates(&telemetry);
        let picker = FirstFit::new();
        let request = PlacementRequest::new(512, 1024, 512);

        let first = request.place(&clusters, &picker, &picker).await.unwrap();
        let second = request.place(&clusters, &picker, &picker).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(picker.calls(), 1);
    }

    #[tokio::test]
    async fn test_place_fails_when_nothing_fits() {
        let telemetry = telemetry();
        let clusters = candidates(&telemetry);
        let picker = FirstFit::new();
        let request = PlacementRequest::new(65536, 1024, 512);

        let err = request.place(&clusters, &picker, &picker).await.unwrap_err();
        assert!(matches!(err, PlacementError::NoClusterFits { .. }));
    }

    #[tokio::test]
    async fn test_vm_name_is_stable() {
        let request = PlacementRequest::new(512, 1024, 512);
        let name = request.vm_name().to_string();
        assert_eq!(request.vm_name(), name);
    }

    #[test]
    fn test_total_ephemeral_footprint() {
        let request = PlacementRequest::new(4096, 10240, 3072);
        assert_eq!(request.total_ephemeral_footprint_mb(), 17408);
    }
}

//! Per-cluster capacity accounting.

use berth_telemetry::{samples, ClusterProperties, DatastoreProperties, TelemetrySource};
use berth_types::{bytes_to_mb, mb_to_gb, ClusterConfig, ClusterRef, DatastorePatterns, HostRef, ResourcePoolRef};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::OnceCell;
use tracing::warn;

use crate::datastore::DatastoreCapacity;
use crate::error::{ResourceError, ResourceResult};

/// Sample window for the host memory-utilization counter.
const HOST_MEMORY_SAMPLE_WINDOW: u32 = 5;

/// The utilization counter reports hundredths of a percent.
const USAGE_COUNTER_SCALE: f64 = 10_000.0;

/// How a cluster's synced memory baseline is obtained.
///
/// Chosen once at construction from the cluster configuration; each variant
/// carries exactly the inputs its fetch needs. The pool-level utilization
/// query does not work against a cluster's implicit root pool, so raw
/// host-by-host aggregation is mandatory when no explicit pool is
/// configured.
#[derive(Debug)]
enum MemorySource {
    RawCluster { hosts: Vec<HostRef> },
    ResourcePool { pool: ResourcePoolRef },
}

/// Capacity record for one compute cluster.
///
/// Construction is cheap and performs no network calls; the synced memory
/// baseline is fetched lazily on first use and memoized for the record's
/// lifetime. A new record must be constructed to pick up fresh telemetry,
/// which the snapshot cycle does every poll interval.
pub struct ClusterCapacity {
    name: String,
    moref: ClusterRef,
    resource_pool: ResourcePoolRef,
    memory_source: MemorySource,
    datastore_properties: Vec<DatastoreProperties>,
    patterns: DatastorePatterns,
    mem_overcommit: f64,
    allocated_after_sync: AtomicI64,
    synced_free_memory: OnceCell<i64>,
    all_datastores: OnceLock<HashMap<String, Arc<DatastoreCapacity>>>,
    ephemeral_datastores: OnceLock<HashMap<String, Arc<DatastoreCapacity>>>,
    persistent_datastores: OnceLock<HashMap<String, Arc<DatastoreCapacity>>>,
    telemetry: Arc<dyn TelemetrySource>,
}

impl ClusterCapacity {
    /// Safety margin callers are expected to factor into their placement
    /// threshold. Never subtracted automatically.
    pub const MEMORY_HEADROOM_MB: i64 = 128;

    /// Create a record from the operator configuration, the datacenter's
    /// compiled datastore patterns, and a prefetched property bag.
    pub fn new(
        config: &ClusterConfig,
        patterns: DatastorePatterns,
        mem_overcommit: f64,
        properties: ClusterProperties,
        telemetry: Arc<dyn TelemetrySource>,
    ) -> Self {
        let memory_source = match &config.resource_pool {
            None => MemorySource::RawCluster {
                hosts: properties.hosts.clone(),
            },
            Some(_) => MemorySource::ResourcePool {
                pool: properties.resource_pool.clone(),
            },
        };

        Self {
            name: config.name.clone(),
            moref: properties.moref,
            resource_pool: properties.resource_pool,
            memory_source,
            datastore_properties: properties.datastores,
            patterns,
            mem_overcommit,
            allocated_after_sync: AtomicI64::new(0),
            synced_free_memory: OnceCell::new(),
            all_datastores: OnceLock::new(),
            ephemeral_datastores: OnceLock::new(),
            persistent_datastores: OnceLock::new(),
            telemetry,
        }
    }

    /// Cluster name from the operator configuration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Platform reference for the cluster.
    pub fn moref(&self) -> &ClusterRef {
        &self.moref
    }

    /// The cluster's resource-pool handle.
    pub fn resource_pool(&self) -> &ResourcePoolRef {
        &self.resource_pool
    }

    /// MB of memory committed by this process since construction.
    pub fn allocated_after_sync(&self) -> i64 {
        self.allocated_after_sync.load(Ordering::Relaxed)
    }

    /// Free memory in MB after subtracting the speculative overlay.
    ///
    /// The first call triggers the memoized telemetry fetch; afterwards the
    /// computation is pure in-memory state. The overcommit multiplier
    /// amplifies the cost of allocations made since the last sync, biasing
    /// placement away from clusters under heavy concurrent load.
    pub async fn free_memory(&self) -> ResourceResult<i64> {
        let synced = self.synced_free_memory().await?;
        let overlay = (self.allocated_after_sync() as f64 * self.mem_overcommit).round() as i64;
        Ok(synced - overlay)
    }

    /// Mark a memory reservation against the cached utilization data.
    ///
    /// Safe under concurrent callers; the counter is an independent atomic.
    /// Negative amounts are a caller-contract violation and are not guarded.
    pub fn allocate(&self, memory_mb: i64) {
        self.allocated_after_sync.fetch_add(memory_mb, Ordering::Relaxed);
    }

    /// The full datastore set visible to the cluster, keyed by name.
    pub fn all_datastores(&self) -> &HashMap<String, Arc<DatastoreCapacity>> {
        self.all_datastores.get_or_init(|| {
            self.datastore_properties
                .iter()
                .map(|props| {
                    (
                        props.name.clone(),
                        Arc::new(DatastoreCapacity::from_properties(props)),
                    )
                })
                .collect()
        })
    }

    /// Datastores usable for ephemeral disks.
    pub fn ephemeral_datastores(&self) -> &HashMap<String, Arc<DatastoreCapacity>> {
        self.ephemeral_datastores
            .get_or_init(|| self.select_datastores(|name| self.patterns.is_ephemeral(name)))
    }

    /// Datastores usable for persistent disks.
    pub fn persistent_datastores(&self) -> &HashMap<String, Arc<DatastoreCapacity>> {
        self.persistent_datastores
            .get_or_init(|| self.select_datastores(|name| self.patterns.is_persistent(name)))
    }

    /// Look up a persistent datastore by name.
    pub fn persistent(&self, datastore_name: &str) -> Option<Arc<DatastoreCapacity>> {
        self.persistent_datastores().get(datastore_name).cloned()
    }

    /// Sum of free space across the ephemeral partition, reflecting the
    /// live allocation state of each datastore.
    pub fn total_free_ephemeral_disk_in_mb(&self) -> i64 {
        self.ephemeral_datastores()
            .values()
            .map(|ds| ds.free_space())
            .sum()
    }

    /// Sum of free space across the persistent partition.
    pub fn total_free_persistent_disk_in_mb(&self) -> i64 {
        self.persistent_datastores()
            .values()
            .map(|ds| ds.free_space())
            .sum()
    }

    /// Human-readable capacity summary.
    pub async fn describe(&self) -> ResourceResult<String> {
        Ok(format!(
            "{} has {}mb/{}gb/{}gb",
            self.name,
            self.free_memory().await?,
            mb_to_gb(self.total_free_ephemeral_disk_in_mb()),
            mb_to_gb(self.total_free_persistent_disk_in_mb()),
        ))
    }

    fn select_datastores(
        &self,
        matches: impl Fn(&str) -> bool,
    ) -> HashMap<String, Arc<DatastoreCapacity>> {
        self.all_datastores()
            .iter()
            .filter(|(name, _)| matches(name.as_str()))
            .map(|(name, ds)| (name.clone(), Arc::clone(ds)))
            .collect()
    }

    /// Free memory in MB as of the last telemetry fetch, computed once and
    /// memoized for the record's lifetime.
    async fn synced_free_memory(&self) -> ResourceResult<i64> {
        self.synced_free_memory
            .get_or_try_init(|| async {
                match &self.memory_source {
                    MemorySource::RawCluster { hosts } => {
                        self.fetch_cluster_utilization(hosts).await
                    }
                    MemorySource::ResourcePool { pool } => {
                        self.fetch_resource_pool_utilization(pool).await
                    }
                }
            })
            .await
            .copied()
    }

    /// Aggregate utilization host by host.
    ///
    /// Hosts in maintenance mode contribute no usable capacity and are
    /// dropped before the counter query, even if the performance manager
    /// would report a utilization value for them.
    async fn fetch_cluster_utilization(&self, hosts: &[HostRef]) -> ResourceResult<i64> {
        let host_properties = self.telemetry.host_properties(hosts).await?;

        let active_hosts: Vec<HostRef> = host_properties
            .iter()
            .filter(|(_, props)| !props.in_maintenance_mode)
            .map(|(host, _)| host.clone())
            .collect();
        if active_hosts.is_empty() {
            return Ok(0);
        }

        let counters = self
            .telemetry
            .memory_usage_samples(&active_hosts, HOST_MEMORY_SAMPLE_WINDOW)
            .await?;

        let mut cluster_free_bytes: i64 = 0;
        for (host, series) in &counters {
            if let Some(props) = host_properties.get(host) {
                let fraction_used = samples::average(series) / USAGE_COUNTER_SCALE;
                let free_bytes = ((1.0 - fraction_used) * props.memory_size_bytes as f64) as i64;
                cluster_free_bytes += free_bytes;
            }
        }

        Ok(bytes_to_mb(cluster_free_bytes))
    }

    /// Read utilization from the configured resource pool's runtime
    /// summary.
    ///
    /// The figures are only reliable while the pool is healthy; a degraded
    /// pool is accounted as having no free memory this cycle so placement
    /// skips it without aborting the fleet snapshot.
    async fn fetch_resource_pool_utilization(
        &self,
        pool: &ResourcePoolRef,
    ) -> ResourceResult<i64> {
        let summary = self
            .telemetry
            .resource_pool_summary(pool)
            .await?
            .ok_or_else(|| ResourceError::SummaryUnavailable {
                cluster: self.name.clone(),
                pool: pool.clone(),
            })?;

        if summary.status.is_healthy() {
            let memory = summary.memory;
            Ok(bytes_to_mb(memory.max_usage_bytes - memory.overall_usage_bytes))
        } else {
            warn!(
                cluster = %self.name,
                pool = %pool,
                status = %summary.status,
                "ignoring cluster utilization; resource pool state is unreliable"
            );
            Ok(0)
        }
    }
}

impl fmt::Display for ClusterCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Cluster: {} / {}>", self.moref, self.name)
    }
}

impl fmt::Debug for ClusterCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterCapacity")
            .field("name", &self.name)
            .field("moref", &self.moref)
            .field("memory_source", &self.memory_source)
            .field("mem_overcommit", &self.mem_overcommit)
            .field("allocated_after_sync", &self.allocated_after_sync())
            .finish()
    }
}

//! Operator-facing configuration for fleet capacity accounting.
//!
//! Everything that shapes the accounting layer is passed in explicitly at
//! construction time: datastore name patterns, the memory overcommit
//! multiplier, and per-cluster resource-pool designations. There are no
//! process-wide defaults or globals, so multiple fleets (and tests) can run
//! with different values concurrently.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// Configuration for a single compute cluster, as supplied by the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Fleet-unique cluster name. This is the identity of the accounting
    /// record, independent of the platform-side object.
    pub name: String,

    /// Optional name of an explicit resource pool inside the cluster.
    ///
    /// When set, memory utilization is read from the pool's runtime summary;
    /// when absent, utilization is aggregated host by host, because the
    /// pool-level query does not work against the implicit root pool.
    pub resource_pool: Option<String>,
}

impl ClusterConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_pool: None,
        }
    }

    pub fn with_resource_pool(mut self, pool: impl Into<String>) -> Self {
        self.resource_pool = Some(pool.into());
        self
    }
}

/// Configuration for a datacenter and the clusters inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatacenterConfig {
    /// Datacenter name, used in diagnostics only.
    pub name: String,

    /// Pattern matching the names of datastores usable for ephemeral disks.
    pub datastore_pattern: String,

    /// Pattern matching the names of datastores usable for persistent disks.
    pub persistent_datastore_pattern: String,

    /// Multiplier applied to speculative memory allocations when computing
    /// free memory. Values above 1.0 bias placement away from clusters that
    /// are absorbing many concurrent placements between telemetry refreshes.
    #[serde(default = "default_mem_overcommit")]
    pub mem_overcommit: f64,

    /// Clusters participating in placement.
    pub clusters: Vec<ClusterConfig>,
}

fn default_mem_overcommit() -> f64 {
    1.0
}

/// Compiled datastore name patterns for one datacenter.
///
/// A datastore whose name matches neither pattern is excluded from both
/// partitions; it can still appear in a cluster's full datastore set.
#[derive(Debug, Clone)]
pub struct DatastorePatterns {
    ephemeral: Regex,
    persistent: Regex,
}

impl DatastorePatterns {
    /// Compile the two patterns from their configured source strings.
    pub fn compile(ephemeral: &str, persistent: &str) -> ConfigResult<Self> {
        Ok(Self {
            ephemeral: compile_pattern(ephemeral)?,
            persistent: compile_pattern(persistent)?,
        })
    }

    /// Compile the patterns carried by a datacenter configuration.
    pub fn from_datacenter(config: &DatacenterConfig) -> ConfigResult<Self> {
        Self::compile(&config.datastore_pattern, &config.persistent_datastore_pattern)
    }

    /// Whether the named datastore belongs to the ephemeral partition.
    pub fn is_ephemeral(&self, datastore_name: &str) -> bool {
        self.ephemeral.is_match(datastore_name)
    }

    /// Whether the named datastore belongs to the persistent partition.
    pub fn is_persistent(&self, datastore_name: &str) -> bool {
        self.persistent.is_match(datastore_name)
    }
}

fn compile_pattern(pattern: &str) -> ConfigResult<Regex> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Policy for a cluster whose telemetry fetch hard-fails during snapshot
/// assembly.
///
/// This is distinct from a degraded-but-readable cluster (an unhealthy
/// resource pool), which always stays in the pool with a zero baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterFailurePolicy {
    /// Drop the failed cluster from this cycle's pool and keep building.
    DropCluster,

    /// Fail the whole snapshot cycle.
    AbortCycle,
}

impl Default for ClusterFailurePolicy {
    fn default() -> Self {
        ClusterFailurePolicy::DropCluster
    }
}

/// Configuration for the fleet-snapshot cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Interval between snapshot rebuilds.
    pub poll_interval: Duration,

    /// What to do when a cluster's telemetry fetch hard-fails.
    #[serde(default)]
    pub failure_policy: ClusterFailurePolicy,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            failure_policy: ClusterFailurePolicy::default(),
        }
    }
}

//! Typed property records returned by the telemetry source.
//!
//! These are point-in-time values: accurate when fetched, stale immediately
//! after. The accounting records in berth-resources reconcile them with the
//! in-process allocation ledger.

use berth_types::{ClusterRef, DatastoreRef, HostRef, ResourcePoolRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall health reported for a managed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Entity is healthy; its utilization figures can be relied on.
    Green,
    /// Entity has a warning condition.
    Yellow,
    /// Entity has a problem.
    Red,
    /// Health is unknown.
    Gray,
}

impl HealthStatus {
    /// Utilization figures are only trustworthy for healthy entities.
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Green)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Green => write!(f, "green"),
            HealthStatus::Yellow => write!(f, "yellow"),
            HealthStatus::Red => write!(f, "red"),
            HealthStatus::Gray => write!(f, "gray"),
        }
    }
}

/// Memory usage figures from a resource pool's runtime summary, in bytes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MemoryUsage {
    /// Maximum memory the pool may use.
    pub max_usage_bytes: i64,

    /// Memory currently in use across the pool.
    pub overall_usage_bytes: i64,
}

/// Runtime summary of a resource pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePoolSummary {
    /// Overall health of the pool.
    pub status: HealthStatus,

    /// Memory usage figures.
    pub memory: MemoryUsage,
}

/// Per-host properties needed for raw-cluster utilization aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostProperties {
    /// Total physical memory of the host, in bytes.
    pub memory_size_bytes: i64,

    /// Whether the host is currently in maintenance mode. Hosts in
    /// maintenance contribute no usable capacity.
    pub in_maintenance_mode: bool,
}

/// Capacity figures for one datastore, at byte granularity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatastoreProperties {
    /// Datastore name, unique within the cluster's datastore set.
    pub name: String,

    /// Opaque platform reference, kept for diagnostics only.
    pub moref: DatastoreRef,

    /// Total capacity in bytes.
    pub capacity_bytes: i64,

    /// Free capacity in bytes as of the fetch.
    pub free_space_bytes: i64,
}

/// Prefetched property bag for one cluster.
///
/// Snapshot assembly fetches this once per cluster per cycle; accounting
/// record construction then performs no further network calls until the
/// lazily memoized utilization fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterProperties {
    /// Platform reference for the cluster itself.
    pub moref: ClusterRef,

    /// Resource pool to query when the cluster configuration designates an
    /// explicit pool.
    pub resource_pool: ResourcePoolRef,

    /// Every host in the cluster, including hosts in maintenance mode.
    pub hosts: Vec<HostRef>,

    /// Every datastore visible to the cluster.
    pub datastores: Vec<DatastoreProperties>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_green_is_healthy() {
        assert!(HealthStatus::Green.is_healthy());
        assert!(!HealthStatus::Yellow.is_healthy());
        assert!(!HealthStatus::Red.is_healthy());
        assert!(!HealthStatus::Gray.is_healthy());
    }

    #[test]
    fn test_health_status_display() {
        assert_eq!(HealthStatus::Yellow.to_string(), "yellow");
    }
}

//! The telemetry source trait.

use async_trait::async_trait;
use berth_types::{HostRef, ResourcePoolRef};
use std::collections::HashMap;

use crate::error::TelemetryResult;
use crate::properties::{ClusterProperties, HostProperties, ResourcePoolSummary};

/// Query capability against the virtualization platform.
///
/// Implementations own every transport concern: sessions, timeouts and
/// retries. The accounting layer performs no retries of its own, and only
/// calls these methods during snapshot assembly and the one-time memoized
/// utilization fetch of each cluster record.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetch the full property bag for one configured cluster.
    ///
    /// Returns `Ok(None)` when the platform knows no cluster by that name.
    async fn cluster_properties(&self, name: &str) -> TelemetryResult<Option<ClusterProperties>>;

    /// Bulk-fetch memory size and maintenance state for a set of hosts.
    async fn host_properties(
        &self,
        hosts: &[HostRef],
    ) -> TelemetryResult<HashMap<HostRef, HostProperties>>;

    /// Fetch the memory-utilization counter series for a set of hosts.
    ///
    /// Samples are in hundredths of a percent, newest-last, bounded by
    /// `max_samples`. Averaging is the caller's job ([`crate::samples`]).
    /// A host may be absent from the result when the performance manager
    /// has no data for it.
    async fn memory_usage_samples(
        &self,
        hosts: &[HostRef],
        max_samples: u32,
    ) -> TelemetryResult<HashMap<HostRef, Vec<f64>>>;

    /// Fetch the runtime summary for a resource pool.
    ///
    /// `Ok(None)` means the property fetch yielded no data at all, which is
    /// distinct from an unhealthy pool: the former is a hard per-cluster
    /// failure, the latter a degraded-but-continuable state.
    async fn resource_pool_summary(
        &self,
        pool: &ResourcePoolRef,
    ) -> TelemetryResult<Option<ResourcePoolSummary>>;
}

//! In-memory telemetry fixture for tests.
//!
//! Serves canned property bags, host properties, counter series and pool
//! summaries. Not suitable for anything but tests; real deployments
//! implement [`TelemetrySource`] over the platform's RPC transport.

use async_trait::async_trait;
use berth_types::{HostRef, ResourcePoolRef};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{TelemetryError, TelemetryResult};
use crate::properties::{ClusterProperties, HostProperties, ResourcePoolSummary};
use crate::source::TelemetrySource;

/// Telemetry source backed by fixed in-memory fixtures.
#[derive(Clone, Default)]
pub struct StaticTelemetry {
    clusters: HashMap<String, ClusterProperties>,
    failing_clusters: HashSet<String>,
    hosts: HashMap<HostRef, HostProperties>,
    samples: HashMap<HostRef, Vec<f64>>,
    pools: HashMap<ResourcePoolRef, ResourcePoolSummary>,

    host_property_calls: Arc<AtomicUsize>,
    sample_calls: Arc<AtomicUsize>,
    pool_summary_calls: Arc<AtomicUsize>,
}

impl StaticTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cluster property bag.
    pub fn with_cluster(mut self, name: impl Into<String>, properties: ClusterProperties) -> Self {
        self.clusters.insert(name.into(), properties);
        self
    }

    /// Make `cluster_properties` fail with a transport error for this name.
    pub fn with_failing_cluster(mut self, name: impl Into<String>) -> Self {
        self.failing_clusters.insert(name.into());
        self
    }

    /// Register host properties.
    pub fn with_host(mut self, host: HostRef, properties: HostProperties) -> Self {
        self.hosts.insert(host, properties);
        self
    }

    /// Register a memory-usage counter series for a host.
    pub fn with_samples(mut self, host: HostRef, samples: Vec<f64>) -> Self {
        self.samples.insert(host, samples);
        self
    }

    /// Register a resource-pool runtime summary. Pools without a registered
    /// summary report no data at all.
    pub fn with_pool(mut self, pool: ResourcePoolRef, summary: ResourcePoolSummary) -> Self {
        self.pools.insert(pool, summary);
        self
    }

    /// Number of `host_properties` calls served.
    pub fn host_property_calls(&self) -> usize {
        self.host_property_calls.load(Ordering::SeqCst)
    }

    /// Number of `memory_usage_samples` calls served.
    pub fn sample_calls(&self) -> usize {
        self.sample_calls.load(Ordering::SeqCst)
    }

    /// Number of `resource_pool_summary` calls served.
    pub fn pool_summary_calls(&self) -> usize {
        self.pool_summary_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TelemetrySource for StaticTelemetry {
    async fn cluster_properties(&self, name: &str) -> TelemetryResult<Option<ClusterProperties>> {
        if self.failing_clusters.contains(name) {
            return Err(TelemetryError::Transport(format!(
                "injected failure for cluster '{name}'"
            )));
        }
        Ok(self.clusters.get(name).cloned())
    }

    async fn host_properties(
        &self,
        hosts: &[HostRef],
    ) -> TelemetryResult<HashMap<HostRef, HostProperties>> {
        self.host_property_calls.fetch_add(1, Ordering::SeqCst);
        Ok(hosts
            .iter()
            .filter_map(|host| {
                self.hosts
                    .get(host)
                    .map(|props| (host.clone(), props.clone()))
            })
            .collect())
    }

    async fn memory_usage_samples(
        &self,
        hosts: &[HostRef],
        _max_samples: u32,
    ) -> TelemetryResult<HashMap<HostRef, Vec<f64>>> {
        self.sample_calls.fetch_add(1, Ordering::SeqCst);
        Ok(hosts
            .iter()
            .filter_map(|host| {
                self.samples
                    .get(host)
                    .map(|series| (host.clone(), series.clone()))
            })
            .collect())
    }

    async fn resource_pool_summary(
        &self,
        pool: &ResourcePoolRef,
    ) -> TelemetryResult<Option<ResourcePoolSummary>> {
        self.pool_summary_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pools.get(pool).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{HealthStatus, MemoryUsage};

    #[tokio::test]
    async fn test_unknown_cluster_is_none() {
        let telemetry = StaticTelemetry::new();
        assert!(telemetry.cluster_properties("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failing_cluster_is_transport_error() {
        let telemetry = StaticTelemetry::new().with_failing_cluster("cl-1");
        assert!(matches!(
            telemetry.cluster_properties("cl-1").await,
            Err(TelemetryError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_pool_without_summary_reports_no_data() {
        let pool = ResourcePoolRef::new("resgroup-1");
        let telemetry = StaticTelemetry::new();
        assert!(telemetry
            .resource_pool_summary(&pool)
            .await
            .unwrap()
            .is_none());
        assert_eq!(telemetry.pool_summary_calls(), 1);
    }

    #[tokio::test]
    async fn test_registered_pool_summary_round_trips() {
        let pool = ResourcePoolRef::new("resgroup-1");
        let telemetry = StaticTelemetry::new().with_pool(
            pool.clone(),
            ResourcePoolSummary {
                status: HealthStatus::Green,
                memory: MemoryUsage {
                    max_usage_bytes: 1024,
                    overall_usage_bytes: 512,
                },
            },
        );

        let summary = telemetry.resource_pool_summary(&pool).await.unwrap().unwrap();
        assert!(summary.status.is_healthy());
        assert_eq!(summary.memory.overall_usage_bytes, 512);
    }
}

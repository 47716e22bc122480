//! An immutable view of the fleet's accounting records.

use berth_resources::ClusterCapacity;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One cycle's worth of cluster accounting records.
///
/// The record set is fixed at construction; the records themselves remain
/// live, accumulating speculative allocations until the snapshot is
/// replaced.
pub struct FleetSnapshot {
    clusters: HashMap<String, Arc<ClusterCapacity>>,
    generation: u64,
    built_at: DateTime<Utc>,
}

impl fmt::Debug for FleetSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FleetSnapshot")
            .field("clusters", &self.clusters.keys().collect::<Vec<_>>())
            .field("generation", &self.generation)
            .field("built_at", &self.built_at)
            .finish()
    }
}

impl FleetSnapshot {
    /// Snapshot with no clusters, used before the first build completes.
    pub fn empty() -> Self {
        Self::new(HashMap::new(), 0)
    }

    pub fn new(clusters: HashMap<String, Arc<ClusterCapacity>>, generation: u64) -> Self {
        Self {
            clusters,
            generation,
            built_at: Utc::now(),
        }
    }

    /// Look up a cluster's accounting record by name.
    pub fn cluster(&self, name: &str) -> Option<Arc<ClusterCapacity>> {
        self.clusters.get(name).cloned()
    }

    /// All cluster records, keyed by name.
    pub fn clusters(&self) -> &HashMap<String, Arc<ClusterCapacity>> {
        &self.clusters
    }

    /// Monotonically increasing build counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When this snapshot was assembled.
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Per-cluster capacity summaries, sorted by cluster name.
    ///
    /// Triggers each cluster's memoized utilization fetch; a cluster whose
    /// fetch fails is reported inline rather than failing the whole
    /// summary.
    pub async fn describe(&self) -> Vec<String> {
        let mut names: Vec<_> = self.clusters.keys().collect();
        names.sort();

        let mut lines = Vec::with_capacity(names.len());
        for name in names {
            let cluster = &self.clusters[name];
            match cluster.describe().await {
                Ok(line) => lines.push(line),
                Err(err) => lines.push(format!("{name} unavailable: {err}")),
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let snapshot = FleetSnapshot::empty();
        assert_eq!(snapshot.generation(), 0);
        assert!(snapshot.is_empty());
        assert!(snapshot.cluster("cl-1").is_none());
    }
}

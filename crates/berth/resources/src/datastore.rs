//! Per-datastore capacity accounting.

use berth_telemetry::DatastoreProperties;
use berth_types::{bytes_to_mb, DatastoreRef};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Capacity record for one storage volume.
///
/// Both capacity figures are fixed at construction from byte-granularity
/// telemetry values; the only mutation afterwards is [`allocate`], which
/// extends the speculative overlay. The record is discarded and replaced
/// wholesale on the next snapshot cycle.
///
/// [`allocate`]: DatastoreCapacity::allocate
pub struct DatastoreCapacity {
    name: String,
    moref: DatastoreRef,
    total_space: i64,
    synced_free_space: i64,
    allocated_after_sync: AtomicI64,
}

impl DatastoreCapacity {
    /// Create a record from byte-granularity capacity figures.
    pub fn new(
        name: impl Into<String>,
        moref: DatastoreRef,
        capacity_bytes: i64,
        free_space_bytes: i64,
    ) -> Self {
        Self {
            name: name.into(),
            moref,
            total_space: bytes_to_mb(capacity_bytes),
            synced_free_space: bytes_to_mb(free_space_bytes),
            allocated_after_sync: AtomicI64::new(0),
        }
    }

    /// Create a record from a prefetched property bag.
    pub fn from_properties(properties: &DatastoreProperties) -> Self {
        Self::new(
            properties.name.clone(),
            properties.moref.clone(),
            properties.capacity_bytes,
            properties.free_space_bytes,
        )
    }

    /// Datastore name, unique within a cluster's datastore set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opaque platform reference, for diagnostics.
    pub fn moref(&self) -> &DatastoreRef {
        &self.moref
    }

    /// Total capacity in MB, fixed at construction.
    pub fn total_space(&self) -> i64 {
        self.total_space
    }

    /// Free capacity in MB as of the last telemetry fetch.
    pub fn synced_free_space(&self) -> i64 {
        self.synced_free_space
    }

    /// MB committed by this process since construction.
    pub fn allocated_after_sync(&self) -> i64 {
        self.allocated_after_sync.load(Ordering::Relaxed)
    }

    /// Free space in MB after subtracting the speculative overlay.
    ///
    /// Not clamped: a negative value signals over-allocation relative to
    /// the stale baseline and must be handled by the caller's placement
    /// policy.
    pub fn free_space(&self) -> i64 {
        self.synced_free_space - self.allocated_after_sync()
    }

    /// Mark a disk reservation against the cached utilization data.
    ///
    /// Safe under concurrent callers; the counter is an independent atomic.
    /// Negative amounts are a caller-contract violation and are not guarded.
    pub fn allocate(&self, amount: i64) {
        self.allocated_after_sync.fetch_add(amount, Ordering::Relaxed);
    }

    /// Human-readable capacity summary.
    pub fn debug_info(&self) -> String {
        format!(
            "{} ({}MB free of {}MB capacity)",
            self.name,
            self.free_space(),
            self.total_space
        )
    }
}

impl fmt::Display for DatastoreCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Datastore: {} / {}>", self.moref, self.name)
    }
}

impl fmt::Debug for DatastoreCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatastoreCapacity")
            .field("name", &self.name)
            .field("moref", &self.moref)
            .field("total_space", &self.total_space)
            .field("synced_free_space", &self.synced_free_space)
            .field("allocated_after_sync", &self.allocated_after_sync())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use berth_types::BYTES_PER_MB;
    use proptest::prelude::*;

    fn datastore(capacity_mb: i64, free_mb: i64) -> DatastoreCapacity {
        DatastoreCapacity::new(
            "foo_lun",
            DatastoreRef::new("datastore-7"),
            capacity_mb * BYTES_PER_MB,
            free_mb * BYTES_PER_MB,
        )
    }

    #[test]
    fn test_fresh_record_has_full_synced_free_space() {
        let ds = datastore(16384, 8192);
        assert_eq!(ds.total_space(), 16384);
        assert_eq!(ds.synced_free_space(), 8192);
        assert_eq!(ds.allocated_after_sync(), 0);
        assert_eq!(ds.free_space(), 8192);
    }

    #[test]
    fn test_byte_figures_truncate_to_whole_mb() {
        let ds = DatastoreCapacity::new(
            "foo_lun",
            DatastoreRef::new("datastore-7"),
            10 * BYTES_PER_MB + 5,
            3 * BYTES_PER_MB - 1,
        );
        assert_eq!(ds.total_space(), 10);
        assert_eq!(ds.synced_free_space(), 2);
    }

    #[test]
    fn test_allocate_reduces_free_space() {
        let ds = datastore(16384, 8192);
        ds.allocate(1024);
        assert_eq!(ds.free_space(), 7168);
        assert_eq!(ds.debug_info(), "foo_lun (7168MB free of 16384MB capacity)");
    }

    #[test]
    fn test_free_space_goes_negative_without_clamping() {
        let ds = datastore(4096, 1024);
        ds.allocate(2048);
        assert_eq!(ds.free_space(), -1024);
    }

    #[test]
    fn test_display_includes_moref_and_name() {
        let ds = datastore(1024, 512);
        assert_eq!(ds.to_string(), "<Datastore: datastore-7 / foo_lun>");
    }

    #[test]
    fn test_concurrent_allocations_all_land() {
        let ds = std::sync::Arc::new(datastore(65536, 65536));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ds = ds.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        ds.allocate(1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(ds.allocated_after_sync(), 800);
        assert_eq!(ds.free_space(), 65536 - 800);
    }

    proptest! {
        #[test]
        fn property_allocation_sequences_sum(amounts in proptest::collection::vec(0i64..4096, 0..16)) {
            let ds = datastore(1 << 20, 1 << 19);
            for amount in &amounts {
                ds.allocate(*amount);
            }
            let total: i64 = amounts.iter().sum();
            prop_assert_eq!(ds.free_space(), ds.synced_free_space() - total);
        }
    }
}

//! Core types for the Berth capacity accounting layer.
//!
//! Strongly-typed platform references, unit conversions, and the
//! operator-facing configuration consumed by snapshot assembly.

pub mod config;
pub mod error;
pub mod ids;
pub mod units;

pub use config::{
    ClusterConfig, ClusterFailurePolicy, DatacenterConfig, DatastorePatterns, SnapshotConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use ids::{ClusterRef, DatastoreRef, HostRef, ResourcePoolRef};
pub use units::{bytes_to_mb, mb_to_gb, BYTES_PER_MB};

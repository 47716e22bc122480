//! Telemetry source contract for the Berth accounting layer.
//!
//! The virtualization platform is consumed as a capability: bulk property
//! retrieval for clusters and hosts, performance-counter retrieval, and
//! resource-pool runtime summaries. Transport concerns (timeouts, retries,
//! sessions) live entirely behind the [`TelemetrySource`] trait; nothing in
//! this crate performs network I/O itself.

pub mod error;
pub mod properties;
pub mod samples;
pub mod source;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::{TelemetryError, TelemetryResult};
pub use properties::{
    ClusterProperties, DatastoreProperties, HealthStatus, HostProperties, MemoryUsage,
    ResourcePoolSummary,
};
pub use source::TelemetrySource;

//! Error types for berth-resources.

use berth_telemetry::TelemetryError;
use berth_types::ResourcePoolRef;
use thiserror::Error;

/// Errors that can occur while computing a record's synced baseline.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The telemetry source failed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The resource-pool summary fetch yielded no data at all.
    ///
    /// Distinct from an unhealthy pool, which is a degraded state with a
    /// zero baseline; here the telemetry source itself failed for this
    /// cluster.
    #[error("no utilization summary for resource pool '{pool}' of cluster '{cluster}'")]
    SummaryUnavailable {
        cluster: String,
        pool: ResourcePoolRef,
    },
}

/// Result type for resource accounting operations.
pub type ResourceResult<T> = Result<T, ResourceError>;

//! Error types for berth-snapshot.

use berth_telemetry::TelemetryError;
use berth_types::ConfigError;
use thiserror::Error;

/// Errors that can occur while assembling a fleet snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The datacenter configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A cluster's telemetry fetch hard-failed.
    #[error("telemetry fetch failed for cluster '{cluster}': {source}")]
    ClusterFailed {
        cluster: String,
        #[source]
        source: TelemetryError,
    },

    /// The platform knows no cluster by a configured name.
    #[error("cluster '{cluster}' not found on the platform")]
    ClusterMissing { cluster: String },
}

/// Result type for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

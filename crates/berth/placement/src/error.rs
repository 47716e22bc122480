//! Error types for berth-placement.

use berth_resources::ResourceError;
use thiserror::Error;

/// Errors that can occur while picking or reserving capacity.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// No candidate cluster can fit the request.
    #[error("no cluster can fit {requested_mb}MB of memory")]
    NoClusterFits { requested_mb: i64 },

    /// No candidate datastore can fit the request.
    #[error("no datastore can fit {requested_mb}MB of disk")]
    NoDatastoreFits { requested_mb: i64 },

    /// A picker returned a cluster that is not in the candidate set.
    #[error("picked cluster '{name}' is not in the snapshot")]
    UnknownCluster { name: String },

    /// Reading a record's baseline failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The cluster no longer has room for the reservation.
    #[error("cluster '{cluster}' has {free_mb}MB free, cannot reserve {requested_mb}MB")]
    InsufficientMemory {
        cluster: String,
        requested_mb: i64,
        free_mb: i64,
    },

    /// The datastore no longer has room for the reservation.
    #[error("datastore '{datastore}' has {free_mb}MB free, cannot reserve {requested_mb}MB")]
    InsufficientDisk {
        datastore: String,
        requested_mb: i64,
        free_mb: i64,
    },
}

/// Result type for placement operations.
pub type PlacementResult<T> = Result<T, PlacementError>;

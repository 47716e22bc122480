//! Fleet snapshot assembly and refresh cycle.
//!
//! Once per poll interval, every configured cluster's property bag is
//! fetched and a fresh set of accounting records is constructed, then
//! atomically swapped into the shared [`SnapshotHandle`]. Placement callers
//! mid-cycle consistently see either the old or the new snapshot, never a
//! partial mix; staleness is bounded only by the poll interval.

pub mod builder;
pub mod error;
pub mod handle;
pub mod poller;
pub mod snapshot;

pub use builder::SnapshotBuilder;
pub use error::{SnapshotError, SnapshotResult};
pub use handle::SnapshotHandle;
pub use poller::SnapshotPoller;
pub use snapshot::FleetSnapshot;

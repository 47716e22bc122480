//! Placement collaborator contracts for the Berth accounting layer.
//!
//! The selection heuristics themselves (best-fit, bin-packing) live outside
//! this workspace; this crate fixes their interface. Pickers receive live
//! accounting records, not copies, so they can read `free_memory` and
//! `free_space` at decision time. Committing a decision goes through the
//! [`ReservationGuard`], which serializes check-then-reserve so concurrent
//! placements cannot both claim the last slice of a cluster.

pub mod error;
pub mod picker;
pub mod request;
pub mod reservation;

pub use error::{PlacementError, PlacementResult};
pub use picker::{ClusterPicker, DatastorePicker};
pub use request::{Placement, PlacementRequest};
pub use reservation::ReservationGuard;

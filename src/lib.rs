//! Core path representation for the Meridian autonomous vehicle
//!
//! Holds the sparse waypoint sequence produced by the route planner,
//! derives the dense equidistant curve consumed by motion control, and
//! validates that curve against the occupancy grid the path is bound to.

pub mod error;
pub mod navigation;

pub use error::{PathError, Result};

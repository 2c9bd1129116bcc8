//! Navigation path core for the Meridian vehicle
pub mod costmap;
pub mod path;
pub mod spline;
pub mod waypoint;

pub use costmap::{Costmap, GridQuery};
pub use path::{Path, PathConfig};
pub use waypoint::{Coordinate, Side, Waypoint};

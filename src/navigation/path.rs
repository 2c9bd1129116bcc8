//! Path representation shared between route planning and motion control.
//!
//! A [`Path`] owns the sparse waypoint sequence produced by the route
//! planner and the dense curve derived from it for the motion controller.
//! Edits never regenerate the curve implicitly; callers regenerate after a
//! round of edits, and the staleness flag records whether the cached curve
//! still matches the waypoints.

use std::slice;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::navigation::costmap::GridQuery;
use crate::navigation::spline::{linear_course, spline_course};
use crate::navigation::waypoint::{Coordinate, Waypoint};

/// Parameters for dense curve generation.
#[derive(Clone, Debug)]
pub struct PathConfig {
    /// Target spacing between dense curve samples in meters.
    pub sample_spacing: f64,
}

impl Default for PathConfig {
    fn default() -> Self {
        PathConfig {
            sample_spacing: 0.1,
        }
    }
}

/// A planned path bound to an occupancy grid.
///
/// Cloning a path deep-copies the waypoints and the dense curve and shares
/// the grid handle, which is how a regenerated curve is handed to the
/// control thread as a snapshot.
#[derive(Clone, Debug)]
pub struct Path {
    waypoints: Vec<Waypoint>,
    spline_path: Vec<Coordinate>,
    stale: bool,
    config: PathConfig,
    grid: Arc<dyn GridQuery>,
}

impl Path {
    /// Create an empty path bound to a grid.
    pub fn new(grid: Arc<dyn GridQuery>) -> Self {
        Self::with_config(grid, PathConfig::default())
    }

    pub fn with_config(grid: Arc<dyn GridQuery>, config: PathConfig) -> Self {
        Path {
            waypoints: Vec::new(),
            spline_path: Vec::new(),
            stale: false,
            config,
            grid,
        }
    }

    /// Add a waypoint to the end of the path.
    pub fn add_waypoint(&mut self, wp: Waypoint) {
        self.waypoints.push(wp);
        self.stale = true;
    }

    /// Insert a waypoint before `index`.
    ///
    /// Returns whether the insertion was successful; any index up to and
    /// including the current size is valid.
    pub fn insert_waypoint(&mut self, wp: Waypoint, index: usize) -> bool {
        if index > self.waypoints.len() {
            return false;
        }
        self.waypoints.insert(index, wp);
        self.stale = true;
        true
    }

    /// Remove the first waypoint equal to `wp`.
    ///
    /// Returns whether a matching waypoint was found.
    pub fn remove_waypoint(&mut self, wp: &Waypoint) -> bool {
        match self.waypoints.iter().position(|w| w == wp) {
            Some(index) => {
                self.waypoints.remove(index);
                self.stale = true;
                true
            }
            None => false,
        }
    }

    /// Remove the waypoint at `index`.
    ///
    /// Returns whether the removal was successful.
    pub fn remove_waypoint_at(&mut self, index: usize) -> bool {
        if index >= self.waypoints.len() {
            return false;
        }
        self.waypoints.remove(index);
        self.stale = true;
        true
    }

    /// Remove all waypoints and the dense curve derived from them.
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.spline_path.clear();
        self.stale = false;
    }

    /// Number of waypoints in the sparse path.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// The sparse waypoint sequence in path order.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn iter(&self) -> slice::Iter<'_, Waypoint> {
        self.waypoints.iter()
    }

    /// The dense curve from the last generation step.
    ///
    /// Empty until a generation step has run, and again after [`clear`].
    ///
    /// [`clear`]: Path::clear
    pub fn spline_path(&self) -> &[Coordinate] {
        &self.spline_path
    }

    /// Whether the waypoints were edited since the dense curve was last
    /// generated.
    pub fn is_spline_stale(&self) -> bool {
        self.stale
    }

    /// Overlay a smooth spline onto the waypoints and cache its samples.
    ///
    /// On success the previous dense curve is fully replaced; on error it
    /// is left untouched.
    pub fn interpolate_spline(&mut self) -> Result<()> {
        let course = spline_course(&self.waypoints, self.config.sample_spacing)?;
        debug!(points = course.len(), "regenerated spline path");
        self.spline_path = course;
        self.stale = false;
        Ok(())
    }

    /// Fill in between the waypoints with straight lines at the same
    /// density a spline path would have. Same replacement semantics as
    /// [`interpolate_spline`].
    ///
    /// [`interpolate_spline`]: Path::interpolate_spline
    pub fn interpolate_linear(&mut self) -> Result<()> {
        let course = linear_course(&self.waypoints, self.config.sample_spacing)?;
        debug!(points = course.len(), "regenerated linear path");
        self.spline_path = course;
        self.stale = false;
        Ok(())
    }

    /// Check whether the current dense curve stays clear of obstacles.
    ///
    /// An empty curve is trivially valid. A grid query failure counts as an
    /// obstacle, so an unreadable grid can never report a safe path.
    pub fn is_spline_path_valid(&self) -> bool {
        self.is_segment_range_valid(&self.spline_path)
    }

    // Iterates segment-wise over a sub-range of dense curve points so a
    // changed suffix can be re-validated on its own.
    fn is_segment_range_valid(&self, points: &[Coordinate]) -> bool {
        for pair in points.windows(2) {
            match self
                .grid
                .is_segment_occupied(pair[0].x, pair[0].y, pair[1].x, pair[1].y)
            {
                Ok(false) => {}
                Ok(true) => return false,
                Err(e) => {
                    warn!("grid query failed, treating segment as occupied: {e}");
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathError;
    use crate::navigation::costmap::Costmap;
    use std::error::Error;

    fn free_grid() -> Arc<Costmap> {
        // 20m x 20m free map around the origin
        Arc::new(Costmap::new(400, 400, 0.05, -10.0, -10.0))
    }

    fn path_with(waypoints: &[(f64, f64)]) -> Path {
        let mut path = Path::new(free_grid());
        for &(x, y) in waypoints {
            path.add_waypoint(Waypoint::new(x, y));
        }
        path
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut path = path_with(&[(0.0, 0.0), (2.0, 0.0)]);
        assert!(path.insert_waypoint(Waypoint::new(1.0, 0.0), 1));
        assert_eq!(path.len(), 3);
        let xs: Vec<f64> = path.iter().map(|w| w.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
        // Appending through insert at len is valid too
        assert!(path.insert_waypoint(Waypoint::new(3.0, 0.0), 3));
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn test_insert_out_of_range_is_a_no_op() {
        let mut path = path_with(&[(0.0, 0.0)]);
        assert!(!path.insert_waypoint(Waypoint::new(9.0, 9.0), 2));
        assert_eq!(path.len(), 1);
        assert_eq!(path.waypoints()[0], Waypoint::new(0.0, 0.0));
    }

    #[test]
    fn test_remove_by_value_removes_first_match_only() {
        let mut path = path_with(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert!(path.remove_waypoint(&Waypoint::new(0.0, 0.0)));
        assert_eq!(path.len(), 2);
        assert_eq!(path.waypoints()[0], Waypoint::new(1.0, 1.0));
        assert_eq!(path.waypoints()[1], Waypoint::new(0.0, 0.0));
        assert!(!path.remove_waypoint(&Waypoint::new(7.0, 7.0)));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_remove_at_out_of_range() {
        let mut path = path_with(&[(0.0, 0.0), (1.0, 0.0)]);
        assert!(!path.remove_waypoint_at(2));
        assert_eq!(path.len(), 2);
        assert!(path.remove_waypoint_at(0));
        assert_eq!(path.waypoints()[0], Waypoint::new(1.0, 0.0));
    }

    #[test]
    fn test_clear_drops_waypoints_and_curve() {
        let mut path = path_with(&[(0.0, 0.0), (5.0, 0.0)]);
        path.interpolate_linear().unwrap();
        assert!(!path.spline_path().is_empty());
        path.clear();
        assert_eq!(path.len(), 0);
        assert!(path.spline_path().is_empty());
        assert!(!path.is_spline_stale());
    }

    #[test]
    fn test_staleness_tracking() {
        let mut path = path_with(&[(0.0, 0.0), (5.0, 0.0)]);
        assert!(path.is_spline_stale());
        path.interpolate_spline().unwrap();
        assert!(!path.is_spline_stale());

        path.add_waypoint(Waypoint::new(5.0, 5.0));
        assert!(path.is_spline_stale());
        path.interpolate_spline().unwrap();
        assert!(!path.is_spline_stale());

        // Failed edits do not mark the curve stale
        assert!(!path.remove_waypoint_at(99));
        assert!(!path.remove_waypoint(&Waypoint::new(42.0, 42.0)));
        assert!(!path.is_spline_stale());
    }

    #[test]
    fn test_generation_preconditions() {
        let mut path = path_with(&[]);
        assert!(matches!(
            path.interpolate_spline(),
            Err(PathError::TooFewWaypoints(0))
        ));
        path.add_waypoint(Waypoint::new(1.0, 1.0));
        assert!(matches!(
            path.interpolate_linear(),
            Err(PathError::TooFewWaypoints(1))
        ));
    }

    #[test]
    fn test_failed_generation_keeps_previous_curve() {
        let mut path = path_with(&[(0.0, 0.0), (5.0, 0.0)]);
        path.interpolate_linear().unwrap();
        let before = path.spline_path().to_vec();

        // Duplicate waypoint makes the geometry degenerate
        path.add_waypoint(Waypoint::new(5.0, 0.0));
        assert!(path.interpolate_spline().is_err());
        assert_eq!(path.spline_path(), &before[..]);
        assert!(path.is_spline_stale());
    }

    #[test]
    fn test_empty_curve_is_vacuously_valid() {
        let path = path_with(&[(0.0, 0.0), (5.0, 0.0)]);
        assert!(path.spline_path().is_empty());
        assert!(path.is_spline_path_valid());
    }

    #[derive(Debug)]
    struct OfflineGrid;

    impl GridQuery for OfflineGrid {
        fn is_occupied(&self, _x: f64, _y: f64) -> std::result::Result<bool, Box<dyn Error + Send + Sync>> {
            Err("sensor offline".into())
        }

        fn is_segment_occupied(
            &self,
            _x1: f64,
            _y1: f64,
            _x2: f64,
            _y2: f64,
        ) -> std::result::Result<bool, Box<dyn Error + Send + Sync>> {
            Err("sensor offline".into())
        }
    }

    #[test]
    fn test_grid_failure_reads_as_occupied() {
        let mut path = Path::new(Arc::new(OfflineGrid));
        path.add_waypoint(Waypoint::new(0.0, 0.0));
        path.add_waypoint(Waypoint::new(1.0, 0.0));
        path.interpolate_linear().unwrap();
        assert!(!path.is_spline_path_valid());
    }

    #[test]
    fn test_clone_shares_grid_but_not_waypoints() {
        use std::sync::RwLock;

        let grid = Arc::new(RwLock::new(Costmap::new(400, 400, 0.05, -10.0, -10.0)));
        let mut path = Path::new(grid.clone());
        path.add_waypoint(Waypoint::new(0.0, 0.0));
        path.add_waypoint(Waypoint::new(5.0, 0.0));
        path.interpolate_linear().unwrap();

        let mut copy = path.clone();
        assert!(copy.is_spline_path_valid());

        // The copy sees obstacles added to the original's grid
        grid.write().unwrap().set_obstacle(2.5, 0.0);
        assert!(!copy.is_spline_path_valid());
        assert!(!path.is_spline_path_valid());

        // But its waypoints are an independent copy
        copy.clear();
        assert_eq!(path.len(), 2);
    }
}

//! Occupancy costmap queries for path validation.
//!
//! The path core never owns the live costmap. It binds to one through the
//! [`GridQuery`] capability at construction and only ever reads from it.
//! The [`Costmap`] in this module is the in-memory implementation used by
//! tests and tooling; the deployed system binds the mapping stack's grid
//! behind the same trait.

use std::error::Error;
use std::fmt::Debug;
use std::sync::RwLock;

/// Cost values for different types of cells
pub mod cost_values {
    pub const LETHAL_OBSTACLE: u8 = 254;
    pub const INSCRIBED_INFLATED_OBSTACLE: u8 = 253;
    pub const NO_COST: u8 = 0;
    pub const UNKNOWN_COST: u8 = 255;
}

/// Occupancy lookup against an externally owned grid.
///
/// Queries are fallible: a collaborator that cannot answer reports an error
/// and the caller decides how to degrade. Path validation treats any error
/// as "occupied".
pub trait GridQuery: Debug + Send + Sync {
    /// Whether the cell containing the world point is occupied.
    fn is_occupied(&self, x: f64, y: f64) -> Result<bool, Box<dyn Error + Send + Sync>>;

    /// Whether the straight segment between two world points crosses an
    /// occupied cell.
    fn is_segment_occupied(
        &self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    ) -> Result<bool, Box<dyn Error + Send + Sync>>;
}

/// A costmap over a regular grid of cost cells.
///
/// Cells start free; obstacles arrive either from a full occupancy-grid
/// update or by marking individual world coordinates.
#[derive(Debug, Clone)]
pub struct Costmap {
    pub width: usize,
    pub height: usize,
    pub resolution: f64,
    pub origin_x: f64,
    pub origin_y: f64,
    pub data: Vec<u8>,
}

impl Costmap {
    /// Create a new costmap with all cells free.
    pub fn new(width: usize, height: usize, resolution: f64, origin_x: f64, origin_y: f64) -> Self {
        Costmap {
            width,
            height,
            resolution,
            origin_x,
            origin_y,
            data: vec![cost_values::NO_COST; width * height],
        }
    }

    /// Update the costmap from an occupancy grid snapshot.
    pub fn update_from_map(
        &mut self,
        map_data: &[u8],
        width: usize,
        height: usize,
        resolution: f64,
        origin_x: f64,
        origin_y: f64,
    ) -> Result<(), String> {
        if width != self.width || height != self.height {
            return Err(format!(
                "Map dimensions do not match costmap dimensions: map is {}x{}, costmap is {}x{}",
                width, height, self.width, self.height
            ));
        }

        self.resolution = resolution;
        self.origin_x = origin_x;
        self.origin_y = origin_y;

        for i in 0..self.data.len() {
            let value = map_data[i];
            // Convert from occupancy grid values (0-100) to cost values
            self.data[i] = match value {
                0 => cost_values::NO_COST,
                100 => cost_values::LETHAL_OBSTACLE,
                255 => cost_values::UNKNOWN_COST,
                _ => ((value as f64 / 100.0) * 253.0) as u8,
            };
        }

        Ok(())
    }

    /// Mark the cell containing a world coordinate as a lethal obstacle.
    pub fn set_obstacle(&mut self, x: f64, y: f64) {
        let (grid_x, grid_y) = self.world_to_map(x, y);
        if grid_x >= 0 && grid_x < self.width as i32 && grid_y >= 0 && grid_y < self.height as i32 {
            let index = (grid_y as usize) * self.width + (grid_x as usize);
            self.data[index] = cost_values::LETHAL_OBSTACLE;
        }
    }

    /// Get the cost at a specific position in world coordinates
    pub fn get_cost(&self, x: f64, y: f64) -> u8 {
        let (grid_x, grid_y) = self.world_to_map(x, y);
        self.get_cost_map(grid_x, grid_y)
    }

    /// Get the cost at a specific position in map coordinates
    pub fn get_cost_map(&self, grid_x: i32, grid_y: i32) -> u8 {
        if grid_x >= 0 && grid_x < self.width as i32 && grid_y >= 0 && grid_y < self.height as i32 {
            let index = (grid_y as usize) * self.width + (grid_x as usize);
            self.data[index]
        } else {
            cost_values::UNKNOWN_COST // Unknown/out of bounds
        }
    }

    /// Check if a point is an obstacle
    pub fn is_obstacle(&self, x: f64, y: f64) -> bool {
        let cost = self.get_cost(x, y);
        cost >= cost_values::INSCRIBED_INFLATED_OBSTACLE
    }

    /// Maximum cost along the straight line between two world points.
    ///
    /// Samples at half the cell resolution so thin obstacles between the
    /// endpoints are not stepped over.
    pub fn line_cost(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> u8 {
        let dx = x2 - x1;
        let dy = y2 - y1;
        let distance = (dx * dx + dy * dy).sqrt();
        let steps = (distance / (self.resolution * 0.5)).ceil() as i32;

        let mut max_cost = cost_values::NO_COST;

        for i in 0..=steps {
            let t = if steps > 0 { i as f64 / steps as f64 } else { 0.0 };
            let x = x1 + t * dx;
            let y = y1 + t * dy;
            let cost = self.get_cost(x, y);
            if cost > max_cost {
                max_cost = cost;
            }

            // Early exit if we hit a lethal obstacle
            if max_cost >= cost_values::LETHAL_OBSTACLE {
                return max_cost;
            }
        }

        max_cost
    }

    /// Convert world coordinates to map coordinates
    pub fn world_to_map(&self, x: f64, y: f64) -> (i32, i32) {
        let grid_x = ((x - self.origin_x) / self.resolution).floor() as i32;
        let grid_y = ((y - self.origin_y) / self.resolution).floor() as i32;
        (grid_x, grid_y)
    }

    /// Convert map coordinates to world coordinates (cell center)
    pub fn map_to_world(&self, grid_x: i32, grid_y: i32) -> (f64, f64) {
        let x = self.origin_x + (grid_x as f64 + 0.5) * self.resolution;
        let y = self.origin_y + (grid_y as f64 + 0.5) * self.resolution;
        (x, y)
    }
}

impl GridQuery for Costmap {
    fn is_occupied(&self, x: f64, y: f64) -> Result<bool, Box<dyn Error + Send + Sync>> {
        Ok(self.is_obstacle(x, y))
    }

    fn is_segment_occupied(
        &self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        Ok(self.line_cost(x1, y1, x2, y2) >= cost_values::INSCRIBED_INFLATED_OBSTACLE)
    }
}

/// Shared costmap that keeps accepting updates while paths hold a handle to
/// it. A poisoned lock surfaces as a query error.
impl GridQuery for RwLock<Costmap> {
    fn is_occupied(&self, x: f64, y: f64) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let grid = self.read().map_err(|_| "costmap lock poisoned")?;
        Ok(grid.is_obstacle(x, y))
    }

    fn is_segment_occupied(
        &self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let grid = self.read().map_err(|_| "costmap lock poisoned")?;
        Ok(grid.line_cost(x1, y1, x2, y2) >= cost_values::INSCRIBED_INFLATED_OBSTACLE)
    }
}

use anyhow::{anyhow, Result};
use meridian_core::navigation::{Costmap, Path, Waypoint};
use std::sync::{Arc, RwLock};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Building costmap...");
    let grid = Arc::new(RwLock::new(Costmap::new(400, 400, 0.05, -10.0, -10.0)));

    let mut path = Path::new(grid.clone());
    path.add_waypoint(Waypoint::new(0.0, 0.0));
    path.add_waypoint(Waypoint::new(4.0, 1.0));
    path.add_waypoint(Waypoint::new(8.0, 0.0));
    println!("Sparse path has {} waypoints", path.len());

    path.interpolate_spline()?;
    println!("Spline path has {} points", path.spline_path().len());
    println!("Spline path valid: {}", path.is_spline_path_valid());

    path.interpolate_linear()?;
    println!("Linear path has {} points", path.spline_path().len());
    println!("Linear path valid: {}", path.is_spline_path_valid());

    println!("Placing an obstacle on the path...");
    grid.write()
        .map_err(|_| anyhow!("costmap lock poisoned"))?
        .set_obstacle(2.0, 0.5);
    println!("Linear path valid: {}", path.is_spline_path_valid());

    Ok(())
}

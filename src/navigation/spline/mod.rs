//! Dense curve generation over a sparse waypoint sequence.
//!
//! Route-planner waypoints are not equidistant and can carry sharp turns,
//! while motion control expects evenly spaced samples. The two strategies
//! here produce that dense sequence: [`spline_course`] overlays a smooth
//! cubic spline, [`linear_course`] connects the waypoints with straight
//! lines at the same sample density for cases where smoothing is unwanted
//! or would fail.

pub mod cubic_spline;

use crate::error::{PathError, Result};
use crate::navigation::waypoint::{Coordinate, Waypoint};
use self::cubic_spline::CubicSpline2d;

/// Consecutive waypoints closer than this are considered coincident.
const MIN_WAYPOINT_SPACING: f64 = 1e-9;

/// Sample a smooth cubic spline through the waypoints at uniform arc-length
/// spacing. The result always contains both endpoints.
pub fn spline_course(waypoints: &[Waypoint], spacing: f64) -> Result<Vec<Coordinate>> {
    let spline = CubicSpline2d::new(waypoints)?;
    let total = spline.total_length();
    let steps = sample_count(total, spacing);
    let step = total / steps as f64;

    let course = (0..=steps)
        .map(|i| spline.position(i as f64 * step))
        .collect();
    Ok(course)
}

/// Connect the waypoints with straight lines sampled at the same density a
/// spline course would use.
pub fn linear_course(waypoints: &[Waypoint], spacing: f64) -> Result<Vec<Coordinate>> {
    let arc = arc_lengths(waypoints)?;
    let total = arc[arc.len() - 1];
    let steps = sample_count(total, spacing);
    let step = total / steps as f64;

    let mut course = Vec::with_capacity(steps + 1);
    let mut seg = 0;
    for i in 0..=steps {
        let target = i as f64 * step;
        while seg < arc.len() - 2 && target > arc[seg + 1] {
            seg += 1;
        }
        let t = ((target - arc[seg]) / (arc[seg + 1] - arc[seg])).clamp(0.0, 1.0);
        let a = &waypoints[seg];
        let b = &waypoints[seg + 1];
        course.push(Coordinate::new(
            a.x + t * (b.x - a.x),
            a.y + t * (b.y - a.y),
        ));
    }
    Ok(course)
}

/// Cumulative arc length at each waypoint, starting at zero.
///
/// Rejects sequences that cannot parameterize a curve: fewer than two
/// waypoints, or consecutive coincident waypoints.
pub(crate) fn arc_lengths(waypoints: &[Waypoint]) -> Result<Vec<f64>> {
    if waypoints.len() < 2 {
        return Err(PathError::TooFewWaypoints(waypoints.len()));
    }

    let mut arc = Vec::with_capacity(waypoints.len());
    arc.push(0.0);
    for (i, pair) in waypoints.windows(2).enumerate() {
        let length = pair[0].position().distance(&pair[1].position());
        if length < MIN_WAYPOINT_SPACING {
            return Err(PathError::DegenerateGeometry(format!(
                "coincident waypoints at indices {} and {}",
                i,
                i + 1
            )));
        }
        arc.push(arc[i] + length);
    }
    Ok(arc)
}

/// Number of uniform steps covering `total` at approximately `spacing`.
fn sample_count(total: f64, spacing: f64) -> usize {
    ((total / spacing).round() as usize).max(1)
}

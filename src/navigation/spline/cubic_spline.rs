//! Natural cubic spline interpolation.
//!
//! A 2D curve is built from two 1D splines over the cumulative chord
//! length of the waypoints, so evaluating at evenly spaced parameter
//! values yields approximately equidistant points along the curve.

use nalgebra::{DMatrix, DVector};

use crate::error::{PathError, Result};
use crate::navigation::waypoint::{Coordinate, Waypoint};

/// Piecewise cubic polynomial through `(s[i], value[i])` knots with natural
/// boundary conditions (zero curvature at both ends).
#[derive(Debug, Clone)]
pub(crate) struct CubicSpline1d {
    s: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl CubicSpline1d {
    /// Fit a spline over strictly increasing knots.
    ///
    /// Segment `i` is `a[i] + b[i]*dx + c[i]*dx^2 + d[i]*dx^3` with
    /// `dx = t - s[i]`. The `c` coefficients come from the standard
    /// tridiagonal continuity system, solved here as a dense LU.
    fn new(knots: &[f64], values: &[f64]) -> Result<Self> {
        let n = knots.len();
        let h: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();

        let mut system = DMatrix::<f64>::zeros(n, n);
        let mut rhs = DVector::<f64>::zeros(n);
        system[(0, 0)] = 1.0;
        system[(n - 1, n - 1)] = 1.0;
        for i in 1..n - 1 {
            system[(i, i - 1)] = h[i - 1];
            system[(i, i)] = 2.0 * (h[i - 1] + h[i]);
            system[(i, i + 1)] = h[i];
            rhs[i] = 3.0 * (values[i + 1] - values[i]) / h[i]
                - 3.0 * (values[i] - values[i - 1]) / h[i - 1];
        }

        let c_vec = system
            .lu()
            .solve(&rhs)
            .ok_or_else(|| {
                PathError::DegenerateGeometry("spline coefficient system is singular".into())
            })?;
        let c: Vec<f64> = c_vec.iter().copied().collect();

        let mut b = Vec::with_capacity(n - 1);
        let mut d = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            b.push((values[i + 1] - values[i]) / h[i] - h[i] * (2.0 * c[i] + c[i + 1]) / 3.0);
            d.push((c[i + 1] - c[i]) / (3.0 * h[i]));
        }

        Ok(CubicSpline1d {
            s: knots.to_vec(),
            a: values.to_vec(),
            b,
            c,
            d,
        })
    }

    /// Evaluate at parameter `t`, clamped to the knot range.
    fn eval(&self, t: f64) -> f64 {
        let t = t.clamp(self.s[0], self.s[self.s.len() - 1]);
        let i = self
            .s
            .partition_point(|&k| k <= t)
            .saturating_sub(1)
            .min(self.s.len() - 2);
        let dx = t - self.s[i];
        self.a[i] + self.b[i] * dx + self.c[i] * dx * dx + self.d[i] * dx * dx * dx
    }
}

/// 2D curve through a waypoint sequence, parameterized by cumulative chord
/// length.
#[derive(Debug, Clone)]
pub(crate) struct CubicSpline2d {
    arc: Vec<f64>,
    x: CubicSpline1d,
    y: CubicSpline1d,
}

impl CubicSpline2d {
    pub(crate) fn new(waypoints: &[Waypoint]) -> Result<Self> {
        let arc = super::arc_lengths(waypoints)?;
        let xs: Vec<f64> = waypoints.iter().map(|w| w.x).collect();
        let ys: Vec<f64> = waypoints.iter().map(|w| w.y).collect();
        let x = CubicSpline1d::new(&arc, &xs)?;
        let y = CubicSpline1d::new(&arc, &ys)?;
        Ok(CubicSpline2d { arc, x, y })
    }

    /// Total chord length of the underlying waypoint polyline.
    pub(crate) fn total_length(&self) -> f64 {
        self.arc[self.arc.len() - 1]
    }

    /// Curve position at arc parameter `t` in `[0, total_length]`.
    pub(crate) fn position(&self, t: f64) -> Coordinate {
        Coordinate::new(self.x.eval(t), self.y.eval(t))
    }
}

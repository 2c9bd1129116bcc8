//! Error types for the Meridian path core

use thiserror::Error;

/// Failure of a dense curve generation step.
///
/// Structural path edits (insert/remove) report success through `bool`
/// return values instead; an error here means the planning pipeline asked
/// for a curve that is not defined for the current waypoints.
#[derive(Error, Debug)]
pub enum PathError {
    #[error("curve generation requires at least 2 waypoints, got {0}")]
    TooFewWaypoints(usize),

    #[error("degenerate path geometry: {0}")]
    DegenerateGeometry(String),
}

pub type Result<T> = std::result::Result<T, PathError>;

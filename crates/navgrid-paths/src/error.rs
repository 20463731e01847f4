//! Error types for searches and line tracing.

use navgrid_core::{GridError, Point, Vec2};
use thiserror::Error;

/// Result type alias using [`PathError`].
pub type Result<T> = std::result::Result<T, PathError>;

/// Failures that indicate a bug in the caller or in the engine.
///
/// "No path" is never an error: searches report it as an empty or partial
/// path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    /// Obstacle bookkeeping was violated.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Heuristic name not recognised by the configuration layer.
    #[error("unknown A* heuristic '{0}'")]
    UnknownHeuristic(String),

    /// The hard safety ceiling on A* iterations was reached.
    #[error("infinite loop in A* search from {start} to {end} after {iterations} iterations")]
    IterationCeiling {
        start: Point,
        end: Point,
        iterations: u32,
    },

    /// A line rasterizer failed to converge.
    #[error("runaway iteration from {from} to {to} at {at}")]
    RunawayRaster { from: Vec2, to: Vec2, at: Vec2 },

    /// Ring searches need at least one ring.
    #[error("ring_size must be at least 1, got {0}")]
    InvalidRingSize(u32),

    /// A path checker was supplied with an empty cache key.
    #[error("a path checker needs a non-empty checker key")]
    MissingCheckerKey,
}

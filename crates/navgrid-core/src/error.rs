//! Error types for occupancy map mutations.

use thiserror::Error;

use crate::cell::BlockerId;
use crate::geom::Point;

/// Result type alias using [`GridError`].
pub type Result<T> = std::result::Result<T, GridError>;

/// Contract violations raised by the obstacle bookkeeping of an
/// [`OccupancyMap`](crate::OccupancyMap).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// An obstacle tried to release a cell it was never registered on.
    #[error("unblock cell {pos} but {blocker} not found (present: {present:?})")]
    BlockerNotFound {
        /// Cell being unblocked.
        pos: Point,
        /// Obstacle that asked to be removed.
        blocker: BlockerId,
        /// Obstacles actually registered on the cell.
        present: Vec<BlockerId>,
    },
}

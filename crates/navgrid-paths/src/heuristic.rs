//! Distance estimates used to order the A* open set.

use std::fmt;
use std::str::FromStr;

use navgrid_core::Point;

use crate::distance::{hex_distance, manhattan};
use crate::error::PathError;

/// Heuristic used by [`AstarContext`](crate::AstarContext).
///
/// Configured by name: `"manhattan"`, `"euclidean"` or `"hex"`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Heuristic {
    /// `|dx| + |dy|`. Exact on 4-way rectangular maps.
    #[default]
    Manhattan,
    /// Straight-line distance plus a small cross-product term that prefers
    /// nodes lying on the start-goal line.
    Euclidean,
    /// Hex step count. Admissible on [`HexMap`](crate::HexMap).
    Hex,
}

/// Weight of the straight-line tie-break in [`Heuristic::Euclidean`].
const CROSS_WEIGHT: f64 = 0.001;

impl Heuristic {
    /// Estimated remaining cost from `cur` to `end` for a search that began
    /// at `start`.
    pub fn estimate(self, start: Point, cur: Point, end: Point) -> f64 {
        match self {
            Heuristic::Manhattan => f64::from(manhattan(cur, end)),
            Heuristic::Euclidean => {
                let (dx1, dy1) = (f64::from(cur.x - end.x), f64::from(cur.y - end.y));
                let (dx2, dy2) = (f64::from(start.x - end.x), f64::from(start.y - end.y));
                let cross = (dx1 * dy2 - dx2 * dy1).abs();
                dx1.hypot(dy1) + cross * CROSS_WEIGHT
            }
            Heuristic::Hex => f64::from(hex_distance(cur, end)),
        }
    }

    /// Configuration name of the heuristic.
    pub fn name(self) -> &'static str {
        match self {
            Heuristic::Manhattan => "manhattan",
            Heuristic::Euclidean => "euclidean",
            Heuristic::Hex => "hex",
        }
    }
}

impl FromStr for Heuristic {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manhattan" => Ok(Heuristic::Manhattan),
            "euclidean" => Ok(Heuristic::Euclidean),
            "hex" => Ok(Heuristic::Hex),
            other => Err(PathError::UnknownHeuristic(other.to_owned())),
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

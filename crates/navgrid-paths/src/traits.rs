use std::fmt;

use navgrid_core::{BlockChecker, Cell, Cost, OccupancyMap, Point};

use crate::connectivity::Connectivity;
use crate::heuristic::Heuristic;

/// A grid topology that A* can walk: an [`OccupancyMap`] plus a neighbor
/// relation.
pub trait NavMap {
    /// Whether [`NavMap::connectivity`] returns a real analysis.
    const HAS_CONNECTIVITY: bool = false;

    /// Heuristic used when [`SearchOptions`](crate::SearchOptions) leaves it
    /// unset. Must be admissible for this topology.
    const DEFAULT_HEURISTIC: Heuristic = Heuristic::Manhattan;

    fn grid(&self) -> &OccupancyMap;

    fn grid_mut(&mut self) -> &mut OccupancyMap;

    /// Maximum number of neighbors of a cell.
    fn neighbor_count(&self) -> usize;

    /// Append every enterable neighbor of `p`, with its extra step cost, into
    /// `buf`. The caller clears `buf` before calling.
    ///
    /// Enterable neighbors are materialized on the way.
    fn unblocked_neighbors(
        &mut self,
        p: Point,
        checker: Option<BlockChecker<'_>>,
        buf: &mut Vec<(Point, Cost)>,
    );

    /// Region labelling of the current obstacles, for maps that support it.
    fn connectivity(&self) -> Option<Connectivity> {
        None
    }
}

/// Per-query cost function that can see the path being built.
///
/// `path` lists the steps from the search start (exclusive) up to and
/// including `cell`. Return [`NOPASS`](navgrid_core::NOPASS) to forbid the
/// step, or an extra cost otherwise.
pub trait PathChecker {
    fn cost(&self, cell: &Cell, path: &[Point]) -> Cost;
}

impl<F> PathChecker for F
where
    F: Fn(&Cell, &[Point]) -> Cost,
{
    fn cost(&self, cell: &Cell, path: &[Point]) -> Cost {
        self(cell, path)
    }
}

/// A [`PathChecker`] paired with the key cached results are stored under.
///
/// Two checkers that share a key must behave identically.
#[derive(Clone, Copy)]
pub struct KeyedChecker<'a> {
    key: &'a str,
    checker: &'a dyn PathChecker,
}

impl<'a> KeyedChecker<'a> {
    pub fn new(key: &'a str, checker: &'a dyn PathChecker) -> Self {
        Self { key, checker }
    }

    pub fn key(&self) -> &'a str {
        self.key
    }

    pub fn checker(&self) -> &'a dyn PathChecker {
        self.checker
    }
}

impl fmt::Debug for KeyedChecker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedChecker").field("key", &self.key).finish_non_exhaustive()
    }
}

//! The two concrete topologies: 4-way rectangular and 6-way hexagonal.

use navgrid_core::{BlockChecker, BlockerId, Cost, OccupancyMap, Point, Range};

use crate::connectivity::Connectivity;
use crate::error::Result;
use crate::heuristic::Heuristic;
use crate::traits::NavMap;

// ---------------------------------------------------------------------------
// RectMap
// ---------------------------------------------------------------------------

/// Rectangular map with 4-way movement.
#[derive(Debug)]
pub struct RectMap {
    grid: OccupancyMap,
    allow_diagonal_passage: bool,
}

impl RectMap {
    pub fn new(width: i32, height: i32) -> Self {
        Self::from_grid(OccupancyMap::new(width, height))
    }

    /// A map whose fixed terrain is described by `terrain` (`true` is
    /// impassable).
    pub fn with_terrain(width: i32, height: i32, terrain: impl Fn(Point) -> bool + 'static) -> Self {
        Self::from_grid(OccupancyMap::with_terrain(width, height, terrain))
    }

    pub fn from_grid(grid: OccupancyMap) -> Self {
        Self {
            grid,
            allow_diagonal_passage: false,
        }
    }

    /// Make straight-line clearance checks use Bresenham lines, which may
    /// slip between two diagonally touching obstacles.
    pub fn with_diagonal_passage(mut self, allow: bool) -> Self {
        self.allow_diagonal_passage = allow;
        self
    }

    pub fn allow_diagonal_passage(&self) -> bool {
        self.allow_diagonal_passage
    }

    pub fn set_allow_diagonal_passage(&mut self, allow: bool) {
        self.allow_diagonal_passage = allow;
    }

    /// Register `blocker` on every in-bounds cell of `area`.
    pub fn block_map(&mut self, area: Range, blocker: BlockerId) {
        self.grid.block_area(area, blocker);
    }

    /// Remove `blocker` from every in-bounds cell of `area`. Fails, leaving
    /// the map untouched, if any of those cells does not carry it.
    pub fn unblock_map(&mut self, area: Range, blocker: BlockerId) -> Result<()> {
        self.grid.unblock_area(area, blocker)?;
        Ok(())
    }
}

impl NavMap for RectMap {
    const HAS_CONNECTIVITY: bool = true;

    fn grid(&self) -> &OccupancyMap {
        &self.grid
    }

    fn grid_mut(&mut self) -> &mut OccupancyMap {
        &mut self.grid
    }

    fn neighbor_count(&self) -> usize {
        4
    }

    fn unblocked_neighbors(
        &mut self,
        p: Point,
        checker: Option<BlockChecker<'_>>,
        buf: &mut Vec<(Point, Cost)>,
    ) {
        for n in p.neighbors_4() {
            if let Some(cost) = self.grid.unblocked_cost(n, checker) {
                buf.push((n, cost));
            }
        }
    }

    fn connectivity(&self) -> Option<Connectivity> {
        Some(Connectivity::new(&self.grid))
    }
}

// ---------------------------------------------------------------------------
// HexMap
// ---------------------------------------------------------------------------

/// Hexagonal map in offset coordinates: odd rows are shifted half a cell to
/// the east.
#[derive(Debug)]
pub struct HexMap {
    grid: OccupancyMap,
}

impl HexMap {
    pub fn new(width: i32, height: i32) -> Self {
        Self::from_grid(OccupancyMap::new(width, height))
    }

    pub fn with_terrain(width: i32, height: i32, terrain: impl Fn(Point) -> bool + 'static) -> Self {
        Self::from_grid(OccupancyMap::with_terrain(width, height, terrain))
    }

    pub fn from_grid(grid: OccupancyMap) -> Self {
        Self { grid }
    }

    /// The six neighbors of `p`: west, east, then the two above and the two
    /// below.
    pub fn hex_neighbors(p: Point) -> [Point; 6] {
        let odd = p.y.rem_euclid(2);
        [
            p.shift(-1, 0),
            p.shift(1, 0),
            p.shift(odd - 1, -1),
            p.shift(odd, -1),
            p.shift(odd - 1, 1),
            p.shift(odd, 1),
        ]
    }

    pub fn block_hex(&mut self, p: Point, blocker: BlockerId) {
        self.grid.block(p, blocker);
    }

    pub fn unblock_hex(&mut self, p: Point, blocker: BlockerId) -> Result<()> {
        self.grid.unblock(p, blocker)?;
        Ok(())
    }

    /// Like [`HexMap::unblock_hex`], but a missing blocker is not an error.
    /// Returns whether anything was removed.
    pub fn unblock_hex_maybe(&mut self, p: Point, blocker: BlockerId) -> bool {
        self.grid.unblock_if_present(p, blocker)
    }
}

impl NavMap for HexMap {
    const DEFAULT_HEURISTIC: Heuristic = Heuristic::Hex;

    fn grid(&self) -> &OccupancyMap {
        &self.grid
    }

    fn grid_mut(&mut self) -> &mut OccupancyMap {
        &mut self.grid
    }

    fn neighbor_count(&self) -> usize {
        6
    }

    fn unblocked_neighbors(
        &mut self,
        p: Point,
        checker: Option<BlockChecker<'_>>,
        buf: &mut Vec<(Point, Cost)>,
    ) {
        for n in Self::hex_neighbors(p) {
            if let Some(cost) = self.grid.unblocked_cost(n, checker) {
                buf.push((n, cost));
            }
        }
    }
}

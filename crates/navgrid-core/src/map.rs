//! The [`OccupancyMap`] type: a lazily allocated 2D blockage map.
//!
//! Rows and cells are only materialized when something touches them: an
//! obstacle being registered, or a search expanding through the cell. Cells
//! whose obstacles have all left are released by [`OccupancyMap::cleanup`].
//!
//! Every mutation advances [`OccupancyMap::generation`], which downstream
//! caches compare against to detect staleness.

use std::fmt;

use log::trace;

use crate::cell::{BlockChecker, BlockerId, Cell, Cost, NOPASS, PASS};
use crate::error::{GridError, Result};
use crate::geom::{Point, Range};

/// Fixed-terrain predicate: returns `true` where the ground itself is
/// impassable, independently of any registered obstacle.
pub type TerrainFn = Box<dyn Fn(Point) -> bool>;

type Row = Vec<Option<Cell>>;

/// Sparse grid of [`Cell`]s covering `[0, width) × [0, height)`.
pub struct OccupancyMap {
    bounds: Range,
    terrain: Option<TerrainFn>,
    rows: Vec<Option<Row>>,
    needs_cleanup: bool,
    generation: u64,
    n_alloc: usize,
}

impl OccupancyMap {
    /// Create an empty map with no terrain predicate.
    pub fn new(width: i32, height: i32) -> Self {
        let bounds = Range::new(0, 0, width.max(0), height.max(0));
        Self {
            bounds,
            terrain: None,
            rows: vec![None; bounds.height() as usize],
            needs_cleanup: false,
            generation: 0,
            n_alloc: 0,
        }
    }

    /// Create an empty map whose fixed terrain is described by `terrain`.
    pub fn with_terrain(width: i32, height: i32, terrain: impl Fn(Point) -> bool + 'static) -> Self {
        let mut map = Self::new(width, height);
        map.terrain = Some(Box::new(terrain));
        map
    }

    /// Replace the terrain predicate. Counts as a mutation.
    pub fn set_terrain(&mut self, terrain: Option<TerrainFn>) {
        self.terrain = terrain;
        self.generation += 1;
    }

    // -----------------------------------------------------------------------
    // Dimensions and bookkeeping
    // -----------------------------------------------------------------------

    #[inline]
    pub fn size(&self) -> Point {
        self.bounds.size()
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// The rectangle of valid coordinates.
    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    #[inline]
    pub fn in_bounds(&self, p: Point) -> bool {
        self.bounds.contains(p)
    }

    /// Flat row-major index of an in-bounds point.
    #[inline]
    pub fn index(&self, p: Point) -> Option<usize> {
        if !self.in_bounds(p) {
            return None;
        }
        Some(p.y as usize * self.width() as usize + p.x as usize)
    }

    /// Version number advanced by every blocking mutation and by `clear`.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of currently materialized cells.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.n_alloc
    }

    /// Whether a [`cleanup`](Self::cleanup) pass could free anything.
    #[inline]
    pub fn needs_cleanup(&self) -> bool {
        self.needs_cleanup
    }

    /// Whether fixed terrain makes `p` impassable.
    #[inline]
    pub fn terrain_blocked(&self, p: Point) -> bool {
        self.terrain.as_ref().is_some_and(|t| t(p))
    }

    /// Drop every materialized cell.
    pub fn clear(&mut self) {
        for row in self.rows.iter_mut() {
            *row = None;
        }
        self.needs_cleanup = false;
        self.n_alloc = 0;
        self.generation += 1;
    }

    /// Free cells without obstacles, and rows left with no cells.
    ///
    /// Does nothing unless a mutation or a query has materialized cells
    /// since the last pass.
    pub fn cleanup(&mut self) {
        if !self.needs_cleanup {
            return;
        }
        self.needs_cleanup = false;
        let before = self.n_alloc;
        for slot in self.rows.iter_mut() {
            let Some(row) = slot.as_mut() else {
                continue;
            };
            let mut live = 0;
            for cell in row.iter_mut() {
                if cell.as_ref().is_some_and(Cell::is_empty) {
                    *cell = None;
                    self.n_alloc -= 1;
                } else if cell.is_some() {
                    live += 1;
                }
            }
            if live == 0 {
                *slot = None;
            }
        }
        trace!("cleanup freed {} of {} cells", before - self.n_alloc, before);
    }

    // -----------------------------------------------------------------------
    // Cell access
    // -----------------------------------------------------------------------

    /// Return the cell at `p`, materializing it if necessary.
    ///
    /// # Panics
    ///
    /// Panics if `p` is outside the map. Callers guard with
    /// [`in_bounds`](Self::in_bounds).
    pub fn cell(&mut self, p: Point) -> &mut Cell {
        assert!(self.in_bounds(p), "cell {p} outside map {}", self.bounds);
        let width = self.width() as usize;
        let row = self.rows[p.y as usize].get_or_insert_with(|| vec![None; width]);
        let slot = &mut row[p.x as usize];
        if slot.is_none() {
            self.n_alloc += 1;
            self.needs_cleanup = true;
        }
        slot.get_or_insert_with(|| Cell::new(p))
    }

    /// The cell at `p` if it is materialized. Never allocates.
    pub fn get(&self, p: Point) -> Option<&Cell> {
        if !self.in_bounds(p) {
            return None;
        }
        self.rows[p.y as usize].as_ref()?[p.x as usize].as_ref()
    }

    fn get_mut(&mut self, p: Point) -> Option<&mut Cell> {
        if !self.in_bounds(p) {
            return None;
        }
        self.rows[p.y as usize].as_mut()?[p.x as usize].as_mut()
    }

    /// Blockage cost of `p`.
    ///
    /// Out-of-range and terrain-blocked cells are always [`NOPASS`]; cells
    /// that were never materialized are [`PASS`].
    pub fn is_blocked(&self, p: Point, checker: Option<BlockChecker<'_>>) -> Cost {
        if !self.in_bounds(p) || self.terrain_blocked(p) {
            return NOPASS;
        }
        match self.get(p) {
            Some(cell) => cell.is_blocked(checker),
            None => PASS,
        }
    }

    /// Extra cost of stepping into `p`, or `None` when it cannot be entered.
    ///
    /// Materializes in-bounds cells that pass the terrain test. This is the
    /// primitive neighbor expansion is built on.
    pub fn unblocked_cost(&mut self, p: Point, checker: Option<BlockChecker<'_>>) -> Option<Cost> {
        if !self.in_bounds(p) || self.terrain_blocked(p) {
            return None;
        }
        let cost = self.cell(p).is_blocked(checker);
        if cost == NOPASS { None } else { Some(cost) }
    }

    /// The cell at `p` if it can be entered, materializing it.
    pub fn cell_if_unblocked(&mut self, p: Point, checker: Option<BlockChecker<'_>>) -> Option<&Cell> {
        self.unblocked_cost(p, checker)?;
        self.get(p)
    }

    /// Visit every materialized cell, blocked or not, in row-major order.
    pub fn for_each_cell(&self, mut f: impl FnMut(&Cell)) {
        for row in self.rows.iter().flatten() {
            for cell in row.iter().flatten() {
                f(cell);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Blocking
    // -----------------------------------------------------------------------

    /// Register `blocker` on a single cell. Out-of-range cells are ignored.
    pub fn block(&mut self, p: Point, blocker: BlockerId) {
        self.block_area(Range::sized(p, 1, 1), blocker);
    }

    /// Remove `blocker` from a single cell.
    ///
    /// Fails with [`GridError::BlockerNotFound`] if the cell does not carry
    /// that blocker; the map is left unchanged in that case.
    pub fn unblock(&mut self, p: Point, blocker: BlockerId) -> Result<()> {
        self.unblock_area(Range::sized(p, 1, 1), blocker)
    }

    /// Register `blocker` on every in-bounds cell of `area`.
    pub fn block_area(&mut self, area: Range, blocker: BlockerId) {
        for p in area.intersect(self.bounds) {
            self.cell(p).block(blocker);
        }
        self.generation += 1;
    }

    /// Remove `blocker` from every in-bounds cell of `area`.
    ///
    /// All cells are validated before any is touched, so a failed call
    /// leaves the map exactly as it was.
    pub fn unblock_area(&mut self, area: Range, blocker: BlockerId) -> Result<()> {
        let area = area.intersect(self.bounds);
        for p in area {
            let present = self.get(p).is_some_and(|c| c.has_blocker(blocker));
            if !present {
                return Err(GridError::BlockerNotFound {
                    pos: p,
                    blocker,
                    present: self.get(p).map(|c| c.blockers().to_vec()).unwrap_or_default(),
                });
            }
        }
        for p in area {
            if let Some(cell) = self.get_mut(p) {
                cell.unblock(blocker);
                if cell.is_empty() {
                    self.needs_cleanup = true;
                }
            }
        }
        self.generation += 1;
        Ok(())
    }

    /// Remove `blocker` from `p` only if it is currently blocking there.
    ///
    /// Returns whether anything was removed. Use this when an obstacle may
    /// never have been applied to the cell.
    pub fn unblock_if_present(&mut self, p: Point, blocker: BlockerId) -> bool {
        if self.is_blocked(p, None) == PASS {
            return false;
        }
        if !self.get(p).is_some_and(|c| c.has_blocker(blocker)) {
            return false;
        }
        self.unblock(p, blocker).is_ok()
    }
}

impl fmt::Debug for OccupancyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccupancyMap")
            .field("bounds", &self.bounds)
            .field("terrain", &self.terrain.is_some())
            .field("generation", &self.generation)
            .field("allocated", &self.n_alloc)
            .field("needs_cleanup", &self.needs_cleanup)
            .finish()
    }
}

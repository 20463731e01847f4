//! The [`Cell`] type: occupancy state of a single map cell.

use std::fmt;

use crate::geom::Point;

/// Cost of entering a cell on top of the unit step.
///
/// [`PASS`] and [`NOPASS`] are the two values produced by plain blockage;
/// custom checkers may return any other non-negative cost to make a cell
/// passable but expensive.
pub type Cost = f64;

/// The cell is free to pass.
pub const PASS: Cost = 0.0;

/// The cell is never passable. Infinite, so it survives addition.
pub const NOPASS: Cost = f64::INFINITY;

/// Per-cell blockage override consulted instead of `block_count`.
pub type BlockChecker<'a> = &'a dyn Fn(&Cell) -> Cost;

/// Opaque identity of an obstacle occupying one or more cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockerId(pub u64);

impl fmt::Display for BlockerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blocker#{}", self.0)
    }
}

/// Occupancy record of one materialized map cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pos: Point,
    block_count: u32,
    blockers: Option<Vec<BlockerId>>,
}

impl Cell {
    pub(crate) fn new(pos: Point) -> Self {
        Self {
            pos,
            block_count: 0,
            blockers: None,
        }
    }

    /// Position of this cell on the map.
    #[inline]
    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Number of obstacles currently overlapping this cell.
    #[inline]
    pub fn block_count(&self) -> u32 {
        self.block_count
    }

    /// Obstacles currently overlapping this cell, in blocking order.
    #[inline]
    pub fn blockers(&self) -> &[BlockerId] {
        self.blockers.as_deref().unwrap_or(&[])
    }

    /// Whether `blocker` is one of the obstacles on this cell.
    #[inline]
    pub fn has_blocker(&self, blocker: BlockerId) -> bool {
        self.blockers().contains(&blocker)
    }

    /// True when the cell carries no blockage and may be freed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.block_count == 0
    }

    /// Blockage cost of this cell. A `checker` replaces the default
    /// `block_count` rule entirely.
    #[inline]
    pub fn is_blocked(&self, checker: Option<BlockChecker<'_>>) -> Cost {
        match checker {
            Some(check) => check(self),
            None if self.block_count > 0 => NOPASS,
            None => PASS,
        }
    }

    pub(crate) fn block(&mut self, blocker: BlockerId) {
        self.block_count += 1;
        self.blockers.get_or_insert_with(Vec::new).push(blocker);
    }

    /// Remove one occurrence of `blocker`. Returns `false`, leaving the cell
    /// untouched, if the blocker is not present.
    pub(crate) fn unblock(&mut self, blocker: BlockerId) -> bool {
        let Some(list) = self.blockers.as_mut() else {
            return false;
        };
        let Some(i) = list.iter().position(|&b| b == blocker) else {
            return false;
        };
        list.remove(i);
        if list.is_empty() {
            self.blockers = None;
        }
        self.block_count = self.block_count.saturating_sub(1);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cell_passes() {
        let c = Cell::new(Point::new(1, 2));
        assert_eq!(c.pos(), Point::new(1, 2));
        assert!(c.is_empty());
        assert_eq!(c.is_blocked(None), PASS);
        assert!(c.blockers().is_empty());
    }

    #[test]
    fn block_counts_each_blocker() {
        let mut c = Cell::new(Point::ZERO);
        c.block(BlockerId(1));
        c.block(BlockerId(2));
        assert_eq!(c.block_count(), 2);
        assert_eq!(c.blockers(), &[BlockerId(1), BlockerId(2)]);
        assert_eq!(c.is_blocked(None), NOPASS);
    }

    #[test]
    fn unblock_absent_blocker_is_rejected() {
        let mut c = Cell::new(Point::ZERO);
        assert!(!c.unblock(BlockerId(9)));
        c.block(BlockerId(1));
        assert!(!c.unblock(BlockerId(9)));
        assert_eq!(c.block_count(), 1);
        assert!(c.unblock(BlockerId(1)));
        assert!(c.is_empty());
        assert!(c.blockers().is_empty());
    }

    #[test]
    fn checker_overrides_block_count() {
        let mut c = Cell::new(Point::ZERO);
        c.block(BlockerId(3));
        let soft = |_: &Cell| 2.5;
        assert_eq!(c.is_blocked(Some(&soft)), 2.5);
    }

    #[test]
    fn nopass_survives_addition() {
        assert_eq!(1.0 + NOPASS, NOPASS);
        assert!(NOPASS > 1e300);
    }
}

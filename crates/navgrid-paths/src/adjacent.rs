//! Approaching a cell on a hex map rather than entering it.

use navgrid_core::{PASS, Point};

use crate::context::AstarContext;
use crate::distance::hex_distance;
use crate::error::Result;
use crate::topology::HexMap;
use crate::traits::{NavMap, PathChecker};

impl AstarContext<HexMap> {
    /// Shortest path from `src` that ends next to `dest`, or on it when
    /// `dest` itself is free.
    ///
    /// Every free neighbor of `dest` is tried as a goal. Trailing steps
    /// that are already adjacent to `dest` are trimmed, so the path stops
    /// at the first cell touching it. Returns `None` if no neighbor is
    /// reachable.
    pub fn search_adjacent_to(
        &mut self,
        src: Point,
        dest: Point,
        path_checker: Option<&dyn PathChecker>,
    ) -> Result<Option<Vec<Point>>> {
        if self.is_free(dest) {
            let path = self.search(src, dest, path_checker)?;
            if path.last() == Some(&dest) {
                return Ok(Some(path));
            }
        }

        let mut best: Option<Vec<Point>> = None;
        for n in HexMap::hex_neighbors(dest) {
            if !self.is_free(n) {
                continue;
            }
            let mut path = self.search(src, n, path_checker)?;
            if path.last() != Some(&n) {
                continue;
            }
            while path.len() >= 2 {
                let prev = path[path.len() - 2];
                if hex_distance(prev, dest) != 1 || !self.is_free(prev) {
                    break;
                }
                path.pop();
            }
            if best.as_ref().is_none_or(|b| path.len() < b.len()) {
                best = Some(path);
            }
        }
        Ok(best)
    }

    fn is_free(&self, p: Point) -> bool {
        self.map.grid().is_blocked(p, None) == PASS
    }
}

#[cfg(test)]
mod tests {
    use navgrid_core::BlockerId;

    use super::*;
    use crate::SearchOptions;

    fn hex_ctx(w: i32, h: i32) -> AstarContext<HexMap> {
        AstarContext::new(HexMap::new(w, h), &SearchOptions::default())
    }

    #[test]
    fn free_destination_is_entered() {
        let mut ctx = hex_ctx(8, 8);
        let (src, dest) = (Point::new(0, 0), Point::new(4, 0));
        let path = ctx.search_adjacent_to(src, dest, None).unwrap().unwrap();
        assert_eq!(path.last(), Some(&dest));
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn occupied_destination_stops_alongside() {
        let mut ctx = hex_ctx(8, 8);
        let (src, dest) = (Point::new(0, 0), Point::new(4, 0));
        ctx.map_mut().block_hex(dest, BlockerId(1));
        let path = ctx.search_adjacent_to(src, dest, None).unwrap().unwrap();
        let last = *path.last().unwrap();
        assert_eq!(hex_distance(last, dest), 1);
        assert_eq!(path.len(), 3);
        // Only the final step touches the destination.
        for &p in &path[..path.len() - 1] {
            assert!(hex_distance(p, dest) > 1);
        }
    }

    #[test]
    fn surrounded_destination_has_no_approach() {
        let mut ctx = hex_ctx(8, 8);
        let dest = Point::new(4, 4);
        ctx.map_mut().block_hex(dest, BlockerId(1));
        for n in HexMap::hex_neighbors(dest) {
            ctx.map_mut().block_hex(n, BlockerId(2));
        }
        assert_eq!(ctx.search_adjacent_to(Point::new(0, 0), dest, None).unwrap(), None);
    }

    #[test]
    fn already_adjacent_source_has_no_steps() {
        let mut ctx = hex_ctx(8, 8);
        let dest = Point::new(3, 3);
        ctx.map_mut().block_hex(dest, BlockerId(1));
        let src = Point::new(2, 3);
        // The source's own cell cannot be a goal, so another neighbor is
        // reached in one step along the ring.
        let path = ctx.search_adjacent_to(src, dest, None).unwrap().unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(hex_distance(path[0], dest), 1);
    }
}

use std::cell::RefCell;
use std::collections::BinaryHeap;

use log::{debug, trace};
use navgrid_core::{BlockChecker, Cell, Point};

use crate::context::{ASTAR_MAX_ITER, AstarContext, NodeRef, TraceStep};
use crate::error::{PathError, Result};
use crate::traits::{NavMap, PathChecker};

impl<M: NavMap> AstarContext<M> {
    /// Find a path from `start` to `end` using A*.
    ///
    /// The returned path excludes `start` and, when `end` is reachable, ends
    /// with `end`. Each step costs 1 plus whatever extra cost the map (or
    /// `path_checker`) assigns to the cell being entered.
    ///
    /// When `end` cannot be reached, or the soft iteration limit runs out,
    /// the path leads to the expanded node with the smallest heuristic
    /// estimate instead. It is empty when no progress at all was possible,
    /// when either endpoint is off the map, or when `start == end`.
    ///
    /// Fails only when the hard [`ASTAR_MAX_ITER`] ceiling is hit.
    pub fn search(
        &mut self,
        start: Point,
        end: Point,
        path_checker: Option<&dyn PathChecker>,
    ) -> Result<Vec<Point>> {
        let grid = self.map.grid();
        let (Some(start_idx), Some(goal_idx)) = (grid.index(start), grid.index(end)) else {
            return Ok(Vec::new());
        };
        let map_len = grid.bounds().len();

        self.begin_query();
        self.map.grid_mut().cell(start);
        self.map.grid_mut().cell(end);

        let heuristic = self.heuristic;
        let iter_limit = self.iter_limit;
        let mut open: BinaryHeap<NodeRef> = BinaryHeap::new();
        open.push(NodeRef {
            idx: start_idx,
            f: self.node(start_idx).f,
        });

        let mut best: Option<(usize, f64)> = None;
        let mut iterations = 0;
        let mut nbuf = std::mem::take(&mut self.nbuf);

        let found = 'search: loop {
            let Some(current) = open.pop() else {
                break 'search false;
            };
            let ci = current.idx;

            // Skip stale entries.
            if self.node(ci).closed {
                continue;
            }

            iterations += 1;
            if iterations >= ASTAR_MAX_ITER {
                self.nbuf = nbuf;
                return Err(PathError::IterationCeiling {
                    start,
                    end,
                    iterations,
                });
            }
            if iter_limit.is_some_and(|limit| iterations >= limit) {
                trace!("A* {start} -> {end}: soft limit reached after {iterations} iterations");
                break 'search false;
            }

            let current_point = self.point(ci);
            let current_g = self.nodes[ci].g;
            if let Some(steps) = self.trace.as_mut() {
                steps.push(TraceStep {
                    pos: current_point,
                    g: current_g,
                });
            }
            if ci == goal_idx {
                break 'search true;
            }
            self.nodes[ci].closed = true;

            nbuf.clear();
            match path_checker {
                Some(checker) => {
                    let partial = RefCell::new(self.path_to(ci));
                    let per_cell: BlockChecker<'_> = &|cell: &Cell| {
                        let mut steps = partial.borrow_mut();
                        steps.push(cell.pos());
                        let cost = checker.cost(cell, &steps);
                        steps.pop();
                        cost
                    };
                    self.map.unblocked_neighbors(current_point, Some(per_cell), &mut nbuf);
                }
                None => self.map.unblocked_neighbors(current_point, None, &mut nbuf),
            }

            for &(np, extra) in nbuf.iter() {
                let Some(ni) = self.map.grid().index(np) else {
                    continue;
                };
                let n = self.node(ni);
                if n.closed {
                    continue;
                }
                let tentative_g = current_g + 1.0 + extra;
                let seen = n.visited;
                if seen && tentative_g >= n.g {
                    continue;
                }
                if !seen {
                    n.visited = true;
                    n.h = heuristic.estimate(start, np, end);
                }
                n.parent = ci;
                n.g = tentative_g;
                n.f = tentative_g + n.h;
                let (h, f) = (n.h, n.f);
                if best.is_none_or(|(_, best_h)| h < best_h) {
                    best = Some((ni, h));
                }
                open.push(NodeRef { idx: ni, f });
            }
        };

        self.nbuf = nbuf;

        if iterations as usize * 4 >= map_len {
            debug!("A* {start} -> {end}: {iterations} iterations on a map of {map_len} cells");
        }

        let path = match (found, best) {
            (true, _) => self.path_to(goal_idx),
            (false, Some((idx, _))) => self.path_to(idx),
            (false, None) => Vec::new(),
        };
        trace!(
            "A* {start} -> {end}: {} steps ({}) after {iterations} iterations",
            path.len(),
            if found { "complete" } else { "partial" }
        );
        Ok(path)
    }
}

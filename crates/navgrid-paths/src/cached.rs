//! Memoizing wrapper around [`AstarContext`].
//!
//! Results are keyed by start, end, ring size and checker key, and the whole
//! cache is dropped as soon as the map's generation moves. A connectivity
//! analysis, rebuilt lazily after each change, lets unchecked queries between
//! disconnected regions return at once.

use std::collections::HashMap;

use log::{debug, info, trace, warn};
use navgrid_core::{BlockChecker, Cell, NOPASS, Point};

use crate::connectivity::{BLOCKED_REGION, Connectivity};
use crate::context::AstarContext;
use crate::error::{PathError, Result};
use crate::options::SearchOptions;
use crate::traits::{KeyedChecker, NavMap};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    start: Point,
    end: Point,
    /// 0 for plain searches.
    ring_size: u32,
    checker: Option<String>,
}

impl CacheKey {
    fn new(start: Point, end: Point, ring_size: u32, checker: Option<KeyedChecker<'_>>) -> Self {
        Self {
            start,
            end,
            ring_size,
            checker: checker.map(|c| c.key().to_owned()),
        }
    }
}

/// Cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries currently cached.
    pub size: usize,
    /// Largest `size` seen since construction.
    pub peak_size: usize,
}

/// An [`AstarContext`] that remembers its answers until the map changes.
pub struct CachedAstarContext<M> {
    base: AstarContext<M>,
    use_connectivity: bool,
    cache: HashMap<CacheKey, Vec<Point>>,
    /// Map generation the cache and connectivity were built against.
    cache_generation: Option<u64>,
    connectivity: Option<Connectivity>,
    stats: CacheStats,
}

impl<M: NavMap> CachedAstarContext<M> {
    pub fn new(map: M, options: &SearchOptions) -> Self {
        if options.use_connectivity && !M::HAS_CONNECTIVITY {
            warn!("connectivity pre-check requested on a map without connectivity analysis; ignoring");
        }
        Self {
            base: AstarContext::new(map, options),
            use_connectivity: options.use_connectivity && M::HAS_CONNECTIVITY,
            cache: HashMap::new(),
            cache_generation: None,
            connectivity: None,
            stats: CacheStats::default(),
        }
    }

    #[inline]
    pub fn map(&self) -> &M {
        self.base.map()
    }

    /// Mutable access to the map. Any obstacle change invalidates the cache
    /// on the next query.
    #[inline]
    pub fn map_mut(&mut self) -> &mut M {
        self.base.map_mut()
    }

    /// The uncached context underneath.
    pub fn base(&self) -> &AstarContext<M> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut AstarContext<M> {
        &mut self.base
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn log_stats(&self) {
        let CacheStats {
            hits,
            misses,
            size,
            peak_size,
        } = self.stats;
        info!("path cache: {hits} hits, {misses} misses, {size} entries (peak {peak_size})");
    }

    // -----------------------------------------------------------------------
    // Invalidation
    // -----------------------------------------------------------------------

    fn check_dirty(&mut self) {
        let generation = self.base.map().grid().generation();
        if self.cache_generation == Some(generation) {
            return;
        }
        if !self.cache.is_empty() {
            debug!("map changed (generation {generation}), dropping {} cached paths", self.cache.len());
        }
        self.cache.clear();
        self.stats.size = 0;
        self.connectivity = None;
        self.cache_generation = Some(generation);
    }

    fn remember(&mut self, key: CacheKey, path: &[Point]) {
        self.cache.insert(key, path.to_vec());
        self.stats.size = self.cache.len();
        self.stats.peak_size = self.stats.peak_size.max(self.stats.size);
    }

    fn lookup(&mut self, key: &CacheKey) -> Option<Vec<Point>> {
        match self.cache.get(key) {
            Some(path) => {
                self.stats.hits += 1;
                Some(path.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Region id of `p` for unchecked queries. Always 0 when connectivity is
    /// not in use.
    fn region(&mut self, p: Point) -> i32 {
        if !self.use_connectivity {
            return 0;
        }
        if self.connectivity.is_none() {
            self.connectivity = self.base.map().connectivity();
        }
        self.connectivity.as_ref().map_or(0, |c| c.region_num(p))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Connected region of `p`, or `None` when connectivity is not in use.
    /// Blocked cells report [`BLOCKED_REGION`].
    pub fn region_num(&mut self, p: Point) -> Option<i32> {
        self.check_dirty();
        if !self.use_connectivity {
            return None;
        }
        Some(self.region(p))
    }

    /// Cached [`AstarContext::search`].
    ///
    /// Without a checker, a start cell that is blocked or lies in a
    /// different region than `end` yields an empty path without searching.
    pub fn search(
        &mut self,
        start: Point,
        end: Point,
        checker: Option<KeyedChecker<'_>>,
    ) -> Result<Vec<Point>> {
        validate_key(checker)?;
        self.check_dirty();
        let key = CacheKey::new(start, end, 0, checker);
        if let Some(path) = self.lookup(&key) {
            return Ok(path);
        }

        let path = if checker.is_none() && self.disconnected(start, end) {
            Vec::new()
        } else {
            self.base.search(start, end, checker.map(|c| c.checker()))?
        };
        self.remember(key, &path);
        Ok(path)
    }

    fn disconnected(&mut self, start: Point, end: Point) -> bool {
        let start_region = self.region(start);
        start_region < 0 || start_region != self.region(end)
    }

    /// Path to the nearest usable cell around `end`.
    ///
    /// Rings of radius 1 up to `ring_size` around `end` are tried in turn.
    /// Rings with no cell on the map are skipped, so `end` may lie off the
    /// map and `ring_size` may exceed its dimensions. Candidates on a ring
    /// must be free (under the checker, if any) and, when connectivity is
    /// in use, in the same region as `start`. They are tried closest to
    /// `start` first, and the first one a full path reaches wins. A partial
    /// path that stops short of its candidate is discarded, never returned.
    /// The result is empty when no ring yields a full path.
    pub fn ring_search(
        &mut self,
        start: Point,
        end: Point,
        ring_size: u32,
        checker: Option<KeyedChecker<'_>>,
    ) -> Result<Vec<Point>> {
        if ring_size < 1 {
            return Err(PathError::InvalidRingSize(ring_size));
        }
        validate_key(checker)?;
        self.check_dirty();
        let key = CacheKey::new(start, end, ring_size, checker);
        if let Some(path) = self.lookup(&key) {
            return Ok(path);
        }

        let start_region = if checker.is_none() { self.region(start) } else { 0 };
        let mut found = None;
        if start_region != BLOCKED_REGION {
            let (near, far) = self.ring_bounds(end);
            let last = i64::from(ring_size).min(far);
            'rings: for r in near.max(1)..=last {
                for candidate in self.ring_candidates(start, end, r, start_region, checker) {
                    let path = self.search(start, candidate, checker)?;
                    if path.last() == Some(&candidate) {
                        trace!("ring search {start} -> {end}: reached {candidate} on ring {r}");
                        found = Some(path);
                        break 'rings;
                    }
                }
            }
        }
        let path = found.unwrap_or_default();
        self.remember(key, &path);
        Ok(path)
    }

    /// Smallest and largest ring radius around `end` that touch the map.
    fn ring_bounds(&self, end: Point) -> (i64, i64) {
        let grid = self.base.map().grid();
        let axis = |c: i32, len: i32| {
            let (c, hi) = (i64::from(c), i64::from(len) - 1);
            ((-c).max(c - hi).max(0), c.max(hi - c))
        };
        let (near_x, far_x) = axis(end.x, grid.width());
        let (near_y, far_y) = axis(end.y, grid.height());
        (near_x.max(near_y), far_x.max(far_y))
    }

    /// Usable cells on the square ring of radius `r` around `end`, closest
    /// to `start` first. Only cells on the map are considered.
    fn ring_candidates(
        &mut self,
        start: Point,
        end: Point,
        r: i64,
        start_region: i32,
        checker: Option<KeyedChecker<'_>>,
    ) -> Vec<Point> {
        let grid = self.base.map().grid();
        let (w, h) = (i64::from(grid.width()), i64::from(grid.height()));
        let (ex, ey) = (i64::from(end.x), i64::from(end.y));
        let mut cells = Vec::new();
        for x in (ex - r).max(0)..=(ex + r).min(w - 1) {
            if x == ex - r || x == ex + r {
                cells.extend(((ey - r).max(0)..=(ey + r).min(h - 1)).map(|y| (x, y)));
            } else {
                let ends = [ey - r, ey + r].into_iter().filter(|y| (0..h).contains(y));
                cells.extend(ends.map(|y| (x, y)));
            }
        }

        let mut candidates = Vec::new();
        for (x, y) in cells {
            // Both coordinates lie within the map, so they fit in i32.
            let p = Point::new(x as i32, y as i32);
            if checker.is_none() && self.region(p) != start_region {
                continue;
            }
            let grid = self.base.map().grid();
            let cost = match checker {
                Some(kc) => {
                    let single: BlockChecker<'_> = &|cell: &Cell| kc.checker().cost(cell, &[cell.pos()]);
                    grid.is_blocked(p, Some(single))
                }
                None => grid.is_blocked(p, None),
            };
            if cost != NOPASS {
                candidates.push(p);
            }
        }
        candidates.sort_by(|a, b| {
            a.distance(start)
                .total_cmp(&b.distance(start))
                .then_with(|| a.cmp(b))
        });
        candidates
    }
}

fn validate_key(checker: Option<KeyedChecker<'_>>) -> Result<()> {
    match checker {
        Some(kc) if kc.key().is_empty() => Err(PathError::MissingCheckerKey),
        _ => Ok(()),
    }
}

impl<M: std::fmt::Debug> std::fmt::Debug for CachedAstarContext<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedAstarContext")
            .field("base", &self.base)
            .field("use_connectivity", &self.use_connectivity)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

//! Connected-region labelling of a rectangular occupancy map.
//!
//! Each passable cell receives a region id starting at 1. Two passable cells
//! share an id exactly when a 4-way path joins them. Blocked cells get
//! [`BLOCKED_REGION`].

use log::trace;
use navgrid_core::{OccupancyMap, PASS, Point};

/// Region id of blocked and out-of-range cells.
pub const BLOCKED_REGION: i32 = -1;

const UNLABELLED: i32 = 0;

/// A snapshot of the map's connected regions. It does not track later
/// obstacle changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connectivity {
    width: i32,
    height: i32,
    labels: Vec<i32>,
    regions: i32,
}

impl Connectivity {
    /// Label every cell of `map` with a scanline flood fill.
    pub fn new(map: &OccupancyMap) -> Self {
        let (width, height) = (map.width(), map.height());
        let idx = |p: Point| (p.y * width + p.x) as usize;
        let passable = |p: Point| map.is_blocked(p, None) == PASS;
        let open = |p: Point, labels: &[i32]| passable(p) && labels[idx(p)] == UNLABELLED;
        let mut labels = vec![UNLABELLED; (width as usize) * (height as usize)];
        let mut regions = 0;
        let mut stack = Vec::new();

        for y in 0..height {
            for x in 0..width {
                let p = Point::new(x, y);
                if labels[idx(p)] != UNLABELLED {
                    continue;
                }
                if !passable(p) {
                    labels[idx(p)] = BLOCKED_REGION;
                    continue;
                }
                regions += 1;
                stack.push(p);
                while let Some(seed) = stack.pop() {
                    if labels[idx(seed)] != UNLABELLED {
                        continue;
                    }
                    let mut west = seed.x;
                    while west > 0 && open(Point::new(west - 1, seed.y), &labels) {
                        west -= 1;
                    }
                    let mut east = seed.x;
                    while east + 1 < width && open(Point::new(east + 1, seed.y), &labels) {
                        east += 1;
                    }
                    for sx in west..=east {
                        labels[idx(Point::new(sx, seed.y))] = regions;
                        for ny in [seed.y - 1, seed.y + 1] {
                            let q = Point::new(sx, ny);
                            if (0..height).contains(&ny) && open(q, &labels) {
                                stack.push(q);
                            }
                        }
                    }
                }
            }
        }
        trace!("connectivity: {regions} regions on a {width}x{height} map");
        Self {
            width,
            height,
            labels,
            regions,
        }
    }

    #[inline]
    fn idx(&self, p: Point) -> usize {
        (p.y * self.width + p.x) as usize
    }

    /// Region id of `p`, or [`BLOCKED_REGION`] for blocked and out-of-range
    /// cells.
    pub fn region_num(&self, p: Point) -> i32 {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return BLOCKED_REGION;
        }
        self.labels[self.idx(p)]
    }

    /// Number of distinct passable regions.
    pub fn region_count(&self) -> i32 {
        self.regions
    }

    pub fn size(&self) -> Point {
        Point::new(self.width, self.height)
    }
}

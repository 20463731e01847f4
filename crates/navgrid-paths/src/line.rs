//! Straight-line rasterization, clearance tests and path smoothing on
//! rectangular maps.
//!
//! Two rasterizers are available. Bresenham lines step diagonally and can
//! therefore pass between two obstacles that only touch at a corner. Voxel
//! traversal visits every cell the segment crosses and never does.
//! [`RectMap::linear_path`] picks one according to
//! [`RectMap::allow_diagonal_passage`].

use navgrid_core::{PASS, Point, Vec2};

use crate::error::{PathError, Result};
use crate::topology::RectMap;
use crate::traits::NavMap;

/// Steps after which a rasterizer is considered stuck.
pub const MAX_RASTER_STEPS: u32 = 10_000;

/// Walk the Bresenham line from `start` towards `end`, calling `visit` on
/// every cell before leaving it. Returns `Ok(false)` as soon as `visit`
/// does, `Ok(true)` once `end` is reached (`end` itself is not visited).
fn bresenham_walk(start: Point, end: Point, mut visit: impl FnMut(Point) -> bool) -> Result<bool> {
    // Error terms in i64: twice the span of two i32 coordinates fits.
    let dx = (i64::from(end.x) - i64::from(start.x)).abs();
    let dy = (i64::from(end.y) - i64::from(start.y)).abs();
    let sx = if start.x < end.x { 1 } else { -1 };
    let sy = if start.y < end.y { 1 } else { -1 };
    let mut err = dx - dy;
    let mut cur = start;
    let mut steps = 0;
    while cur != end {
        if !visit(cur) {
            return Ok(false);
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            cur.x += sx;
        }
        if e2 < dx {
            err += dx;
            cur.y += sy;
        }
        steps += 1;
        if steps >= MAX_RASTER_STEPS {
            return Err(PathError::RunawayRaster {
                from: start.into(),
                to: end.into(),
                at: cur.into(),
            });
        }
    }
    Ok(true)
}

fn same_cell(a: Vec2, b: Vec2) -> bool {
    // Compared as floats so that NaN never matches.
    a.x.floor() == b.x.floor() && a.y.floor() == b.y.floor()
}

/// Voxel traversal from `start` towards `end`. `visit` sees each position
/// right before the walk moves on to the next cell; `end` itself is not
/// visited.
fn voxel_walk(start: Vec2, end: Vec2, mut visit: impl FnMut(Vec2) -> bool) -> Result<bool> {
    let origin = [start.x, start.y];
    let dir = [end.x - start.x, end.y - start.y];
    let step = [
        if start.x < end.x { 1.0 } else { -1.0 },
        if start.y < end.y { 1.0 } else { -1.0 },
    ];
    // Parametric distance to the next cell boundary, and between boundaries.
    let mut t_max = [f64::INFINITY; 2];
    let mut t_delta = [0.0; 2];
    for i in 0..2 {
        if dir[i] > 0.0 {
            t_max[i] = ((origin[i] + 1.0).floor() - origin[i]) / dir[i];
            t_delta[i] = 1.0 / dir[i];
        } else if dir[i] < 0.0 {
            t_max[i] = (origin[i].floor() - origin[i]) / dir[i];
            t_delta[i] = -1.0 / dir[i];
        }
    }

    let mut cur = start;
    let mut steps = 0;
    while !same_cell(cur, end) {
        if t_max[0] < t_max[1] {
            if cur.x.floor() != end.x.floor() {
                if !visit(cur) {
                    return Ok(false);
                }
                cur.x += step[0];
            }
            t_max[0] += t_delta[0];
        } else {
            if cur.y.floor() != end.y.floor() {
                if !visit(cur) {
                    return Ok(false);
                }
                cur.y += step[1];
            }
            t_max[1] += t_delta[1];
        }
        steps += 1;
        if steps >= MAX_RASTER_STEPS {
            return Err(PathError::RunawayRaster {
                from: start,
                to: end,
                at: cur,
            });
        }
    }
    Ok(true)
}

impl RectMap {
    /// Cells of the Bresenham line from `start` to `end`, both included.
    pub fn bresenham_path(&self, start: Point, end: Point) -> Result<Vec<Point>> {
        let mut path = Vec::new();
        bresenham_walk(start, end, |p| {
            path.push(p);
            true
        })?;
        path.push(end);
        Ok(path)
    }

    /// Whether every cell of the Bresenham line from `start` up to, but not
    /// including, `end` is free.
    pub fn bresenham_path_is_clear(&self, start: Point, end: Point) -> Result<bool> {
        bresenham_walk(start, end, |p| self.grid().is_blocked(p, None) == PASS)
    }

    /// Positions visited by a voxel traversal from `start` to `end`: `start`,
    /// one position per cell boundary crossed, then the exact `end` point.
    ///
    /// Intermediate positions are `start` shifted by whole cells, so only
    /// their cell is meaningful. The position stepped into the end cell is
    /// not returned: `end` as given takes its place.
    pub fn voxel_path(&self, start: Vec2, end: Vec2) -> Result<Vec<Vec2>> {
        let mut path = Vec::new();
        voxel_walk(start, end, |v| {
            path.push(v);
            true
        })?;
        path.push(end);
        Ok(path)
    }

    /// Whether every cell crossed by the segment from `start` to `end`,
    /// both end cells included, is free.
    pub fn voxel_path_is_clear(&self, start: Vec2, end: Vec2) -> Result<bool> {
        let free = |v: Vec2| self.grid().is_blocked(v.floor(), None) == PASS;
        Ok(voxel_walk(start, end, free)? && free(end))
    }

    /// The line used for movement: Bresenham when diagonal passage is
    /// allowed, voxel traversal otherwise.
    pub fn linear_path(&self, start: Vec2, end: Vec2) -> Result<Vec<Vec2>> {
        if self.allow_diagonal_passage() {
            let cells = self.bresenham_path(start.floor(), end.floor())?;
            Ok(cells.into_iter().map(Vec2::from).collect())
        } else {
            self.voxel_path(start, end)
        }
    }

    /// Clearance test matching [`RectMap::linear_path`].
    pub fn linear_path_is_clear(&self, start: Vec2, end: Vec2) -> Result<bool> {
        if self.allow_diagonal_passage() {
            self.bresenham_path_is_clear(start.floor(), end.floor())
        } else {
            self.voxel_path_is_clear(start, end)
        }
    }

    /// Drop waypoints that a straight line can skip.
    ///
    /// Starting from the first waypoint as anchor, each following waypoint
    /// is removed when the anchor has a clear line to the one after it;
    /// otherwise it becomes the new anchor. The first and last waypoints
    /// are always kept.
    pub fn smooth_path<P>(&self, path: &mut Vec<P>) -> Result<()>
    where
        P: Copy + Into<Vec2>,
    {
        if path.len() < 3 {
            return Ok(());
        }
        let mut anchor = path[0];
        let mut i = 1;
        while i + 1 < path.len() {
            if self.linear_path_is_clear(anchor.into(), path[i + 1].into())? {
                path.remove(i);
            } else {
                anchor = path[i];
                i += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use navgrid_core::BlockerId;

    use super::*;

    fn map_with_block(p: Point) -> RectMap {
        let mut map = RectMap::new(10, 10);
        map.grid_mut().block(p, BlockerId(1));
        map
    }

    #[test]
    fn bresenham_diagonal() {
        let map = RectMap::new(10, 10);
        let path = map.bresenham_path(Point::new(0, 0), Point::new(3, 3)).unwrap();
        assert_eq!(
            path,
            vec![Point::new(0, 0), Point::new(1, 1), Point::new(2, 2), Point::new(3, 3)]
        );
        assert_eq!(map.bresenham_path(Point::new(2, 2), Point::new(2, 2)).unwrap(), vec![Point::new(2, 2)]);
    }

    #[test]
    fn bresenham_shallow_line_is_connected() {
        let map = RectMap::new(10, 10);
        let path = map.bresenham_path(Point::new(0, 0), Point::new(6, 2)).unwrap();
        assert_eq!(path.first(), Some(&Point::new(0, 0)));
        assert_eq!(path.last(), Some(&Point::new(6, 2)));
        assert_eq!(path.len(), 7);
        for w in path.windows(2) {
            assert!((w[1].x - w[0].x).abs() <= 1 && (w[1].y - w[0].y).abs() <= 1);
        }
    }

    #[test]
    fn clear_checks_exclude_or_include_the_end_cell() {
        let map = map_with_block(Point::new(5, 5));
        let (a, b) = (Point::new(0, 0), Point::new(5, 5));
        assert!(map.bresenham_path_is_clear(a, b).unwrap());
        assert!(!map.voxel_path_is_clear(a.into(), b.into()).unwrap());
    }

    #[test]
    fn bresenham_slips_between_corner_obstacles() {
        // (1,0) and (0,1) are walls; the diagonal from (0,0) to (1,1) only
        // touches them at a corner.
        let mut map = RectMap::new(3, 3);
        map.grid_mut().block(Point::new(1, 0), BlockerId(1));
        map.grid_mut().block(Point::new(0, 1), BlockerId(1));
        let (a, b) = (Vec2::new(0.5, 0.5), Vec2::new(1.5, 1.5));
        assert!(map.bresenham_path_is_clear(a.floor(), b.floor()).unwrap());
        assert!(!map.voxel_path_is_clear(a, b).unwrap());

        map.set_allow_diagonal_passage(true);
        assert!(map.linear_path_is_clear(a, b).unwrap());
        map.set_allow_diagonal_passage(false);
        assert!(!map.linear_path_is_clear(a, b).unwrap());
    }

    #[test]
    fn voxel_path_crosses_each_cell() {
        let map = RectMap::new(10, 10);
        let path = map.voxel_path(Vec2::new(0.5, 0.5), Vec2::new(3.5, 1.5)).unwrap();
        let cells: Vec<Point> = path.iter().map(|v| v.floor()).collect();
        assert_eq!(cells.first(), Some(&Point::new(0, 0)));
        assert_eq!(cells.last(), Some(&Point::new(3, 1)));
        // 3 steps east and 1 step south, never diagonal.
        assert_eq!(cells.len(), 5);
        for w in cells.windows(2) {
            assert_eq!((w[1].x - w[0].x).abs() + (w[1].y - w[0].y).abs(), 1);
        }
    }

    #[test]
    fn voxel_path_same_cell() {
        let map = RectMap::new(4, 4);
        let (a, b) = (Vec2::new(1.2, 1.3), Vec2::new(1.8, 1.9));
        assert_eq!(map.voxel_path(a, b).unwrap(), vec![b]);
        assert!(map.voxel_path_is_clear(a, b).unwrap());
    }

    #[test]
    fn linear_path_follows_diagonal_setting() {
        let mut map = RectMap::new(5, 5);
        let (a, b) = (Vec2::new(0.5, 0.5), Vec2::new(2.5, 2.5));
        let voxel = map.linear_path(a, b).unwrap();
        map.set_allow_diagonal_passage(true);
        let diag = map.linear_path(a, b).unwrap();
        assert_eq!(diag, vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)]);
        assert!(voxel.len() > diag.len());
    }

    #[test]
    fn voxel_path_ends_on_the_exact_end_point() {
        let map = RectMap::new(10, 10);
        let (a, b) = (Vec2::new(0.25, 0.5), Vec2::new(3.75, 0.5));
        let path = map.voxel_path(a, b).unwrap();
        assert_eq!(
            path,
            vec![a, Vec2::new(1.25, 0.5), Vec2::new(2.25, 0.5), b]
        );
    }

    #[test]
    fn huge_spans_hit_the_step_guard() {
        let map = RectMap::new(4, 4);
        let far = Point::new(2_000_000_000, 0);
        let err = map.bresenham_path_is_clear(Point::new(0, 0), far).unwrap_err();
        assert!(matches!(err, PathError::RunawayRaster { .. }));
        let err = map
            .bresenham_path(Point::new(i32::MIN, -5), Point::new(i32::MAX, 7))
            .unwrap_err();
        assert!(matches!(err, PathError::RunawayRaster { .. }));
    }

    #[test]
    fn runaway_raster_is_an_error() {
        let map = RectMap::new(4, 4);
        let err = map
            .voxel_path_is_clear(Vec2::new(f64::NAN, 0.5), Vec2::new(3.5, 0.5))
            .unwrap_err();
        assert!(matches!(err, PathError::RunawayRaster { .. }));

        let err = map.bresenham_path(Point::new(0, 0), Point::new(20_000, 0)).unwrap_err();
        assert!(matches!(err, PathError::RunawayRaster { .. }));
    }

    #[test]
    fn smoothing_removes_redundant_waypoints() {
        let map = RectMap::new(10, 10);
        let mut path: Vec<Point> = (0..6).map(|x| Point::new(x, 2)).collect();
        map.smooth_path(&mut path).unwrap();
        assert_eq!(path, vec![Point::new(0, 2), Point::new(5, 2)]);
    }

    #[test]
    fn smoothing_keeps_corners_around_walls() {
        // Wall at (1..3, 0..2) forces an L-shaped route.
        let mut map = RectMap::new(5, 5);
        map.block_map(navgrid_core::Range::new(1, 0, 3, 2), BlockerId(1));
        let mut path = vec![
            Vec2::new(0.5, 0.5),
            Vec2::new(0.5, 1.5),
            Vec2::new(0.5, 2.5),
            Vec2::new(1.5, 2.5),
            Vec2::new(2.5, 2.5),
            Vec2::new(3.5, 2.5),
            Vec2::new(3.5, 1.5),
            Vec2::new(3.5, 0.5),
        ];
        let before = path.len();
        map.smooth_path(&mut path).unwrap();
        assert!(path.len() < before);
        assert_eq!(path.first(), Some(&Vec2::new(0.5, 0.5)));
        assert_eq!(path.last(), Some(&Vec2::new(3.5, 0.5)));
        for w in path.windows(2) {
            assert!(map.linear_path_is_clear(w[0], w[1]).unwrap());
        }
    }

    #[test]
    fn short_paths_are_untouched() {
        let map = RectMap::new(3, 3);
        let mut path = vec![Point::new(0, 0), Point::new(2, 2)];
        map.smooth_path(&mut path).unwrap();
        assert_eq!(path.len(), 2);
    }
}

use navgrid_core::Point;

/// Manhattan (L1) distance between two points.
#[inline]
pub fn manhattan(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Chebyshev (L∞) distance between two points.
#[inline]
pub fn chebyshev(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Number of steps between two cells of an odd-row-shifted hex map.
#[inline]
pub fn hex_distance(a: Point, b: Point) -> i32 {
    // Slant the offset coordinates into axial ones.
    let ax = a.x - a.y.div_euclid(2);
    let bx = b.x - b.y.div_euclid(2);
    let dx = bx - ax;
    let dy = b.y - a.y;
    dx.abs().max(dy.abs()).max((dx + dy).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_metrics() {
        let a = Point::new(1, 1);
        let b = Point::new(4, -1);
        assert_eq!(manhattan(a, b), 5);
        assert_eq!(chebyshev(a, b), 3);
    }

    #[test]
    fn hex_neighbors_are_one_step() {
        // Row 1 is odd, so its diagonal neighbours lean east.
        let p = Point::new(3, 1);
        for n in [
            Point::new(2, 1),
            Point::new(4, 1),
            Point::new(3, 0),
            Point::new(4, 0),
            Point::new(3, 2),
            Point::new(4, 2),
        ] {
            assert_eq!(hex_distance(p, n), 1, "{n}");
        }
        assert_eq!(hex_distance(p, Point::new(2, 0)), 2);
    }

    #[test]
    fn hex_distance_is_symmetric() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 5);
        assert_eq!(hex_distance(a, b), hex_distance(b, a));
        assert_eq!(hex_distance(a, Point::new(0, 4)), 4);
        assert_eq!(hex_distance(a, Point::new(5, 0)), 5);
    }
}

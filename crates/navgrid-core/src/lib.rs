//! **navgrid-core**: occupancy maps for grid pathfinding (core types).
//!
//! This crate provides the foundational types used by `navgrid-paths`:
//! geometry primitives, the per-cell obstacle record, and the lazily
//! allocated [`OccupancyMap`] that obstacles are registered on.

pub mod cell;
pub mod error;
pub mod geom;
pub mod map;

pub use cell::{BlockChecker, BlockerId, Cell, Cost, NOPASS, PASS};
pub use error::GridError;
pub use geom::{Point, Range, Vec2};
pub use map::{OccupancyMap, TerrainFn};

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn point_round_trip() {
        let p = Point::new(-3, 7);
        let json = serde_json::to_string(&p).unwrap();
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn range_and_blocker_round_trip() {
        let r = Range::new(1, 2, 10, 20);
        let back: Range = serde_json::from_str(&serde_json::to_string(&r).unwrap()).unwrap();
        assert_eq!(r, back);

        let b = BlockerId(42);
        assert_eq!(serde_json::to_string(&b).unwrap(), "42");
    }
}

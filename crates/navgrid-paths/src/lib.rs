//! Pathfinding on grid occupancy maps.
//!
//! This crate builds on `navgrid-core` to provide:
//!
//! - **Topologies**: 4-way [`RectMap`] and 6-way offset [`HexMap`]
//! - **Line tracing**: Bresenham and voxel lines, clearance checks and path
//!   smoothing on rectangular maps ([`RectMap::linear_path_is_clear`],
//!   [`RectMap::smooth_path`])
//! - **Connectivity** labelling of passable regions ([`Connectivity`])
//! - **A\*** with partial-path fallback ([`AstarContext::search`]) and hex
//!   approach queries ([`AstarContext::search_adjacent_to`])
//! - **Caching**: [`CachedAstarContext`] memoizes searches and adds
//!   [`CachedAstarContext::ring_search`]
//!
//! A context owns its map; obstacles are changed through
//! [`AstarContext::map_mut`] between queries.
//!
//! # Trait hierarchy
//!
//! | Trait | Role |
//! |---|---|
//! | [`NavMap`] | neighbor expansion over an occupancy map |
//! | [`PathChecker`] | per-query step cost that can see the path so far |

mod adjacent;
mod astar;
mod cached;
mod connectivity;
mod context;
mod distance;
mod error;
mod heuristic;
mod line;
mod options;
mod topology;
mod traits;

pub use cached::{CacheStats, CachedAstarContext};
pub use connectivity::{BLOCKED_REGION, Connectivity};
pub use context::{ASTAR_MAX_ITER, AstarContext, TraceStep};
pub use distance::{chebyshev, hex_distance, manhattan};
pub use error::{PathError, Result};
pub use heuristic::Heuristic;
pub use line::MAX_RASTER_STEPS;
pub use options::SearchOptions;
pub use topology::{HexMap, RectMap};
pub use traits::{KeyedChecker, NavMap, PathChecker};

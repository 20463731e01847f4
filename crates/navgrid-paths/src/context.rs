use std::cmp::Ordering;

use navgrid_core::{Cost, Point};

use crate::heuristic::Heuristic;
use crate::options::SearchOptions;
use crate::traits::NavMap;

/// Hard ceiling on A* expansions. Reaching it means the search is broken,
/// and is reported as [`PathError::IterationCeiling`](crate::PathError).
pub const ASTAR_MAX_ITER: u32 = 999_999;

pub(crate) const NO_PARENT: usize = usize::MAX;

// ---------------------------------------------------------------------------
// Internal node for the A* priority-queue search
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub(crate) struct Node {
    pub(crate) generation: u32,
    pub(crate) g: f64,
    pub(crate) h: f64,
    pub(crate) f: f64,
    pub(crate) parent: usize,
    pub(crate) visited: bool,
    pub(crate) closed: bool,
}

impl Node {
    fn fresh(generation: u32) -> Self {
        Self {
            generation,
            g: 0.0,
            h: 0.0,
            f: 0.0,
            parent: NO_PARENT,
            visited: false,
            closed: false,
        }
    }
}

/// Reference into the node array, ordered by `f` for use in `BinaryHeap`.
#[derive(Clone, Copy, PartialEq)]
pub(crate) struct NodeRef {
    pub(crate) idx: usize,
    pub(crate) f: f64,
}

impl Eq for NodeRef {}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest f first.
        other.f.total_cmp(&self.f).then_with(|| other.idx.cmp(&self.idx))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One expansion recorded when tracing is enabled.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceStep {
    pub pos: Point,
    /// Cost from the search start to `pos`.
    pub g: f64,
}

// ---------------------------------------------------------------------------
// AstarContext
// ---------------------------------------------------------------------------

/// A* search state bound to one map.
///
/// The context owns the map together with every per-node scratch record, so
/// repeated queries allocate nothing after the first. Node records are
/// invalidated lazily: each search bumps a generation counter and a record
/// stamped with an older one is treated as untouched.
pub struct AstarContext<M> {
    pub(crate) map: M,
    pub(crate) heuristic: Heuristic,
    pub(crate) iter_limit: Option<u32>,
    pub(crate) generation: u32,
    pub(crate) nodes: Vec<Node>,
    // shared scratch buffer for neighbor queries
    pub(crate) nbuf: Vec<(Point, Cost)>,
    pub(crate) trace: Option<Vec<TraceStep>>,
}

impl<M: NavMap> AstarContext<M> {
    pub fn new(map: M, options: &SearchOptions) -> Self {
        let nbuf = Vec::with_capacity(map.neighbor_count());
        Self {
            map,
            heuristic: options.heuristic.unwrap_or(M::DEFAULT_HEURISTIC),
            iter_limit: options.effective_iter_limit(),
            generation: 0,
            nodes: Vec::new(),
            nbuf,
            trace: options.debug_trace.then(Vec::new),
        }
    }

    #[inline]
    pub fn map(&self) -> &M {
        &self.map
    }

    /// Mutable access to the map, for registering and removing obstacles
    /// between searches.
    #[inline]
    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn into_map(self) -> M {
        self.map
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    pub fn iter_limit(&self) -> Option<u32> {
        self.iter_limit
    }

    /// Expansions of the most recent search, in order. Empty unless the
    /// context was built with [`SearchOptions::debug_trace`].
    pub fn trace(&self) -> &[TraceStep] {
        self.trace.as_deref().unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Node bookkeeping
    // -----------------------------------------------------------------------

    /// Start a new query: invalidate all node records in O(1).
    pub(crate) fn begin_query(&mut self) {
        let len = self.map.grid().bounds().len();
        if self.nodes.len() != len {
            self.nodes.clear();
            self.nodes.resize(len, Node::fresh(0));
            self.generation = 0;
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped around: stamps from long ago could look current again.
            self.nodes.fill(Node::fresh(0));
            self.generation = 1;
        }
        if let Some(trace) = self.trace.as_mut() {
            trace.clear();
        }
    }

    /// The record of node `idx`, reset first if it belongs to an earlier
    /// query.
    #[inline]
    pub(crate) fn node(&mut self, idx: usize) -> &mut Node {
        let generation = self.generation;
        let node = &mut self.nodes[idx];
        if node.generation != generation {
            *node = Node::fresh(generation);
        }
        node
    }

    /// Convert a flat index back to a `Point`.
    #[inline]
    pub(crate) fn point(&self, idx: usize) -> Point {
        let w = self.map.grid().width() as usize;
        Point::new((idx % w) as i32, (idx / w) as i32)
    }

    /// Steps from the search start (exclusive) to `idx` (inclusive).
    pub(crate) fn path_to(&self, idx: usize) -> Vec<Point> {
        let mut path = Vec::new();
        let mut ci = idx;
        while self.nodes[ci].parent != NO_PARENT {
            path.push(self.point(ci));
            ci = self.nodes[ci].parent;
        }
        path.reverse();
        path
    }
}

impl<M: std::fmt::Debug> std::fmt::Debug for AstarContext<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstarContext")
            .field("map", &self.map)
            .field("heuristic", &self.heuristic)
            .field("iter_limit", &self.iter_limit)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

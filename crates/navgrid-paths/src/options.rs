//! Search configuration.

use crate::heuristic::Heuristic;

/// Options shared by [`AstarContext`](crate::AstarContext) and
/// [`CachedAstarContext`](crate::CachedAstarContext).
///
/// Defaults: the map's own heuristic, no soft iteration limit,
/// connectivity pre-check enabled, tracing off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SearchOptions {
    /// `None` picks [`NavMap::DEFAULT_HEURISTIC`](crate::NavMap) of the map
    /// being searched.
    pub heuristic: Option<Heuristic>,
    /// Soft cap on expansions. Reaching it ends the search with the best
    /// partial path. `None` and `Some(0)` both mean unlimited.
    pub iter_limit: Option<u32>,
    /// Let cached searches reject queries between disconnected regions
    /// without running A*. Only maps with a connectivity analysis honor it.
    pub use_connectivity: bool,
    /// Record every expanded node for later inspection.
    pub debug_trace: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            heuristic: None,
            iter_limit: None,
            use_connectivity: true,
            debug_trace: false,
        }
    }
}

impl SearchOptions {
    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = Some(heuristic);
        self
    }

    pub fn with_iter_limit(mut self, limit: u32) -> Self {
        self.iter_limit = Some(limit);
        self
    }

    pub fn with_connectivity(mut self, enabled: bool) -> Self {
        self.use_connectivity = enabled;
        self
    }

    pub fn with_debug_trace(mut self, enabled: bool) -> Self {
        self.debug_trace = enabled;
        self
    }

    /// The soft limit as a number, if one is in effect.
    pub(crate) fn effective_iter_limit(&self) -> Option<u32> {
        self.iter_limit.filter(|&n| n > 0)
    }
}

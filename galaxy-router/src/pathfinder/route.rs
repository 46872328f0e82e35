/// An ordered route between two systems.
///
/// An empty route means no path exists under the requested jump range. That
/// is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteResult {
    /// System ids from start to goal, both inclusive
    pub system_ids: Vec<u64>,
    /// Sum of the Euclidean lengths of every jump, in light years
    pub total_distance: f64,
    /// Nodes the search expanded before finishing
    pub nodes_expanded: usize,
}

impl RouteResult {
    /// The "no path" result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A zero-length route that starts at its goal.
    pub fn single(id64: u64) -> Self {
        RouteResult {
            system_ids: vec![id64],
            total_distance: 0.0,
            nodes_expanded: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.system_ids.is_empty()
    }

    /// Number of jumps, one less than the number of systems.
    pub fn jumps(&self) -> usize {
        self.system_ids.len().saturating_sub(1)
    }

    pub fn start(&self) -> Option<u64> {
        self.system_ids.first().copied()
    }

    pub fn goal(&self) -> Option<u64> {
        self.system_ids.last().copied()
    }
}

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use galaxy_router_spatial::{Point3, Slot, SpatialIndex};
use log::{debug, trace};

use super::cancel::CancellationToken;
use super::route::RouteResult;
use crate::errors::{ErrorKind, RouterError, RouterResult};

/// A* search for the shortest route under a maximum jump range.
///
/// Edge cost and heuristic are both straight-line distance, so the
/// heuristic is consistent: the first time a system is expanded its cost
/// from the start is final, and the route returned is optimal. Neighbours
/// come from a radius query on the index at every expansion.
///
/// Open entries are ordered by `f = g + h`, then by smaller `h`, then by
/// insertion order, which makes the result deterministic when several
/// routes tie. The queue has no decrease-key; stale entries for systems
/// already expanded are skipped when popped.
///
/// # Examples
///
/// ```rust
/// use galaxy_router::PathFinder;
/// use galaxy_router_spatial::{SpatialIndex, StarSystem};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let index = SpatialIndex::build(vec![
///     StarSystem::new(1, 0.0, 0.0, 0.0),
///     StarSystem::new(2, 5.0, 0.0, 0.0),
///     StarSystem::new(3, 11.0, 0.0, 0.0),
/// ])?;
///
/// let route = PathFinder::new(&index).find_route(1, 3, 6.0)?;
/// assert_eq!(route.system_ids, vec![1, 2, 3]);
/// assert_eq!(route.total_distance, 11.0);
///
/// assert!(PathFinder::new(&index).find_route(1, 3, 4.9)?.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct PathFinder<'a> {
    index: &'a SpatialIndex,
}

impl<'a> PathFinder<'a> {
    pub fn new(index: &'a SpatialIndex) -> Self {
        PathFinder { index }
    }

    /// Shortest route from `start` to `goal` where no jump exceeds `max_jump`.
    ///
    /// Returns an empty route if the two systems are not connected. A route
    /// from a system to itself is that single system. A `max_jump` that is
    /// not positive connects no two distinct systems.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::NotFound`] if either id is not in the index.
    pub fn find_route(&self, start: u64, goal: u64, max_jump: f64) -> RouterResult<RouteResult> {
        self.search(start, goal, max_jump, None)
    }

    /// [`PathFinder::find_route`] that gives up once `token` is cancelled.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Cancelled`] if the token is set before the search ends,
    /// plus the errors of [`PathFinder::find_route`].
    pub fn find_route_with_cancel(
        &self,
        start: u64,
        goal: u64,
        max_jump: f64,
        token: &CancellationToken,
    ) -> RouterResult<RouteResult> {
        self.search(start, goal, max_jump, Some(token))
    }

    fn search(
        &self,
        start: u64,
        goal: u64,
        max_jump: f64,
        token: Option<&CancellationToken>,
    ) -> RouterResult<RouteResult> {
        let start_slot = self.slot_of(start)?;
        let goal_slot = self.slot_of(goal)?;

        if start_slot == goal_slot {
            return Ok(RouteResult::single(start));
        }
        // also rejects NaN
        if !(max_jump > 0.0) {
            debug!("Jump range {} connects no systems, no route {} -> {}", max_jump, start, goal);
            return Ok(RouteResult::empty());
        }

        let goal_point = self.point(goal_slot);
        let mut g_score: HashMap<Slot, f64> = HashMap::new();
        let mut came_from: HashMap<Slot, Slot> = HashMap::new();
        let mut closed: HashSet<Slot> = HashSet::new();
        let mut open = BinaryHeap::new();
        let mut neighbours: Vec<(Slot, f64)> = Vec::new();
        let mut seq = 0u64;

        let start_h = self.point(start_slot).distance(&goal_point);
        g_score.insert(start_slot, 0.0);
        open.push(Reverse(OpenEntry {
            f: start_h,
            h: start_h,
            seq,
            slot: start_slot,
        }));

        while let Some(Reverse(current)) = open.pop() {
            if token.is_some_and(CancellationToken::is_cancelled) {
                debug!(
                    "Route search {} -> {} cancelled after {} expansions",
                    start,
                    goal,
                    closed.len()
                );
                return Err(RouterError::new(
                    &format!("route search {} -> {} was cancelled", start, goal),
                    ErrorKind::Cancelled,
                ));
            }

            if current.slot == goal_slot {
                let route = self.reconstruct(&came_from, goal_slot, closed.len());
                debug!(
                    "Route {} -> {}: {} jumps, {:.2} ly, {} expansions",
                    start,
                    goal,
                    route.jumps(),
                    route.total_distance,
                    route.nodes_expanded
                );
                return Ok(route);
            }

            if !closed.insert(current.slot) {
                continue;
            }

            let current_g = g_score.get(&current.slot).copied().unwrap_or(f64::INFINITY);
            let current_point = self.point(current.slot);

            neighbours.clear();
            self.index.for_each_within(&current_point, max_jump, |slot, dist| {
                if slot != current.slot {
                    neighbours.push((slot, dist));
                }
            })?;
            trace!(
                "Expanding slot {} (g = {:.3}, f = {:.3}), {} systems in range",
                current.slot,
                current_g,
                current.f,
                neighbours.len()
            );

            for &(neighbour, dist) in &neighbours {
                if closed.contains(&neighbour) {
                    continue;
                }
                let tentative = current_g + dist;
                let known = g_score.get(&neighbour).copied().unwrap_or(f64::INFINITY);
                if tentative < known {
                    came_from.insert(neighbour, current.slot);
                    g_score.insert(neighbour, tentative);
                    let h = self.point(neighbour).distance(&goal_point);
                    seq += 1;
                    open.push(Reverse(OpenEntry {
                        f: tentative + h,
                        h,
                        seq,
                        slot: neighbour,
                    }));
                }
            }
        }

        debug!(
            "No route {} -> {} within jump range {}, {} expansions",
            start,
            goal,
            max_jump,
            closed.len()
        );
        Ok(RouteResult {
            nodes_expanded: closed.len(),
            ..RouteResult::empty()
        })
    }

    fn slot_of(&self, id64: u64) -> RouterResult<Slot> {
        self.index.slot_of(id64).ok_or_else(|| {
            RouterError::new(&format!("system {} is not loaded", id64), ErrorKind::NotFound)
        })
    }

    fn point(&self, slot: Slot) -> Point3 {
        self.index.systems()[slot as usize].coords
    }

    fn reconstruct(
        &self,
        came_from: &HashMap<Slot, Slot>,
        goal: Slot,
        nodes_expanded: usize,
    ) -> RouteResult {
        let mut slots = vec![goal];
        let mut cursor = goal;
        while let Some(&previous) = came_from.get(&cursor) {
            slots.push(previous);
            cursor = previous;
        }
        slots.reverse();

        let total_distance = slots
            .windows(2)
            .map(|pair| self.point(pair[0]).distance(&self.point(pair[1])))
            .sum();
        let systems = self.index.systems();
        RouteResult {
            system_ids: slots.iter().map(|&slot| systems[slot as usize].id64).collect(),
            total_distance,
            nodes_expanded,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f64,
    h: f64,
    seq: u64,
    slot: Slot,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then_with(|| self.h.total_cmp(&other.h))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_router_spatial::StarSystem;

    fn line_index() -> SpatialIndex {
        SpatialIndex::build(vec![
            StarSystem::new(1, 0.0, 0.0, 0.0),
            StarSystem::new(2, 5.0, 0.0, 0.0),
            StarSystem::new(3, 11.0, 0.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_route_along_line() {
        let index = line_index();
        let route = PathFinder::new(&index).find_route(1, 3, 6.0).unwrap();
        assert_eq!(route.system_ids, vec![1, 2, 3]);
        assert_eq!(route.total_distance, 11.0);
        assert_eq!(route.jumps(), 2);
    }

    #[test]
    fn test_no_route_when_jump_too_short() {
        let index = line_index();
        let route = PathFinder::new(&index).find_route(1, 3, 4.9).unwrap();
        assert!(route.is_empty());
        assert_eq!(route.total_distance, 0.0);
        // start is expanded, nothing is reachable from it
        assert_eq!(route.nodes_expanded, 1);
    }

    #[test]
    fn test_start_equals_goal() {
        let index = line_index();
        let finder = PathFinder::new(&index);
        assert_eq!(finder.find_route(2, 2, 6.0).unwrap(), RouteResult::single(2));
        assert_eq!(finder.find_route(2, 2, 0.0).unwrap(), RouteResult::single(2));
    }

    #[test]
    fn test_non_positive_jump_has_no_route() {
        let index = line_index();
        let finder = PathFinder::new(&index);
        for jump in [0.0, -1.0, f64::NAN] {
            let route = finder.find_route(1, 2, jump).unwrap();
            assert!(route.is_empty(), "jump {}", jump);
        }
    }

    #[test]
    fn test_unknown_ids() {
        let index = line_index();
        let finder = PathFinder::new(&index);
        assert_eq!(finder.find_route(9, 1, 6.0).unwrap_err().kind(), &ErrorKind::NotFound);
        assert_eq!(finder.find_route(1, 9, 6.0).unwrap_err().kind(), &ErrorKind::NotFound);
        assert_eq!(finder.find_route(9, 9, 6.0).unwrap_err().kind(), &ErrorKind::NotFound);
    }

    #[test]
    fn test_prefers_shorter_multi_hop() {
        let index = SpatialIndex::build(vec![
            StarSystem::new(1, 0.0, 0.0, 0.0),
            StarSystem::new(2, 3.0, 0.0, 0.0),
            StarSystem::new(3, 6.0, 0.0, 0.0),
            StarSystem::new(4, 3.0, 4.0, 0.0),
        ])
        .unwrap();
        let route = PathFinder::new(&index).find_route(1, 3, 5.0).unwrap();
        assert_eq!(route.system_ids, vec![1, 2, 3]);
        assert_eq!(route.total_distance, 6.0);
    }

    #[test]
    fn test_equal_cost_tie_prefers_smaller_heuristic() {
        let index = SpatialIndex::build(vec![
            StarSystem::new(1, 0.0, 0.0, 0.0),
            StarSystem::new(2, 3.0, 0.0, 0.0),
            StarSystem::new(3, 6.0, 0.0, 0.0),
        ])
        .unwrap();
        // [1, 3] and [1, 2, 3] both cost 6; the goal has h = 0 and wins the tie
        let route = PathFinder::new(&index).find_route(1, 3, 6.0).unwrap();
        assert_eq!(route.system_ids, vec![1, 3]);
        assert_eq!(route.total_distance, 6.0);
    }

    #[test]
    fn test_route_detours_around_gap() {
        let index = SpatialIndex::build(vec![
            StarSystem::new(1, 0.0, 0.0, 0.0),
            StarSystem::new(2, 20.0, 0.0, 0.0),
            StarSystem::new(3, 6.0, 6.0, 0.0),
            StarSystem::new(4, 14.0, 6.0, 0.0),
        ])
        .unwrap();
        let route = PathFinder::new(&index).find_route(1, 2, 9.0).unwrap();
        assert_eq!(route.system_ids, vec![1, 3, 4, 2]);
        let expected = 72f64.sqrt() * 2.0 + 8.0;
        assert!((route.total_distance - expected).abs() < 1e-9);
    }

    #[test]
    fn test_disconnected_clusters() {
        let mut systems = Vec::new();
        for i in 0..10u64 {
            systems.push(StarSystem::new(i, i as f64, 0.0, 0.0));
            systems.push(StarSystem::new(100 + i, 1000.0 + i as f64, 0.0, 0.0));
        }
        let index = SpatialIndex::build(systems).unwrap();
        let finder = PathFinder::new(&index);
        assert!(finder.find_route(0, 109, 50.0).unwrap().is_empty());
        assert_eq!(finder.find_route(0, 9, 1.0).unwrap().jumps(), 9);
    }

    #[test]
    fn test_cancelled_search() {
        let index = line_index();
        let token = CancellationToken::new();
        token.cancel();
        let err = PathFinder::new(&index)
            .find_route_with_cancel(1, 3, 6.0, &token)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Cancelled);

        let fresh = CancellationToken::new();
        let route = PathFinder::new(&index)
            .find_route_with_cancel(1, 3, 6.0, &fresh)
            .unwrap();
        assert_eq!(route.system_ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_open_entry_order() {
        let a = OpenEntry { f: 5.0, h: 1.0, seq: 3, slot: 0 };
        let b = OpenEntry { f: 5.0, h: 2.0, seq: 1, slot: 1 };
        let c = OpenEntry { f: 5.0, h: 1.0, seq: 4, slot: 2 };
        let d = OpenEntry { f: 4.0, h: 4.0, seq: 9, slot: 3 };
        let mut heap: BinaryHeap<Reverse<OpenEntry>> =
            [a, b, c, d].into_iter().map(Reverse).collect();
        let order: Vec<Slot> = std::iter::from_fn(|| heap.pop().map(|r| r.0.slot)).collect();
        assert_eq!(order, vec![3, 0, 2, 1]);
    }
}

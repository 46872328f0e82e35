//! MemoryRTree implementation.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::bounding_box::BoundingBox;
use crate::geometry::Point3;

use super::bulk_load::str_partition;
use super::rtree_types::{
    compute_children_bbox, compute_entries_bbox, ChildRef, LeafEntry, Node, NodeId, RTreeConfig,
    RTreeStats, Slot, SpatialError, SpatialResult,
};
use super::split::{quadratic_split, size_cmp, Growth};

/// An in-memory R-Tree over 3D points.
///
/// Each entry is a point plus an opaque [`Slot`] chosen by the caller. The
/// tree never inspects slots; the owning [`crate::SpatialIndex`] uses them
/// as dense indices into its point storage.
///
/// Queries take `&self` and never mutate, so a built tree can be shared
/// across threads. [`MemoryRTree::insert`] takes `&mut self`, which rules out
/// concurrent readers at compile time.
#[derive(Debug, Clone)]
pub struct MemoryRTree {
    nodes: Vec<Node>,
    root: NodeId,
    /// Number of levels, a lone leaf root counts as 1
    height: u32,
    len: usize,
    config: RTreeConfig,
}

impl MemoryRTree {
    /// Create an EMPTY tree.
    pub fn new(config: RTreeConfig) -> Self {
        MemoryRTree {
            nodes: vec![Node::empty_leaf()],
            root: 0,
            height: 1,
            len: 0,
            config,
        }
    }

    /// Bulk loads entries into a new R-Tree using STR (Sort-Tile-Recurse) packing.
    ///
    /// This is much more efficient than incremental insertion for large datasets
    /// because it builds a well-balanced tree structure from the bottom up.
    ///
    /// # Algorithm
    /// 1. Sort entries by x and cut them into slabs
    /// 2. Sort each slab by y and cut it into runs
    /// 3. Sort each run by z and pack leaves of `node_capacity` entries
    /// 4. Repeat on the leaves' boxes until a single root remains
    ///
    /// # Performance
    /// - Time: O(N log N) due to sorting
    /// - Space: O(N) for temporary storage
    /// - Nodes are packed full, so the tree is as shallow as it can be
    pub fn bulk_load(config: RTreeConfig, entries: Vec<LeafEntry>) -> SpatialResult<Self> {
        let mut tree = MemoryRTree::new(config);
        if entries.is_empty() {
            return Ok(tree);
        }
        if let Some(bad) = entries.iter().find(|e| !e.point.is_finite()) {
            return Err(SpatialError::InvalidArgument(format!(
                "non-finite coordinates {} for slot {}",
                bad.point, bad.slot
            )));
        }

        let capacity = config.node_capacity();
        let len = entries.len();
        let mut nodes = Vec::with_capacity(len.div_ceil(capacity) * 2);

        let mut level_refs = Vec::new();
        for group in str_partition(entries, capacity, |e: &LeafEntry| e.point) {
            let bbox = compute_entries_bbox(&group);
            level_refs.push(ChildRef {
                bbox,
                node_id: push_node(&mut nodes, Node::Leaf { entries: group })?,
            });
        }

        let mut level = 0;
        while level_refs.len() > 1 {
            level += 1;
            let mut parents = Vec::new();
            for group in str_partition(level_refs, capacity, |c: &ChildRef| c.bbox.center()) {
                let bbox = compute_children_bbox(&group);
                parents.push(ChildRef {
                    bbox,
                    node_id: push_node(
                        &mut nodes,
                        Node::Internal {
                            children: group,
                            level,
                        },
                    )?,
                });
            }
            level_refs = parents;
        }

        tree.root = level_refs
            .first()
            .map(|r| r.node_id)
            .ok_or_else(|| SpatialError::Corrupted("bulk load produced no root".into()))?;
        tree.nodes = nodes;
        tree.height = level + 1;
        tree.len = len;

        log::debug!(
            "Bulk loaded {} entries into {} nodes (height {}, capacity {})",
            tree.len,
            tree.nodes.len(),
            tree.height,
            capacity
        );
        Ok(tree)
    }

    /// Number of points in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn config(&self) -> RTreeConfig {
        self.config
    }

    /// Bounding box of every point in the tree, empty for an empty tree.
    pub fn bbox(&self) -> BoundingBox {
        self.node(self.root).compute_bbox()
    }

    pub fn stats(&self) -> RTreeStats {
        RTreeStats {
            total_entries: self.len as u64,
            node_count: self.nodes.len() as u64,
            leaf_count: self.nodes.iter().filter(|n| n.is_leaf()).count() as u64,
            tree_height: self.height,
        }
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    fn allocate_node(&mut self, node: Node) -> SpatialResult<NodeId> {
        push_node(&mut self.nodes, node)
    }

    // ------------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------------

    /// Inserts one point using guided insertion.
    ///
    /// The descent picks the child whose box needs the least enlargement
    /// (ties go to the smaller box); overflowing nodes are split with the
    /// quadratic split and splits propagate towards the root.
    pub fn insert(&mut self, point: Point3, slot: Slot) -> SpatialResult<()> {
        if !point.is_finite() {
            return Err(SpatialError::InvalidArgument(format!(
                "non-finite coordinates {} for slot {}",
                point, slot
            )));
        }

        let entry_box = BoundingBox::from_point(&point);
        let mut path = Vec::with_capacity(self.height as usize);
        let leaf_id = self.choose_leaf(&entry_box, &mut path);

        match self.insert_into_leaf(leaf_id, LeafEntry::new(point, slot))? {
            Some(split) => self.propagate_split(&path, split)?,
            None => self.update_path_bboxes(&path, &entry_box)?,
        }

        self.len += 1;
        Ok(())
    }

    /// Choose the best leaf node for insertion
    fn choose_leaf(&self, bbox: &BoundingBox, path: &mut Vec<(NodeId, usize)>) -> NodeId {
        let mut node_id = self.root;
        loop {
            match self.node(node_id) {
                Node::Leaf { .. } => return node_id,
                Node::Internal { children, .. } => {
                    let best_idx = children
                        .iter()
                        .enumerate()
                        .min_by(|(_, a), (_, b)| {
                            Growth::of(&a.bbox, bbox)
                                .cmp(&Growth::of(&b.bbox, bbox))
                                .then_with(|| size_cmp(&a.bbox, &b.bbox))
                        })
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                    path.push((node_id, best_idx));
                    node_id = children[best_idx].node_id;
                }
            }
        }
    }

    /// Insert entry into leaf, returns split info if overflow occurred
    fn insert_into_leaf(
        &mut self,
        leaf_id: NodeId,
        entry: LeafEntry,
    ) -> SpatialResult<Option<(NodeId, BoundingBox)>> {
        let capacity = self.config.node_capacity();
        let min_fill = self.config.min_fill();

        let Node::Leaf { entries } = &mut self.nodes[leaf_id as usize] else {
            return Err(SpatialError::Corrupted(
                "Expected leaf node for insertion".into(),
            ));
        };
        entries.push(entry);
        if entries.len() <= capacity {
            return Ok(None);
        }

        let (remaining, moved) = quadratic_split(std::mem::take(entries), min_fill, |e| {
            BoundingBox::from_point(&e.point)
        });
        *entries = remaining;
        let moved_bbox = compute_entries_bbox(&moved);
        let moved_id = self.allocate_node(Node::Leaf { entries: moved })?;
        Ok(Some((moved_id, moved_bbox)))
    }

    /// Propagate split up the tree
    fn propagate_split(
        &mut self,
        path: &[(NodeId, usize)],
        split: (NodeId, BoundingBox),
    ) -> SpatialResult<()> {
        let capacity = self.config.node_capacity();
        let min_fill = self.config.min_fill();
        let mut pending = Some(split);

        for &(parent_id, child_idx) in path.iter().rev() {
            let child_id = self.child_id(parent_id, child_idx)?;
            let child_bbox = self.node(child_id).compute_bbox();

            let Node::Internal { children, level } = &mut self.nodes[parent_id as usize] else {
                return Err(SpatialError::Corrupted(format!(
                    "node {} on insertion path is a leaf",
                    parent_id
                )));
            };
            children[child_idx].bbox = child_bbox;

            let Some((new_id, new_bbox)) = pending.take() else {
                continue;
            };
            children.push(ChildRef {
                bbox: new_bbox,
                node_id: new_id,
            });
            if children.len() > capacity {
                let level = *level;
                let (remaining, moved) =
                    quadratic_split(std::mem::take(children), min_fill, |c| c.bbox);
                *children = remaining;
                let moved_bbox = compute_children_bbox(&moved);
                let moved_id = self.allocate_node(Node::Internal {
                    children: moved,
                    level,
                })?;
                pending = Some((moved_id, moved_bbox));
            }
        }

        // The root itself split: grow the tree by one level
        if let Some((new_id, new_bbox)) = pending {
            let old_root = self.root;
            let old_bbox = self.node(old_root).compute_bbox();
            let new_root = self.allocate_node(Node::Internal {
                children: vec![
                    ChildRef {
                        bbox: old_bbox,
                        node_id: old_root,
                    },
                    ChildRef {
                        bbox: new_bbox,
                        node_id: new_id,
                    },
                ],
                level: self.height,
            })?;
            self.root = new_root;
            self.height += 1;
        }
        Ok(())
    }

    /// Update bounding boxes along the insertion path
    fn update_path_bboxes(
        &mut self,
        path: &[(NodeId, usize)],
        added: &BoundingBox,
    ) -> SpatialResult<()> {
        for &(parent_id, child_idx) in path {
            match &mut self.nodes[parent_id as usize] {
                Node::Internal { children, .. } => {
                    children[child_idx].bbox = children[child_idx].bbox.union(added);
                }
                Node::Leaf { .. } => {
                    return Err(SpatialError::Corrupted(format!(
                        "node {} on insertion path is a leaf",
                        parent_id
                    )))
                }
            }
        }
        Ok(())
    }

    fn child_id(&self, parent_id: NodeId, child_idx: usize) -> SpatialResult<NodeId> {
        match self.node(parent_id) {
            Node::Internal { children, .. } => children
                .get(child_idx)
                .map(|c| c.node_id)
                .ok_or_else(|| {
                    SpatialError::Corrupted(format!(
                        "node {} has no child {}",
                        parent_id, child_idx
                    ))
                }),
            Node::Leaf { .. } => Err(SpatialError::Corrupted(format!(
                "node {} on insertion path is a leaf",
                parent_id
            ))),
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Calls `visit(slot, distance)` for every point within `radius` of `center`.
    ///
    /// Subtrees whose box lies farther than `radius` from `center` are never
    /// visited. Points exactly `radius` away are included.
    ///
    /// # Errors
    ///
    /// [`SpatialError::InvalidArgument`] for a negative or NaN radius, or a
    /// non-finite center.
    pub fn for_each_within<F>(&self, center: &Point3, radius: f64, mut visit: F) -> SpatialResult<()>
    where
        F: FnMut(Slot, f64),
    {
        check_query(center, radius)?;
        if self.len == 0 {
            return Ok(());
        }

        let mut stack = Vec::with_capacity(self.height as usize * self.config.node_capacity());
        stack.push(self.root);
        while let Some(node_id) = stack.pop() {
            match self.node(node_id) {
                Node::Leaf { entries } => {
                    for entry in entries {
                        let dist = entry.point.distance(center);
                        if dist <= radius {
                            visit(entry.slot, dist);
                        }
                    }
                }
                Node::Internal { children, .. } => {
                    for child in children {
                        if child.bbox.min_distance(center) <= radius {
                            stack.push(child.node_id);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Finds every point within `radius` of `center` as `(slot, distance)`
    /// pairs, in unspecified order.
    pub fn find_within_distance(
        &self,
        center: &Point3,
        radius: f64,
    ) -> SpatialResult<Vec<(Slot, f64)>> {
        let mut results = Vec::new();
        self.for_each_within(center, radius, |slot, dist| results.push((slot, dist)))?;
        Ok(results)
    }

    /// Find the K nearest entries to a point.
    ///
    /// Uses a priority queue-based algorithm with branch-and-bound pruning:
    /// nodes are visited nearest-box first, the best K candidates are kept in
    /// a bounded max-heap, and the search stops once the nearest unvisited box
    /// is farther than the current K-th best candidate.
    ///
    /// # Returns
    /// At most `k` `(slot, distance)` pairs sorted by distance (nearest first);
    /// equal distances are ordered by slot.
    pub fn find_nearest(&self, center: &Point3, k: usize) -> SpatialResult<Vec<(Slot, f64)>> {
        if !center.is_finite() {
            return Err(SpatialError::InvalidArgument(format!(
                "non-finite query center {}",
                center
            )));
        }
        if k == 0 || self.len == 0 {
            return Ok(Vec::new());
        }

        let mut queue = BinaryHeap::new();
        let mut best: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
        queue.push(Reverse(Candidate {
            dist: self.bbox().min_distance(center),
            id: self.root,
        }));

        while let Some(Reverse(next)) = queue.pop() {
            if best.len() == k && best.peek().is_some_and(|worst| next.dist > worst.dist) {
                break;
            }
            match self.node(next.id) {
                Node::Leaf { entries } => {
                    for entry in entries {
                        let candidate = Candidate {
                            dist: entry.point.distance(center),
                            id: entry.slot,
                        };
                        if best.len() < k {
                            best.push(candidate);
                        } else if best.peek().is_some_and(|worst| candidate < *worst) {
                            best.pop();
                            best.push(candidate);
                        }
                    }
                }
                Node::Internal { children, .. } => {
                    for child in children {
                        let dist = child.bbox.min_distance(center);
                        let worth_visiting = best.len() < k
                            || best.peek().is_some_and(|worst| dist <= worst.dist);
                        if worth_visiting {
                            queue.push(Reverse(Candidate {
                                dist,
                                id: child.node_id,
                            }));
                        }
                    }
                }
            }
        }

        Ok(best
            .into_sorted_vec()
            .into_iter()
            .map(|c| (c.id, c.dist))
            .collect())
    }

    // ------------------------------------------------------------------------
    // Integrity
    // ------------------------------------------------------------------------

    /// Checks the structural invariants of the tree.
    ///
    /// Every stored child box must equal the minimal box of that child, no node
    /// may exceed the capacity, all leaves sit at the same depth, and the
    /// number of reachable entries must match [`MemoryRTree::len`].
    pub fn validate(&self) -> SpatialResult<()> {
        let capacity = self.config.node_capacity();
        let mut entries = 0usize;
        let mut stack = vec![(self.root, 1u32)];

        while let Some((node_id, depth)) = stack.pop() {
            let node = self.nodes.get(node_id as usize).ok_or_else(|| {
                SpatialError::Corrupted(format!("dangling node reference {}", node_id))
            })?;
            if node.len() > capacity {
                return Err(SpatialError::Corrupted(format!(
                    "node {} holds {} entries, capacity is {}",
                    node_id,
                    node.len(),
                    capacity
                )));
            }
            match node {
                Node::Leaf { entries: leaf } => {
                    if depth != self.height {
                        return Err(SpatialError::Corrupted(format!(
                            "leaf {} at depth {}, tree height is {}",
                            node_id, depth, self.height
                        )));
                    }
                    entries += leaf.len();
                }
                Node::Internal { children, level } => {
                    if *level != self.height - depth {
                        return Err(SpatialError::Corrupted(format!(
                            "node {} has level {} at depth {}",
                            node_id, level, depth
                        )));
                    }
                    if children.is_empty() {
                        return Err(SpatialError::Corrupted(format!(
                            "internal node {} has no children",
                            node_id
                        )));
                    }
                    for child in children {
                        let actual = self
                            .nodes
                            .get(child.node_id as usize)
                            .map(Node::compute_bbox)
                            .ok_or_else(|| {
                                SpatialError::Corrupted(format!(
                                    "dangling node reference {}",
                                    child.node_id
                                ))
                            })?;
                        if actual != child.bbox {
                            return Err(SpatialError::Corrupted(format!(
                                "stale box for node {}: stored {}, actual {}",
                                child.node_id, child.bbox, actual
                            )));
                        }
                        stack.push((child.node_id, depth + 1));
                    }
                }
            }
        }

        if entries != self.len {
            return Err(SpatialError::Corrupted(format!(
                "{} reachable entries, expected {}",
                entries, self.len
            )));
        }
        Ok(())
    }
}

fn push_node(nodes: &mut Vec<Node>, node: Node) -> SpatialResult<NodeId> {
    let id = NodeId::try_from(nodes.len())
        .map_err(|_| SpatialError::InvalidArgument("R-Tree node arena is full".into()))?;
    nodes.push(node);
    Ok(id)
}

fn check_query(center: &Point3, radius: f64) -> SpatialResult<()> {
    if radius.is_nan() || radius < 0.0 {
        return Err(SpatialError::InvalidArgument(format!(
            "radius must be non-negative, got {}",
            radius
        )));
    }
    if !center.is_finite() {
        return Err(SpatialError::InvalidArgument(format!(
            "non-finite query center {}",
            center
        )));
    }
    Ok(())
}

/// Heap item for nearest-neighbour search: a node or an entry with its distance.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    dist: f64,
    id: u32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then(self.id.cmp(&other.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn random_entries(n: usize, seed: u64) -> Vec<LeafEntry> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|i| {
                LeafEntry::new(
                    Point3::new(
                        rng.gen_range(-500.0..500.0),
                        rng.gen_range(-100.0..100.0),
                        rng.gen_range(-500.0..500.0),
                    ),
                    i as Slot,
                )
            })
            .collect()
    }

    fn brute_within(entries: &[LeafEntry], center: &Point3, radius: f64) -> Vec<Slot> {
        let mut slots: Vec<Slot> = entries
            .iter()
            .filter(|e| e.point.distance(center) <= radius)
            .map(|e| e.slot)
            .collect();
        slots.sort_unstable();
        slots
    }

    fn sorted_slots(results: Vec<(Slot, f64)>) -> Vec<Slot> {
        let mut slots: Vec<Slot> = results.into_iter().map(|(s, _)| s).collect();
        slots.sort_unstable();
        slots
    }

    fn config(capacity: usize) -> RTreeConfig {
        RTreeConfig::new(capacity).unwrap()
    }

    #[test]
    fn test_create_empty_tree() {
        let tree = MemoryRTree::new(RTreeConfig::default());
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert!(tree.bbox().is_empty());
        assert!(tree
            .find_within_distance(&Point3::default(), 10.0)
            .unwrap()
            .is_empty());
        assert!(tree.find_nearest(&Point3::default(), 3).unwrap().is_empty());
        tree.validate().unwrap();
    }

    #[test]
    fn test_bulk_load_empty() {
        let tree = MemoryRTree::bulk_load(config(8), Vec::new()).unwrap();
        assert_eq!(tree.len(), 0);
        tree.validate().unwrap();
    }

    #[test]
    fn test_bulk_load() {
        let entries = random_entries(5000, 1);
        let tree = MemoryRTree::bulk_load(config(16), entries).unwrap();
        assert_eq!(tree.len(), 5000);
        // 5000 / 16 = 313 leaves -> 20 -> 2 -> 1
        assert_eq!(tree.height(), 4);
        tree.validate().unwrap();

        let stats = tree.stats();
        assert_eq!(stats.total_entries, 5000);
        assert_eq!(stats.tree_height, 4);
        assert!(stats.leaf_count >= 313);
    }

    #[test]
    fn test_bulk_load_rejects_nan() {
        let entries = vec![
            LeafEntry::new(Point3::new(0.0, 0.0, 0.0), 0),
            LeafEntry::new(Point3::new(f64::NAN, 0.0, 0.0), 1),
        ];
        assert!(matches!(
            MemoryRTree::bulk_load(config(8), entries),
            Err(SpatialError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_within_matches_brute_force() {
        let entries = random_entries(3000, 2);
        let tree = MemoryRTree::bulk_load(config(12), entries.clone()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let center = Point3::new(
                rng.gen_range(-600.0..600.0),
                rng.gen_range(-120.0..120.0),
                rng.gen_range(-600.0..600.0),
            );
            let radius = rng.gen_range(0.0..150.0);
            let found = sorted_slots(tree.find_within_distance(&center, radius).unwrap());
            assert_eq!(found, brute_within(&entries, &center, radius));
        }
    }

    #[test]
    fn test_within_radius_zero_finds_exact_point() {
        let entries = random_entries(500, 4);
        let target = entries[123];
        let tree = MemoryRTree::bulk_load(config(8), entries).unwrap();
        let found = tree.find_within_distance(&target.point, 0.0).unwrap();
        assert_eq!(found, vec![(123, 0.0)]);
    }

    #[test]
    fn test_within_includes_boundary() {
        let entries = vec![
            LeafEntry::new(Point3::new(0.0, 0.0, 0.0), 0),
            LeafEntry::new(Point3::new(5.0, 0.0, 0.0), 1),
            LeafEntry::new(Point3::new(11.0, 0.0, 0.0), 2),
        ];
        let tree = MemoryRTree::bulk_load(config(4), entries).unwrap();
        let origin = Point3::default();
        assert_eq!(sorted_slots(tree.find_within_distance(&origin, 5.0).unwrap()), vec![0, 1]);
        assert_eq!(sorted_slots(tree.find_within_distance(&origin, 4.9).unwrap()), vec![0]);
    }

    #[test]
    fn test_within_rejects_negative_radius() {
        let tree = MemoryRTree::bulk_load(config(8), random_entries(10, 5)).unwrap();
        assert!(matches!(
            tree.find_within_distance(&Point3::default(), -1.0),
            Err(SpatialError::InvalidArgument(_))
        ));
        assert!(matches!(
            tree.find_within_distance(&Point3::default(), f64::NAN),
            Err(SpatialError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_find_nearest() {
        let entries = random_entries(2000, 6);
        let tree = MemoryRTree::bulk_load(config(10), entries.clone()).unwrap();
        let center = Point3::new(12.0, -3.0, 40.0);

        let mut expected: Vec<(Slot, f64)> = entries
            .iter()
            .map(|e| (e.slot, e.point.distance(&center)))
            .collect();
        expected.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        let found = tree.find_nearest(&center, 25).unwrap();
        assert_eq!(found.len(), 25);
        assert_eq!(found, expected[..25].to_vec());
        assert!(found.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn test_find_nearest_more_than_len() {
        let entries = random_entries(7, 7);
        let tree = MemoryRTree::bulk_load(config(4), entries).unwrap();
        let found = tree.find_nearest(&Point3::default(), 100).unwrap();
        assert_eq!(found.len(), 7);
        assert!(tree.find_nearest(&Point3::default(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_insert_builds_valid_tree() {
        let entries = random_entries(2000, 8);
        let mut tree = MemoryRTree::new(config(6));
        for entry in &entries {
            tree.insert(entry.point, entry.slot).unwrap();
        }
        assert_eq!(tree.len(), 2000);
        assert!(tree.height() > 3);
        tree.validate().unwrap();

        let center = Point3::new(0.0, 0.0, 0.0);
        let found = sorted_slots(tree.find_within_distance(&center, 120.0).unwrap());
        assert_eq!(found, brute_within(&entries, &center, 120.0));
    }

    #[test]
    fn test_insert_after_bulk_load() {
        let entries = random_entries(1000, 9);
        let mut tree = MemoryRTree::bulk_load(config(8), entries.clone()).unwrap();
        let extra = random_entries(300, 10)
            .into_iter()
            .map(|e| LeafEntry::new(e.point, e.slot + 1000))
            .collect::<Vec<_>>();
        for entry in &extra {
            tree.insert(entry.point, entry.slot).unwrap();
        }
        tree.validate().unwrap();
        assert_eq!(tree.len(), 1300);

        let all: Vec<LeafEntry> = entries.into_iter().chain(extra).collect();
        let center = Point3::new(100.0, 10.0, -50.0);
        let found = sorted_slots(tree.find_within_distance(&center, 200.0).unwrap());
        assert_eq!(found, brute_within(&all, &center, 200.0));
    }

    #[test]
    fn test_insert_rejects_non_finite() {
        let mut tree = MemoryRTree::new(RTreeConfig::default());
        assert!(tree.insert(Point3::new(0.0, f64::INFINITY, 0.0), 0).is_err());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_duplicate_coordinates() {
        // Many systems sharing one position must not break splitting
        let mut tree = MemoryRTree::new(config(4));
        for slot in 0..50 {
            tree.insert(Point3::new(1.0, 1.0, 1.0), slot).unwrap();
        }
        tree.validate().unwrap();
        assert_eq!(
            tree.find_within_distance(&Point3::new(1.0, 1.0, 1.0), 0.0)
                .unwrap()
                .len(),
            50
        );
    }
}

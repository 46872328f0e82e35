//! Sort-Tile-Recurse (STR) packing.
//!
//! Items are sorted by x and cut into vertical slabs, each slab is sorted by
//! y and cut into runs, and each run is sorted by z and cut into groups of at
//! most `capacity` items. Every group becomes one node of the level being
//! built; the same partition is then applied to the node boxes' centers to
//! build the next level up.

use crate::geometry::Point3;

#[cfg(feature = "parallel")]
use rayon::slice::ParallelSliceMut;

/// Partitions `items` into groups of at most `capacity` spatially close items.
pub(crate) fn str_partition<T, F>(mut items: Vec<T>, capacity: usize, center: F) -> Vec<Vec<T>>
where
    T: Send,
    F: Fn(&T) -> Point3 + Sync,
{
    let n = items.len();
    if n <= capacity {
        return vec![items];
    }

    let node_count = n.div_ceil(capacity);
    let slices = ((node_count as f64).cbrt().ceil() as usize).max(1);
    let slab_len = capacity * slices * slices;
    let run_len = capacity * slices;

    sort_by_axis(&mut items, 0, &center);
    let mut groups = Vec::with_capacity(node_count);
    for mut slab in chunk_owned(items, slab_len) {
        sort_by_axis(&mut slab, 1, &center);
        for mut run in chunk_owned(slab, run_len) {
            sort_by_axis(&mut run, 2, &center);
            groups.extend(chunk_owned(run, capacity));
        }
    }
    groups
}

#[cfg(not(feature = "parallel"))]
fn sort_by_axis<T, F>(items: &mut [T], axis: usize, center: &F)
where
    F: Fn(&T) -> Point3,
{
    items.sort_unstable_by(|a, b| center(a).axis(axis).total_cmp(&center(b).axis(axis)));
}

#[cfg(feature = "parallel")]
fn sort_by_axis<T, F>(items: &mut [T], axis: usize, center: &F)
where
    T: Send,
    F: Fn(&T) -> Point3 + Sync,
{
    items.par_sort_unstable_by(|a, b| center(a).axis(axis).total_cmp(&center(b).axis(axis)));
}

fn chunk_owned<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        chunks.push(iter.by_ref().take(size).collect());
    }
    chunks
}

//! Quadratic-cost node split.

use crate::bounding_box::BoundingBox;
use std::cmp::Ordering;

/// Growth of a box when another box is added to it.
///
/// Compared by volume first; margin settles ties between degenerate
/// (zero-volume) boxes, which are common for point data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Growth {
    volume: f64,
    margin: f64,
}

impl Growth {
    pub(crate) fn of(bbox: &BoundingBox, added: &BoundingBox) -> Self {
        let union = bbox.union(added);
        Growth {
            volume: union.volume() - bbox.volume(),
            margin: union.margin() - bbox.margin(),
        }
    }

    pub(crate) fn cmp(&self, other: &Growth) -> Ordering {
        self.volume
            .total_cmp(&other.volume)
            .then(self.margin.total_cmp(&other.margin))
    }

    fn difference(&self, other: &Growth) -> Growth {
        Growth {
            volume: (self.volume - other.volume).abs(),
            margin: (self.margin - other.margin).abs(),
        }
    }
}

/// Size of a box, volume first and margin for ties.
pub(crate) fn size_cmp(a: &BoundingBox, b: &BoundingBox) -> Ordering {
    a.volume()
        .total_cmp(&b.volume())
        .then(a.margin().total_cmp(&b.margin()))
}

/// Distributes `items` (capacity + 1 entries) into two groups using
/// Guttman's quadratic split.
///
/// Both groups receive at least `min_fill` items.
pub(crate) fn quadratic_split<T, F>(items: Vec<T>, min_fill: usize, bbox_of: F) -> (Vec<T>, Vec<T>)
where
    F: Fn(&T) -> BoundingBox,
{
    debug_assert!(items.len() >= 2);
    let boxes: Vec<BoundingBox> = items.iter().map(&bbox_of).collect();
    let (seed_a, seed_b) = pick_seeds(&boxes);

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut group_a = Vec::with_capacity(slots.len());
    let mut group_b = Vec::with_capacity(slots.len());
    let mut bbox_a = boxes[seed_a];
    let mut bbox_b = boxes[seed_b];
    group_a.extend(slots[seed_a].take());
    group_b.extend(slots[seed_b].take());

    let mut remaining: Vec<usize> = (0..slots.len())
        .filter(|&i| i != seed_a && i != seed_b)
        .collect();

    while !remaining.is_empty() {
        // One group must take everything left to reach the minimum fill
        if group_a.len() + remaining.len() <= min_fill {
            group_a.extend(remaining.drain(..).filter_map(|i| slots[i].take()));
            break;
        }
        if group_b.len() + remaining.len() <= min_fill {
            group_b.extend(remaining.drain(..).filter_map(|i| slots[i].take()));
            break;
        }

        // PickNext: the entry with the strongest preference for one group
        let mut best_pos = 0;
        let mut best_pref: Option<Growth> = None;
        for (pos, &i) in remaining.iter().enumerate() {
            let pref = Growth::of(&bbox_a, &boxes[i]).difference(&Growth::of(&bbox_b, &boxes[i]));
            let stronger = match best_pref {
                None => true,
                Some(b) => pref.cmp(&b) == Ordering::Greater,
            };
            if stronger {
                best_pref = Some(pref);
                best_pos = pos;
            }
        }
        let i = remaining.swap_remove(best_pos);

        let grow_a = Growth::of(&bbox_a, &boxes[i]);
        let grow_b = Growth::of(&bbox_b, &boxes[i]);
        let to_a = grow_a
            .cmp(&grow_b)
            .then_with(|| size_cmp(&bbox_a, &bbox_b))
            .then(group_a.len().cmp(&group_b.len()))
            != Ordering::Greater;

        if to_a {
            bbox_a = bbox_a.union(&boxes[i]);
            group_a.extend(slots[i].take());
        } else {
            bbox_b = bbox_b.union(&boxes[i]);
            group_b.extend(slots[i].take());
        }
    }

    (group_a, group_b)
}

/// The pair of entries that would waste the most space if grouped together.
fn pick_seeds(boxes: &[BoundingBox]) -> (usize, usize) {
    let mut best = (0, 1);
    let mut worst_waste: Option<(f64, f64)> = None;
    for i in 0..boxes.len() {
        for j in (i + 1)..boxes.len() {
            let union = boxes[i].union(&boxes[j]);
            let waste = (
                union.volume() - boxes[i].volume() - boxes[j].volume(),
                union.margin() - boxes[i].margin() - boxes[j].margin(),
            );
            let better = match worst_waste {
                None => true,
                Some(w) => waste.0.total_cmp(&w.0).then(waste.1.total_cmp(&w.1)) == Ordering::Greater,
            };
            if better {
                worst_waste = Some(waste);
                best = (i, j);
            }
        }
    }
    best
}

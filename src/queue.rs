//! Distance-ordered queue driving the best-first search.
//!
//! Entries are either candidate points or kd-tree nodes, keyed by the
//! haversine distance to the query (for points) or the lower bound of the
//! node's bounding box. Equal distances pop the higher rank first; nodes
//! carry a sentinel rank below any point rank, so a point tying a node is
//! always drained before the node is expanded.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::index::TreeNode;
use crate::point::SpatialPoint;

/// Rank assigned to node entries, strictly below any meaningful point rank.
const NODE_RANK: f64 = -1.0;

pub(crate) enum Item<'a, P> {
    Point(&'a P),
    Node(TreeNode),
}

pub(crate) struct Entry<'a, P> {
    pub(crate) distance: f64,
    pub(crate) rank: f64,
    pub(crate) item: Item<'a, P>,
}

impl<'a, P> Entry<'a, P> {
    pub(crate) fn is_point(&self) -> bool {
        matches!(self.item, Item::Point(_))
    }

    pub(crate) fn into_point(self) -> Option<&'a P> {
        match self.item {
            Item::Point(point) => Some(point),
            Item::Node(_) => None,
        }
    }

    pub(crate) fn into_node(self) -> Option<TreeNode> {
        match self.item {
            Item::Node(node) => Some(node),
            Item::Point(_) => None,
        }
    }
}

// `BinaryHeap` pops its greatest entry, so the closer of two entries must
// compare greater. `total_cmp` keeps the order total even for NaN input.
impl<P> Ord for Entry<'_, P> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| self.rank.total_cmp(&other.rank))
    }
}

impl<P> PartialOrd for Entry<'_, P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P> PartialEq for Entry<'_, P> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<P> Eq for Entry<'_, P> {}

/// Min-queue over point and node entries for one `nearby` call.
pub(crate) struct SearchQueue<'a, P> {
    heap: BinaryHeap<Entry<'a, P>>,
}

impl<'a, P: SpatialPoint> SearchQueue<'a, P> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub(crate) fn push_point(&mut self, point: &'a P, distance: f64) {
        self.heap.push(Entry {
            distance,
            rank: point.rank(),
            item: Item::Point(point),
        });
    }

    pub(crate) fn push_node(&mut self, node: TreeNode) {
        self.heap.push(Entry {
            distance: node.distance,
            rank: NODE_RANK,
            item: Item::Node(node),
        });
    }

    pub(crate) fn pop(&mut self) -> Option<Entry<'a, P>> {
        self.heap.pop()
    }

    pub(crate) fn peek(&self) -> Option<&Entry<'a, P>> {
        self.heap.peek()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

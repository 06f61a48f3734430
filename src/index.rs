//! Flat kd-tree index over geographic points.
//!
//! The tree is implicit: [`KdTree::load`] sorts a permutation of point
//! indices so the median of every range sits at its middle index, and
//! [`KdTree::nearby`] walks the ranges best-first, expanding whichever
//! queued box or candidate point is currently nearest.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::distance::{BoundingBox, RAD, box_dist, haversin_dist};
use crate::error::{Result, VicinityError};
use crate::point::SpatialPoint;
use crate::queue::{Entry, SearchQueue};
use crate::sort::kd_sort;

/// Default maximum number of points in a leaf range.
pub const DEFAULT_NODE_SIZE: usize = 64;

/// Configurable options for a [`KdTree`].
///
/// Deserializes with defaults for omitted fields, so `{}` is a valid
/// configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdTreeOptions {
    /// Maximum number of points a leaf range may hold (default: 64,
    /// typical range 8-256). Lower values spend more time in `load` to
    /// save comparisons in `nearby`.
    #[serde(default = "KdTreeOptions::default_node_size")]
    pub node_size: usize,
}

impl KdTreeOptions {
    const fn default_node_size() -> usize {
        DEFAULT_NODE_SIZE
    }
}

impl Default for KdTreeOptions {
    fn default() -> Self {
        Self {
            node_size: DEFAULT_NODE_SIZE,
        }
    }
}

/// Static nearest-neighbor search index for locations on Earth.
///
/// Accounts for the Earth's curvature and date-line wrapping. The dataset is
/// replaced wholesale by [`load`](KdTree::load); queries never mutate it.
/// Any number of [`nearby`](KdTree::nearby) calls may run concurrently;
/// `load` takes the writer side of the lock and excludes them.
///
/// Cloning the index is cheap and yields a handle to the same shared state.
pub struct KdTree<P> {
    node_size: usize,
    state: Arc<RwLock<TreeState<P>>>,
}

struct TreeState<P> {
    /// Point values in load order.
    points: Vec<P>,
    /// Permutation of `0..points.len()` in kd-order.
    ids: Vec<usize>,
    /// Interleaved lon/lat pairs in kd-order; the authoritative geometry
    /// during search.
    coords: Vec<f64>,
}

/// A contiguous range of the kd-order arrays together with its bounding box.
/// Built on the fly during traversal, never persisted.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeNode {
    pub(crate) left: usize,
    pub(crate) right: usize,
    /// 0 splits on longitude, 1 on latitude.
    pub(crate) axis: usize,
    /// Lower bound, in haversine units, on distances to points in the range.
    pub(crate) distance: f64,
    pub(crate) bounds: BoundingBox,
}

impl<P: SpatialPoint> KdTree<P> {
    /// Create an empty index with the default node size.
    pub fn new() -> Self {
        Self {
            node_size: DEFAULT_NODE_SIZE,
            state: Arc::new(RwLock::new(TreeState {
                points: Vec::new(),
                ids: Vec::new(),
                coords: Vec::new(),
            })),
        }
    }

    /// Create an empty index with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`VicinityError::InvalidConfig`] if `node_size` is zero.
    pub fn with_options(options: KdTreeOptions) -> Result<Self> {
        if options.node_size == 0 {
            return Err(VicinityError::InvalidConfig(
                "node_size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            node_size: options.node_size,
            ..Self::new()
        })
    }

    /// Replace all indexed points with `points` and rebuild the kd-order.
    ///
    /// Previously held storage is reused, shrinking or growing as needed.
    /// Returns the index again so a load can chain straight into a query.
    pub fn load(&self, points: Vec<P>) -> &Self {
        let n = points.len();
        if points
            .iter()
            .any(|p| !p.lon().is_finite() || !p.lat().is_finite())
        {
            log::warn!("loading points with non-finite coordinates; query results are unspecified");
        }

        let mut state = self.state.write();
        state.ids.resize(n, 0);
        state.coords.resize(2 * n, 0.0);
        for (i, point) in points.iter().enumerate() {
            state.ids[i] = i;
            state.coords[2 * i] = point.lon();
            state.coords[2 * i + 1] = point.lat();
        }
        state.points = points;

        if n > 0 {
            let TreeState { ids, coords, .. } = &mut *state;
            kd_sort(ids, coords, self.node_size, 0, n - 1, 0);
        }
        log::debug!("indexed {n} points with node size {}", self.node_size);
        self
    }

    /// Find the `k` points nearest to `origin` that `accept` admits.
    ///
    /// Results are ordered by ascending great-circle distance; points at
    /// exactly the same distance are ordered by [`rank`](SpatialPoint::rank),
    /// higher first. Fewer than `k` points come back when the accepted
    /// population runs out. `accept` is called at most once per point.
    pub fn nearby<O, F>(&self, origin: &O, k: usize, accept: F) -> Vec<P>
    where
        P: Clone,
        O: SpatialPoint,
        F: Fn(&P) -> bool,
    {
        let state = self.state.read();
        let mut result = Vec::with_capacity(k);
        if k == 0 || state.ids.is_empty() {
            return result;
        }

        let mut queue = SearchQueue::with_capacity(k);
        let (lon, lat) = (origin.lon(), origin.lat());
        let cos_lat = (lat * RAD).cos();

        // the root node covers the whole index, and thus the whole Earth
        let mut node = Some(TreeNode {
            left: 0,
            right: state.ids.len() - 1,
            axis: 0,
            distance: 0.0,
            bounds: BoundingBox::WORLD,
        });

        while let Some(current) = node {
            if current.right - current.left <= self.node_size {
                // leaf range: every point in it is a candidate
                for i in current.left..=current.right {
                    let point = &state.points[state.ids[i]];
                    if accept(point) {
                        let dist = haversin_dist(
                            lon,
                            lat,
                            state.coords[2 * i],
                            state.coords[2 * i + 1],
                            cos_lat,
                        );
                        queue.push_point(point, dist);
                    }
                }
            } else {
                let m = (current.left + current.right) >> 1;
                let mid_lon = state.coords[2 * m];
                let mid_lat = state.coords[2 * m + 1];

                // the median sits on the split plane and belongs to neither
                // half, so it is examined here
                let point = &state.points[state.ids[m]];
                if accept(point) {
                    let dist = haversin_dist(lon, lat, mid_lon, mid_lat, cos_lat);
                    queue.push_point(point, dist);
                }

                let next_axis = 1 - current.axis;

                let mut left_child = TreeNode {
                    left: current.left,
                    right: m - 1,
                    axis: next_axis,
                    distance: 0.0,
                    bounds: BoundingBox {
                        min_lon: current.bounds.min_lon,
                        min_lat: current.bounds.min_lat,
                        max_lon: if current.axis == 0 {
                            mid_lon
                        } else {
                            current.bounds.max_lon
                        },
                        max_lat: if current.axis == 0 {
                            current.bounds.max_lat
                        } else {
                            mid_lat
                        },
                    },
                };
                let mut right_child = TreeNode {
                    left: m + 1,
                    right: current.right,
                    axis: next_axis,
                    distance: 0.0,
                    bounds: BoundingBox {
                        min_lon: if current.axis == 0 {
                            mid_lon
                        } else {
                            current.bounds.min_lon
                        },
                        min_lat: if current.axis == 0 {
                            current.bounds.min_lat
                        } else {
                            mid_lat
                        },
                        max_lon: current.bounds.max_lon,
                        max_lat: current.bounds.max_lat,
                    },
                };
                left_child.distance = box_dist(lon, lat, cos_lat, &left_child.bounds);
                right_child.distance = box_dist(lon, lat, cos_lat, &right_child.bounds);

                queue.push_node(left_child);
                queue.push_node(right_child);
            }

            // drain points from the head of the queue: a point ahead of
            // every queued box is nearer than anything those boxes can
            // still contain, since each box's key is a lower bound
            while queue.peek().is_some_and(Entry::is_point) {
                match queue.pop().and_then(Entry::into_point) {
                    Some(point) => {
                        result.push(point.clone());
                        if result.len() == k {
                            return result;
                        }
                    }
                    None => break,
                }
            }

            // the next nearest box, if any entry is left
            node = queue.pop().and_then(Entry::into_node);
        }

        result
    }
}

impl<P: SpatialPoint> Default for KdTree<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for KdTree<P> {
    fn clone(&self) -> Self {
        Self {
            node_size: self.node_size,
            state: Arc::clone(&self.state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::accept_any;
    use geo::Point;

    #[test]
    fn test_empty_index_returns_nothing() {
        let idx: KdTree<Point> = KdTree::new();
        assert!(
            idx.nearby(&Point::new(-122.0, 47.0), 5, accept_any)
                .is_empty()
        );
    }

    #[test]
    fn test_zero_k_does_no_work() {
        let idx = KdTree::new();
        idx.load(vec![Point::new(-122.4, 47.6)]);
        assert!(
            idx.nearby(&Point::new(-122.0, 47.0), 0, accept_any)
                .is_empty()
        );
    }

    #[test]
    fn test_zero_node_size_is_rejected() {
        let result: Result<KdTree<Point>> = KdTree::with_options(KdTreeOptions { node_size: 0 });
        assert!(matches!(result, Err(VicinityError::InvalidConfig(_))));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: KdTreeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.node_size, DEFAULT_NODE_SIZE);

        let options: KdTreeOptions = serde_json::from_str(r#"{"node_size": 8}"#).unwrap();
        assert_eq!(options.node_size, 8);
    }

    #[test]
    fn test_reload_replaces_the_dataset() {
        let idx = KdTree::new();
        idx.load(vec![
            Point::new(-122.4, 47.6),
            Point::new(-90.05, 35.15),
            Point::new(139.67, 35.67),
        ]);
        assert_eq!(idx.nearby(&Point::new(0.0, 0.0), 10, accept_any).len(), 3);

        idx.load(vec![Point::new(31.2, 30.0)]);
        let results = idx.nearby(&Point::new(0.0, 0.0), 10, accept_any);
        assert_eq!(results, vec![Point::new(31.2, 30.0)]);

        idx.load(Vec::new());
        assert!(idx.nearby(&Point::new(0.0, 0.0), 10, accept_any).is_empty());
    }

    #[test]
    fn test_clones_share_the_loaded_state() {
        let idx = KdTree::new();
        let handle = idx.clone();
        idx.load(vec![Point::new(-122.4, 47.6)]);
        assert_eq!(
            handle.nearby(&Point::new(-122.0, 47.0), 1, accept_any).len(),
            1
        );
    }
}

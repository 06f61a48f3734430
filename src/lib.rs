//! Static in-memory k-nearest-neighbor search for locations on Earth.
//!
//! Accounts for the Earth's curvature and date-line wrapping: distances are
//! great-circle, not planar. A flat kd-tree embedded in a permutation of
//! point indices keeps queries fast without any per-node allocation.
//!
//! ```rust
//! use vicinity::{KdTree, Point, accept_any};
//!
//! let idx = KdTree::new();
//! idx.load(vec![
//!     Point::new(-122.4, 47.6),  // seattle
//!     Point::new(-90.05, 35.15), // memphis
//!     Point::new(139.67, 35.67), // tokyo
//! ]);
//!
//! let nearest = idx.nearby(&Point::new(-115.0, 45.0), 1, accept_any);
//! assert_eq!(nearest, vec![Point::new(-122.4, 47.6)]);
//! ```
//!
//! Anything exposing a longitude and latitude can be indexed by implementing
//! [`SpatialPoint`]; loaded values come back unchanged in query results.

pub mod distance;
pub mod error;
pub mod index;
pub mod point;

mod queue;
mod sort;

pub use error::{Result, VicinityError};
pub use index::{DEFAULT_NODE_SIZE, KdTree, KdTreeOptions};
pub use point::{SpatialPoint, accept_any};

pub use distance::distance_between;

pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{KdTree, KdTreeOptions, Result, SpatialPoint, VicinityError};

    pub use crate::{accept_any, distance_between};

    pub use geo::Point;
}

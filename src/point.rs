//! Point capabilities required by the index.
//!
//! Anything that can report a longitude and latitude can be indexed; the
//! index treats the value as opaque otherwise and hands it back unchanged in
//! query results. Ranking is an optional capability expressed as a defaulted
//! trait method.

use geo::Point;

/// Access to geographic coordinates in degrees.
///
/// Longitude is expected in `[-180, 180]` and latitude in `[-90, 90]`.
/// Coordinates outside those ranges (or non-finite values) are not rejected,
/// but query results over them are unspecified.
pub trait SpatialPoint {
    /// Longitude in degrees.
    fn lon(&self) -> f64;

    /// Latitude in degrees.
    fn lat(&self) -> f64;

    /// Secondary sorting property used when two points are exactly the same
    /// distance from a query origin: the higher rank sorts first.
    ///
    /// Points without a meaningful rank keep the default of `0`.
    fn rank(&self) -> f64 {
        0.0
    }
}

impl SpatialPoint for Point {
    fn lon(&self) -> f64 {
        self.x()
    }

    fn lat(&self) -> f64 {
        self.y()
    }
}

/// Acceptance predicate that admits any and all points.
///
/// ```rust
/// use vicinity::{KdTree, Point, accept_any};
///
/// let idx = KdTree::new();
/// idx.load(vec![Point::new(31.2, 30.0)]);
/// assert_eq!(idx.nearby(&Point::new(0.0, 0.0), 1, accept_any).len(), 1);
/// ```
pub fn accept_any<P: SpatialPoint>(_: &P) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ranked {
        lon: f64,
        lat: f64,
        rank: f64,
    }

    impl SpatialPoint for Ranked {
        fn lon(&self) -> f64 {
            self.lon
        }

        fn lat(&self) -> f64 {
            self.lat
        }

        fn rank(&self) -> f64 {
            self.rank
        }
    }

    #[test]
    fn test_geo_point_maps_x_to_lon_and_y_to_lat() {
        let p = Point::new(-122.4, 47.6);
        assert_eq!(p.lon(), -122.4);
        assert_eq!(p.lat(), 47.6);
        assert_eq!(p.rank(), 0.0);
    }

    #[test]
    fn test_rank_override_is_visible_through_the_trait() {
        let p = Ranked {
            lon: 0.0,
            lat: 0.0,
            rank: 42.0,
        };
        assert_eq!(p.rank(), 42.0);
    }
}

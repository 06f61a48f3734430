//! Great-circle distance primitives.
//!
//! The search never works in meters: candidates and tree nodes are ordered
//! by raw haversine values, which are monotonic with arc length. Conversion
//! to meters happens only at the public [`distance_between`] boundary.

use crate::point::SpatialPoint;

/// Degrees to radians.
pub(crate) const RAD: f64 = std::f64::consts::PI / 180.0;

/// Mean Earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Axis-aligned longitude/latitude box, in degrees.
///
/// Boxes produced by the kd-sort never straddle the anti-meridian because
/// splits are by coordinate value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BoundingBox {
    pub(crate) min_lon: f64,
    pub(crate) min_lat: f64,
    pub(crate) max_lon: f64,
    pub(crate) max_lat: f64,
}

impl BoundingBox {
    /// The whole Earth.
    pub(crate) const WORLD: Self = Self {
        min_lon: -180.0,
        min_lat: -90.0,
        max_lon: 180.0,
        max_lat: 90.0,
    };
}

/// Great-circle distance between two points, in meters.
///
/// # Examples
///
/// ```rust
/// use vicinity::{Point, distance_between};
///
/// let seattle = Point::new(-122.4, 47.6);
/// let memphis = Point::new(-90.05, 35.15);
///
/// let dist = distance_between(&seattle, &memphis);
/// assert!(dist > 3_000_000.0 && dist < 3_010_000.0);
/// ```
pub fn distance_between(a: &impl SpatialPoint, b: &impl SpatialPoint) -> f64 {
    let cos_lat = (a.lat() * RAD).cos();
    let h = haversin_dist(a.lon(), a.lat(), b.lon(), b.lat(), cos_lat);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// `sin^2(theta / 2)`, the central term of the haversine formula.
fn haversin(theta: f64) -> f64 {
    let s = (theta / 2.0).sin();
    s * s
}

/// Haversine value between two locations, with `cos_lat1` precomputed once
/// per query and reused across candidates.
pub(crate) fn haversin_dist(lon1: f64, lat1: f64, lon2: f64, lat2: f64, cos_lat1: f64) -> f64 {
    let haversin_dlon = haversin((lon1 - lon2) * RAD);
    haversin_dist_partial(haversin_dlon, cos_lat1, lat1, lat2)
}

fn haversin_dist_partial(haversin_dlon: f64, cos_lat1: f64, lat1: f64, lat2: f64) -> f64 {
    cos_lat1 * (lat2 * RAD).cos() * haversin_dlon + haversin((lat1 - lat2) * RAD)
}

/// Latitude at which the great circle from a point at `lat` toward a
/// meridian `haversin_dlon` away (as a haversine value) attains its
/// extremum. Degenerates to the pole when the meridian is antipodal.
fn vertex_lat(lat: f64, haversin_dlon: f64) -> f64 {
    let cos_dlon = 1.0 - 2.0 * haversin_dlon;
    if cos_dlon <= 0.0 {
        return if lat > 0.0 { 90.0 } else { -90.0 };
    }
    ((lat * RAD).tan() / cos_dlon).atan() / RAD
}

/// Lower bound, in haversine units, for the distance from a location to any
/// point inside `bounds`.
///
/// Longitude differences are fed straight through `sin^2`, which is periodic
/// in 360 degrees, so an origin near +180 sees boxes near -180 through the
/// ordinary east/west branch. Differences must not be clamped to
/// `[-180, 180]` first.
pub(crate) fn box_dist(lon: f64, lat: f64, cos_lat: f64, bounds: &BoundingBox) -> f64 {
    // query point is between the minimum and maximum longitudes
    if lon >= bounds.min_lon && lon <= bounds.max_lon {
        if lat < bounds.min_lat {
            return haversin((lat - bounds.min_lat) * RAD);
        }
        if lat > bounds.max_lat {
            return haversin((lat - bounds.max_lat) * RAD);
        }
        return 0.0;
    }

    // query point is west or east of the box; find the great-circle
    // extremum toward the closer of the two bounding meridians
    let haversin_dlon = haversin((lon - bounds.min_lon) * RAD)
        .min(haversin((lon - bounds.max_lon) * RAD));
    let extremum_lat = vertex_lat(lat, haversin_dlon);

    // if the extremum lies inside the box, the circle grazes it there
    if extremum_lat > bounds.min_lat && extremum_lat < bounds.max_lat {
        return haversin_dist_partial(haversin_dlon, cos_lat, lat, extremum_lat);
    }

    // otherwise the closest corner along the chosen meridian wins
    haversin_dist_partial(haversin_dlon, cos_lat, lat, bounds.min_lat)
        .min(haversin_dist_partial(haversin_dlon, cos_lat, lat, bounds.max_lat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_distance_seattle_to_memphis() {
        let seattle = Point::new(-122.4, 47.6);
        let memphis = Point::new(-90.05, 35.15);
        assert_close(distance_between(&seattle, &memphis), 3_003_566.368, 1.0);
    }

    #[test]
    fn test_distance_across_the_anti_meridian() {
        let anchorage = Point::new(-150.0, 61.2);
        let eastrussia = Point::new(178.26, 63.06);
        assert_close(distance_between(&anchorage, &eastrussia), 1_645_501.452, 1.0);
    }

    #[test]
    fn test_distance_woodinville_to_seattle() {
        let woodinville = Point::new(-122.16, 47.75);
        let seattle = Point::new(-122.4, 47.6);
        assert_close(distance_between(&woodinville, &seattle), 24_517.060, 1.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let tokyo = Point::new(139.67, 35.67);
        let cairo = Point::new(31.2, 30.0);
        assert_close(
            distance_between(&tokyo, &cairo),
            distance_between(&cairo, &tokyo),
            1e-6,
        );
    }

    #[test]
    fn test_box_dist_is_zero_inside_the_box() {
        let bounds = BoundingBox {
            min_lon: -130.0,
            min_lat: 40.0,
            max_lon: -110.0,
            max_lat: 50.0,
        };
        let cos_lat = (47.6_f64 * RAD).cos();
        assert_eq!(box_dist(-122.4, 47.6, cos_lat, &bounds), 0.0);
    }

    #[test]
    fn test_box_dist_north_and_south_of_the_box() {
        let bounds = BoundingBox {
            min_lon: -130.0,
            min_lat: 40.0,
            max_lon: -110.0,
            max_lat: 50.0,
        };
        let below = box_dist(-120.0, 30.0, (30.0_f64 * RAD).cos(), &bounds);
        assert_close(below, haversin((30.0 - 40.0) * RAD), 1e-12);
        let above = box_dist(-120.0, 60.0, (60.0_f64 * RAD).cos(), &bounds);
        assert_close(above, haversin((60.0 - 50.0) * RAD), 1e-12);
    }

    #[test]
    fn test_box_dist_lower_bounds_every_point_inside() {
        let bounds = BoundingBox {
            min_lon: 160.0,
            min_lat: 50.0,
            max_lon: 179.0,
            max_lat: 70.0,
        };
        // origin west of the box across the anti-meridian
        let (lon, lat) = (-175.0, 60.0);
        let cos_lat = (lat * RAD).cos();
        let bound = box_dist(lon, lat, cos_lat, &bounds);

        let mut box_lat = bounds.min_lat;
        while box_lat <= bounds.max_lat {
            let mut box_lon = bounds.min_lon;
            while box_lon <= bounds.max_lon {
                let actual = haversin_dist(lon, lat, box_lon, box_lat, cos_lat);
                assert!(
                    bound <= actual + 1e-12,
                    "bound {bound} exceeds distance {actual} to ({box_lon}, {box_lat})"
                );
                box_lon += 0.5;
            }
            box_lat += 0.5;
        }
    }

    #[test]
    fn test_vertex_lat_degenerates_to_the_pole_when_antipodal() {
        assert_eq!(vertex_lat(45.0, 0.75), 90.0);
        assert_eq!(vertex_lat(-45.0, 0.75), -90.0);
        assert_eq!(vertex_lat(45.0, 0.5), 90.0);
    }
}

//! Geodesic circles.

use std::f64::consts::PI;

use complaint_map_geography_models::GeoPoint;

use crate::{
    EARTH_RADIUS_M, GeometryError,
    distance::{destination, haversine_distance},
    validate_coordinate,
};

/// Checks that a circle radius is strictly positive and finite.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidRadius`] otherwise.
pub fn validate_radius(radius_m: f64) -> Result<(), GeometryError> {
    if radius_m.is_finite() && radius_m > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::InvalidRadius {
            radius_meters: radius_m,
        })
    }
}

/// Returns `true` iff the great-circle distance from `point` to `center`
/// is at most `radius_m`.
///
/// # Errors
///
/// Returns [`GeometryError`] for an invalid point, center or radius.
pub fn point_in_circle(
    point: &GeoPoint,
    center: &GeoPoint,
    radius_m: f64,
) -> Result<bool, GeometryError> {
    validate_coordinate(point)?;
    validate_coordinate(center)?;
    validate_radius(radius_m)?;
    Ok(haversine_distance(point, center) <= radius_m)
}

/// Area of a geodesic circle (spherical cap) in square meters.
///
/// Uses the half-angle form `4πR²·sin²(θ/2)`, which stays accurate and
/// strictly increasing down to millimetre radii. Radii beyond half the
/// Earth's circumference cover the whole sphere.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidRadius`] for a non-positive radius.
pub fn circle_area_m2(radius_m: f64) -> Result<f64, GeometryError> {
    validate_radius(radius_m)?;
    let angular = (radius_m / EARTH_RADIUS_M).min(PI);
    Ok(4.0 * PI * EARTH_RADIUS_M * EARTH_RADIUS_M * (angular / 2.0).sin().powi(2))
}

/// Closed polygon ring approximating a geodesic circle with `segments`
/// vertices, starting due north and running clockwise.
#[must_use]
pub fn circle_ring(center: &GeoPoint, radius_m: f64, segments: usize) -> Vec<GeoPoint> {
    let segments = segments.max(3);
    #[allow(clippy::cast_precision_loss)]
    let step = 360.0 / segments as f64;

    let mut ring: Vec<GeoPoint> = (0..segments)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let bearing = step * i as f64;
            destination(center, bearing, radius_m)
        })
        .collect();
    ring.push(ring[0]);
    ring
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_circle_area_matches_planar() {
        let area = circle_area_m2(200.0).unwrap();
        let planar = PI * 200.0 * 200.0;
        assert!((area - planar).abs() / planar < 1e-6);
    }

    #[test]
    fn area_grows_with_radius() {
        let mut previous = 0.0;
        for radius in [1.0, 10.0, 1_000.0, 100_000.0, 10_000_000.0] {
            let area = circle_area_m2(radius).unwrap();
            assert!(area > previous);
            previous = area;
        }
    }

    #[test]
    fn tiny_radii_keep_positive_increasing_area() {
        let millimetre = circle_area_m2(0.001).unwrap();
        let planar = PI * 0.001 * 0.001;
        assert!(millimetre > 0.0);
        assert!((millimetre - planar).abs() / planar < 1e-9);

        let mut previous = circle_area_m2(1.0).unwrap();
        assert!((previous - PI).abs() / PI < 1e-9);
        for step in 1..=2_000 {
            let radius = f64::from(step).mul_add(0.0005, 1.0);
            let area = circle_area_m2(radius).unwrap();
            assert!(area > previous, "area fell at radius {radius}");
            previous = area;
        }
    }

    #[test]
    fn huge_radius_covers_the_sphere() {
        let sphere = 4.0 * PI * EARTH_RADIUS_M * EARTH_RADIUS_M;
        let area = circle_area_m2(1e9).unwrap();
        assert!((area - sphere).abs() / sphere < 1e-12);
    }

    #[test]
    fn invalid_radii_are_errors() {
        assert!(circle_area_m2(0.0).is_err());
        assert!(circle_area_m2(-5.0).is_err());
        assert!(circle_area_m2(f64::NAN).is_err());
        let origin = GeoPoint::new(0.0, 0.0);
        assert!(point_in_circle(&origin, &origin, 0.0).is_err());
    }

    #[test]
    fn containment_is_distance_based() {
        let center = GeoPoint::new(0.0, 0.0);
        let near = destination(&center, 30.0, 199.0);
        let far = destination(&center, 30.0, 201.0);
        assert!(point_in_circle(&near, &center, 200.0).unwrap());
        assert!(!point_in_circle(&far, &center, 200.0).unwrap());
        assert!(point_in_circle(&center, &center, 200.0).unwrap());
    }

    #[test]
    fn ring_is_closed_and_on_the_circle() {
        let center = GeoPoint::new(73.05, 33.68);
        let ring = circle_ring(&center, 500.0, 32);
        assert_eq!(ring.len(), 33);
        assert_eq!(ring.first(), ring.last());
        for vertex in &ring {
            assert!((haversine_distance(&center, vertex) - 500.0).abs() < 1e-6);
        }
    }
}

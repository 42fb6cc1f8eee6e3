//! Great-circle distance and related spherical helpers.
//!
//! All functions assume a spherical Earth of radius [`EARTH_RADIUS_M`],
//! within ~0.5% of the ellipsoidal distance. Bearings and destinations go
//! through `geo`'s haversine measure. The distance itself is computed here
//! so the haversine term can be clamped.

use std::f64::consts::PI;

use complaint_map_geography_models::{BoundingBox, GeoPoint};
use geo::{Bearing as _, Destination as _, HaversineMeasure};

use crate::{EARTH_RADIUS_M, GeometryError, validate_coordinate};

const SPHERE: HaversineMeasure = HaversineMeasure::new(EARTH_RADIUS_M);

/// Great-circle distance in meters between two already-validated points.
///
/// Uses the haversine form with the intermediate term clamped to `[0, 1]`,
/// so floating-point overshoot on near-antipodal pairs can't produce NaN
/// and pairs under a meter apart keep full precision.
#[must_use]
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = phi2 - phi1;
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Great-circle distance in meters, validating both endpoints.
///
/// # Errors
///
/// Returns [`GeometryError`] if either point is non-finite or outside
/// WGS84 ranges.
pub fn great_circle_distance_m(a: &GeoPoint, b: &GeoPoint) -> Result<f64, GeometryError> {
    validate_coordinate(a)?;
    validate_coordinate(b)?;
    Ok(haversine_distance(a, b))
}

/// Initial bearing from `from` towards `to`, in degrees clockwise from
/// north within `[0, 360)`.
#[must_use]
pub fn initial_bearing(from: &GeoPoint, to: &GeoPoint) -> f64 {
    SPHERE.bearing(to_geo_point(from), to_geo_point(to))
}

/// Point reached by travelling `distance_m` from `origin` along the given
/// initial bearing. Longitude is normalized into `[-180, 180]`.
#[must_use]
pub fn destination(origin: &GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    let reached = SPHERE.destination(to_geo_point(origin), bearing_deg, distance_m);
    GeoPoint::new(reached.x(), reached.y())
}

const fn to_geo_point(point: &GeoPoint) -> geo::Point<f64> {
    geo::Point(geo::Coord {
        x: point.longitude,
        y: point.latitude,
    })
}

/// Bounding box that contains every point within `radius_m` of `center`.
///
/// The latitude extent is exact. The longitude extent uses the tangent
/// latitude of the spherical cap. Caps that reach a pole or cross the
/// antimeridian widen to the full longitude range rather than wrapping.
#[must_use]
pub fn radius_envelope(center: &GeoPoint, radius_m: f64) -> BoundingBox {
    let angular = (radius_m / EARTH_RADIUS_M).min(PI);
    let d_lat = angular.to_degrees();
    let min_lat = (center.latitude - d_lat).max(-90.0);
    let max_lat = (center.latitude + d_lat).min(90.0);

    let reaches_pole = center.latitude.abs() + d_lat >= 90.0;
    let (min_lng, max_lng) = if reaches_pole {
        (-180.0, 180.0)
    } else {
        let ratio = (angular.sin() / center.latitude.to_radians().cos()).min(1.0);
        let d_lng = ratio.asin().to_degrees();
        let west = center.longitude - d_lng;
        let east = center.longitude + d_lng;
        if west < -180.0 || east > 180.0 {
            (-180.0, 180.0)
        } else {
            (west, east)
        }
    };

    BoundingBox {
        min_lng,
        min_lat,
        max_lng,
        max_lat,
    }
}

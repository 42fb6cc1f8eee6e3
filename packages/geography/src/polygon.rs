//! Polygon rings: validation, normalization, spherical area and
//! containment.

use std::collections::BTreeSet;

use complaint_map_geography_models::GeoPoint;
use geo::{Area as _, Coord, GeodesicArea as _, Intersects as _, LineString, Polygon};

use crate::{GeometryError, validate_coordinate};

/// Planar area (square degrees) below which a ring is treated as collinear.
const MIN_PLANAR_AREA_DEG2: f64 = 1e-14;

/// Turns a drawn vertex list into a canonical closed ring.
///
/// Consecutive duplicate vertices are collapsed and the ring is closed if
/// the caller left it open.
///
/// # Errors
///
/// Returns [`GeometryError`] if a vertex is invalid, fewer than three
/// distinct vertices remain, or the ring encloses no area.
pub fn normalize_ring(vertices: &[GeoPoint]) -> Result<Vec<GeoPoint>, GeometryError> {
    for vertex in vertices {
        validate_coordinate(vertex)?;
    }

    let mut ring: Vec<GeoPoint> = Vec::with_capacity(vertices.len() + 1);
    for vertex in vertices {
        if ring.last() != Some(vertex) {
            ring.push(*vertex);
        }
    }
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }

    let distinct = distinct_vertex_count(&ring);
    if distinct < 3 {
        return Err(GeometryError::TooFewVertices { distinct });
    }

    ring.push(ring[0]);
    validate_ring(&ring)?;
    Ok(ring)
}

/// Checks the canonical ring invariants: valid coordinates, closed, at
/// least three distinct vertices, no edge across ±180° longitude and a
/// non-zero enclosed area.
///
/// # Errors
///
/// Returns the [`GeometryError`] describing the first violated invariant.
pub fn validate_ring(ring: &[GeoPoint]) -> Result<(), GeometryError> {
    for vertex in ring {
        validate_coordinate(vertex)?;
    }

    let distinct = distinct_vertex_count(ring);
    if ring.len() < 4 || distinct < 3 {
        return Err(GeometryError::TooFewVertices { distinct });
    }
    if ring.first() != ring.last() {
        return Err(GeometryError::UnclosedRing);
    }
    if let Some((from, to)) = antimeridian_edge(ring) {
        return Err(GeometryError::CrossesAntimeridian {
            from: from.longitude,
            to: to.longitude,
        });
    }
    if to_geo_polygon(ring).unsigned_area() < MIN_PLANAR_AREA_DEG2 {
        return Err(GeometryError::ZeroArea);
    }
    Ok(())
}

/// Ellipsoidal (WGS84) area of a ring in square meters, without
/// validation. Winding direction does not affect the result.
#[must_use]
pub fn ring_area_m2(ring: &[GeoPoint]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    to_geo_polygon(ring).geodesic_area_signed().abs()
}

/// First edge whose endpoints are more than 180° of longitude apart. Such
/// an edge is meant to run the short way across the antimeridian, which
/// planar containment and area cannot represent.
pub(crate) fn antimeridian_edge(ring: &[GeoPoint]) -> Option<(GeoPoint, GeoPoint)> {
    ring.windows(2)
        .find(|w| (w[1].longitude - w[0].longitude).abs() > 180.0)
        .map(|w| (w[0], w[1]))
}

/// Geodesic area of a polygon ring in square meters.
///
/// # Errors
///
/// Returns [`GeometryError`] if the ring is degenerate.
pub fn polygon_area_m2(ring: &[GeoPoint]) -> Result<f64, GeometryError> {
    validate_ring(ring)?;
    Ok(ring_area_m2(ring))
}

/// Returns `true` if `point` lies inside or on the boundary of the ring.
///
/// # Errors
///
/// Returns [`GeometryError`] if the point or ring is invalid.
pub fn point_in_polygon(point: &GeoPoint, ring: &[GeoPoint]) -> Result<bool, GeometryError> {
    validate_coordinate(point)?;
    validate_ring(ring)?;
    Ok(ring_contains(&to_geo_polygon(ring), point))
}

/// Boundary-inclusive containment against an already-built polygon.
#[must_use]
pub fn ring_contains(polygon: &Polygon<f64>, point: &GeoPoint) -> bool {
    polygon.intersects(&geo::Point::new(point.longitude, point.latitude))
}

/// Converts a ring into a hole-free [`geo::Polygon`].
#[must_use]
pub fn to_geo_polygon(ring: &[GeoPoint]) -> Polygon<f64> {
    let exterior: LineString<f64> = ring
        .iter()
        .map(|p| Coord {
            x: p.longitude,
            y: p.latitude,
        })
        .collect();
    Polygon::new(exterior, vec![])
}

/// Converts the exterior of a [`geo::Polygon`] back into a ring.
#[must_use]
pub fn from_geo_polygon(polygon: &Polygon<f64>) -> Vec<GeoPoint> {
    polygon
        .exterior()
        .coords()
        .map(|c| GeoPoint::new(c.x, c.y))
        .collect()
}

fn distinct_vertex_count(ring: &[GeoPoint]) -> usize {
    ring.iter()
        .map(|p| (p.longitude.to_bits(), p.latitude.to_bits()))
        .collect::<BTreeSet<_>>()
        .len()
}

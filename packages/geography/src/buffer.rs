//! Outward buffers around points and regions.

use complaint_map_geography_models::{BufferMode, BufferSource, GeoPoint, Region};
use geo::{Area as _, BooleanOps as _, MultiPolygon, Polygon};

use crate::{
    DEFAULT_CIRCLE_SEGMENTS, GeometryError,
    circle::circle_ring,
    distance::{destination, initial_bearing},
    polygon::{antimeridian_edge, from_geo_polygon, to_geo_polygon, validate_ring},
    region::validate_region,
    validate_coordinate,
};

/// Buffer distance after applying the mode's priority weight.
#[must_use]
pub const fn effective_distance(source: &BufferSource, distance_m: f64, mode: BufferMode) -> f64 {
    distance_m * mode.weight(source.priority())
}

/// Buffers `source` outward by `distance_m`, approximating round edges
/// with [`DEFAULT_CIRCLE_SEGMENTS`] segments.
///
/// # Errors
///
/// See [`create_buffer_with_segments`].
pub fn create_buffer(
    source: &BufferSource,
    distance_m: f64,
    mode: BufferMode,
) -> Result<Region, GeometryError> {
    create_buffer_with_segments(source, distance_m, mode, DEFAULT_CIRCLE_SEGMENTS)
}

/// Buffers `source` outward by `distance_m`.
///
/// Points become a circle of the effective distance and circles grow
/// their radius. Polygons are offset along every edge with rounded
/// corners; holes in the result are dropped.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidDistance`] unless `distance_m` is
/// positive and finite, the source's own validation error if it is
/// malformed, or [`GeometryError::BufferFailed`] if the offset polygon
/// cannot be built (for example across the antimeridian).
pub fn create_buffer_with_segments(
    source: &BufferSource,
    distance_m: f64,
    mode: BufferMode,
    segments: usize,
) -> Result<Region, GeometryError> {
    if !(distance_m.is_finite() && distance_m > 0.0) {
        return Err(GeometryError::InvalidDistance {
            distance_meters: distance_m,
        });
    }
    let effective = effective_distance(source, distance_m, mode);
    log::debug!("Buffering by {effective}m (requested {distance_m}m, mode {mode:?})");

    match source {
        BufferSource::Point { location } | BufferSource::Tagged { location, .. } => {
            validate_coordinate(location)?;
            Ok(Region::Circle {
                center: *location,
                radius_meters: effective,
            })
        }
        BufferSource::Shape { region } => {
            validate_region(region)?;
            match region {
                Region::Circle {
                    center,
                    radius_meters,
                } => Ok(Region::Circle {
                    center: *center,
                    radius_meters: radius_meters + effective,
                }),
                Region::Polygon { ring } => {
                    let merged = buffer_ring(ring, effective, segments)?;
                    let largest = largest_polygon(&merged)?;
                    let ring = from_geo_polygon(largest);
                    validate_buffered(&ring)?;
                    Ok(Region::Polygon { ring })
                }
                Region::MultiPolygon { rings } => {
                    let mut merged = MultiPolygon::new(vec![]);
                    for ring in rings {
                        merged = merged.union(&buffer_ring(ring, effective, segments)?);
                    }
                    let mut rings = Vec::with_capacity(merged.0.len());
                    for polygon in &merged.0 {
                        let ring = from_geo_polygon(polygon);
                        validate_buffered(&ring)?;
                        rings.push(ring);
                    }
                    match rings.len() {
                        0 => Err(GeometryError::BufferFailed {
                            message: "union produced no polygon".to_string(),
                        }),
                        1 => Ok(Region::Polygon {
                            ring: rings.remove(0),
                        }),
                        _ => Ok(Region::MultiPolygon { rings }),
                    }
                }
            }
        }
    }
}

/// Union of the ring, a disc at each vertex and a rectangle along each
/// edge, all at `distance_m`.
fn buffer_ring(
    ring: &[GeoPoint],
    distance_m: f64,
    segments: usize,
) -> Result<MultiPolygon<f64>, GeometryError> {
    let mut pieces: Vec<Vec<GeoPoint>> = Vec::with_capacity(ring.len() * 2);
    pieces.push(ring.to_vec());

    for vertex in &ring[..ring.len() - 1] {
        pieces.push(circle_ring(vertex, distance_m, segments));
    }

    for edge in ring.windows(2) {
        let (a, b) = (edge[0], edge[1]);
        if a == b {
            continue;
        }
        let bearing = initial_bearing(&a, &b);
        let back = initial_bearing(&b, &a);
        let left = bearing - 90.0;
        let right = bearing + 90.0;
        // The bearing at `b` differs from the one at `a` on long edges.
        let b_left = back + 90.0;
        let b_right = back - 90.0;
        pieces.push(vec![
            destination(&a, left, distance_m),
            destination(&b, b_left, distance_m),
            destination(&b, b_right, distance_m),
            destination(&a, right, distance_m),
            destination(&a, left, distance_m),
        ]);
    }

    let mut merged = MultiPolygon::new(vec![]);
    for piece in &pieces {
        if antimeridian_edge(piece).is_some() {
            return Err(GeometryError::BufferFailed {
                message: "buffer crosses the antimeridian".to_string(),
            });
        }
        merged = merged.union(&MultiPolygon::new(vec![to_geo_polygon(piece)]));
    }
    Ok(merged)
}

fn largest_polygon(merged: &MultiPolygon<f64>) -> Result<&Polygon<f64>, GeometryError> {
    merged
        .0
        .iter()
        .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
        .ok_or_else(|| GeometryError::BufferFailed {
            message: "union produced no polygon".to_string(),
        })
}

fn validate_buffered(ring: &[GeoPoint]) -> Result<(), GeometryError> {
    validate_ring(ring).map_err(|e| GeometryError::BufferFailed {
        message: format!("buffered ring is invalid: {e}"),
    })
}

//! Normalization of drawn shapes into canonical regions.

use complaint_map_geography_models::{BufferSource, GeoPoint, Region, RegionSpec};

use crate::{
    GeometryError, RegionError,
    buffer::create_buffer,
    circle::validate_radius,
    polygon::normalize_ring,
    validate_bounds, validate_coordinate,
};

/// Builds a canonical [`Region`] from a drawn shape.
///
/// `reference` is the caller's current location. It is only consulted by
/// [`RegionSpec::Buffer`] without an explicit center; no other shape ever
/// falls back to it.
///
/// # Errors
///
/// Returns [`RegionError::Geometry`] for a malformed shape and
/// [`RegionError::InsufficientInput`] for a buffer with no center and no
/// reference location.
pub fn build_region(spec: &RegionSpec, reference: Option<GeoPoint>) -> Result<Region, RegionError> {
    let region = match spec {
        RegionSpec::Polygon { vertices } => Region::Polygon {
            ring: normalize_ring(vertices)?,
        },
        RegionSpec::MultiPolygon { polygons } => {
            if polygons.is_empty() {
                return Err(GeometryError::EmptyMultiPolygon.into());
            }
            let mut rings = polygons
                .iter()
                .map(|vertices| normalize_ring(vertices))
                .collect::<Result<Vec<_>, _>>()?;
            if rings.len() == 1 {
                Region::Polygon {
                    ring: rings.remove(0),
                }
            } else {
                Region::MultiPolygon { rings }
            }
        }
        RegionSpec::Rectangle { bounds } => {
            validate_bounds(bounds)?;
            let ring = vec![
                GeoPoint::new(bounds.min_lng, bounds.min_lat),
                GeoPoint::new(bounds.max_lng, bounds.min_lat),
                GeoPoint::new(bounds.max_lng, bounds.max_lat),
                GeoPoint::new(bounds.min_lng, bounds.max_lat),
                GeoPoint::new(bounds.min_lng, bounds.min_lat),
            ];
            Region::Polygon { ring }
        }
        RegionSpec::Circle {
            center,
            radius_meters,
        } => {
            validate_coordinate(center)?;
            validate_radius(*radius_meters)?;
            Region::Circle {
                center: *center,
                radius_meters: *radius_meters,
            }
        }
        RegionSpec::Buffer {
            center,
            distance_meters,
            mode,
            priority,
        } => {
            let Some(location) = center.or(reference) else {
                return Err(RegionError::InsufficientInput {
                    message: "buffer needs an explicit center or a reference location".to_string(),
                });
            };
            let source = match priority {
                Some(priority) => BufferSource::Tagged {
                    location,
                    priority: *priority,
                },
                None => BufferSource::Point { location },
            };
            create_buffer(&source, *distance_meters, *mode)?
        }
    };

    log::debug!("Built {} region", region.shape_name());
    Ok(region)
}

//! Drawn shapes in `GeoJSON` form.
//!
//! Drawing tools hand over either a bare geometry or a single feature.
//! Circles have no `GeoJSON` geometry of their own, so they arrive as a
//! `Point` feature with a numeric `radius` property in meters.

use ::geojson::{Feature, GeoJson, Geometry, Value};
use complaint_map_geography_models::{GeoPoint, RegionSpec};

use crate::GeometryError;

/// Feature property holding a circle radius in meters.
pub const RADIUS_PROPERTY: &str = "radius";

/// Parses a drawn shape from a `GeoJSON` document into a [`RegionSpec`].
///
/// The spec still has to go through [`crate::build_region`] to be
/// validated and normalized.
///
/// # Errors
///
/// Returns [`GeometryError::GeoJson`] if the text is not `GeoJSON`, is a
/// feature collection, has polygon holes, or is any geometry other than a
/// `Polygon`, `MultiPolygon` or radius-tagged `Point`.
pub fn region_spec_from_geojson(raw: &str) -> Result<RegionSpec, GeometryError> {
    let parsed: GeoJson = raw.parse().map_err(|e: ::geojson::Error| geojson_error(e.to_string()))?;

    match parsed {
        GeoJson::Geometry(geometry) => spec_from_geometry(geometry, None),
        GeoJson::Feature(feature) => spec_from_feature(feature),
        GeoJson::FeatureCollection(collection) => Err(geojson_error(format!(
            "expected a single shape, got a feature collection of {}",
            collection.features.len()
        ))),
    }
}

fn spec_from_feature(feature: Feature) -> Result<RegionSpec, GeometryError> {
    let radius = match feature.property(RADIUS_PROPERTY) {
        Some(value) => Some(
            value
                .as_f64()
                .ok_or_else(|| geojson_error(format!("'{RADIUS_PROPERTY}' must be a number")))?,
        ),
        None => None,
    };
    let geometry = feature
        .geometry
        .ok_or_else(|| geojson_error("feature has no geometry".to_string()))?;
    spec_from_geometry(geometry, radius)
}

fn spec_from_geometry(
    geometry: Geometry,
    radius: Option<f64>,
) -> Result<RegionSpec, GeometryError> {
    if let Value::Point(position) = &geometry.value {
        let center = position_to_point(position)?;
        let radius_meters = radius.ok_or_else(|| {
            geojson_error(format!("point shape needs a '{RADIUS_PROPERTY}' property"))
        })?;
        return Ok(RegionSpec::Circle {
            center,
            radius_meters,
        });
    }

    let geometry: geo::Geometry<f64> = geometry
        .try_into()
        .map_err(|e: ::geojson::Error| geojson_error(e.to_string()))?;

    match geometry {
        geo::Geometry::Polygon(polygon) => Ok(RegionSpec::Polygon {
            vertices: exterior_vertices(&polygon)?,
        }),
        geo::Geometry::MultiPolygon(multi) => Ok(RegionSpec::MultiPolygon {
            polygons: multi
                .0
                .iter()
                .map(exterior_vertices)
                .collect::<Result<_, _>>()?,
        }),
        other => Err(geojson_error(format!(
            "unsupported geometry type {}",
            geometry_name(&other)
        ))),
    }
}

fn exterior_vertices(polygon: &geo::Polygon<f64>) -> Result<Vec<GeoPoint>, GeometryError> {
    if !polygon.interiors().is_empty() {
        return Err(geojson_error("polygon holes are not supported".to_string()));
    }
    Ok(polygon
        .exterior()
        .coords()
        .map(|c| GeoPoint::new(c.x, c.y))
        .collect())
}

fn position_to_point(position: &[f64]) -> Result<GeoPoint, GeometryError> {
    match position {
        [longitude, latitude, ..] => Ok(GeoPoint::new(*longitude, *latitude)),
        _ => Err(geojson_error("position needs longitude and latitude".to_string())),
    }
}

const fn geometry_name(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) | geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Polygon(_) | geo::Geometry::Rect(_) | geo::Geometry::Triangle(_) => {
            "Polygon"
        }
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
    }
}

const fn geojson_error(message: String) -> GeometryError {
    GeometryError::GeoJson { message }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geodesic geometry for complaint analysis.
//!
//! Everything here works directly on unprojected WGS84 coordinates:
//!
//! - [`distance`]: haversine distance, bearings, destination points and
//!   radius envelopes.
//! - [`polygon`] / [`circle`]: containment tests and spherical areas.
//! - [`region`]: validation of canonical [`Region`]s and a prepared form
//!   for classifying many points against one region.
//! - [`builder`]: normalizes raw [`RegionSpec`]s from a drawing tool.
//! - [`buffer`]: grows a point or region outward by a distance.
//! - [`geojson_input`]: reads drawn shapes from `GeoJSON`.
//!
//! Degenerate input is always an error; nothing here returns a zero area
//! or a `false` containment result for a shape it could not interpret.

pub mod buffer;
pub mod builder;
pub mod circle;
pub mod distance;
pub mod geojson_input;
pub mod polygon;
pub mod region;

pub use buffer::{create_buffer, create_buffer_with_segments, effective_distance};
pub use builder::build_region;
pub use circle::{circle_area_m2, point_in_circle};
pub use complaint_map_geography_models::{
    BoundingBox, BufferMode, BufferSource, GeoPoint, Region, RegionSpec,
};
pub use distance::{great_circle_distance_m, haversine_distance};
pub use geojson_input::region_spec_from_geojson;
pub use polygon::{point_in_polygon, polygon_area_m2};
pub use region::{PreparedRegion, region_area_m2, region_bounds, validate_region};

use thiserror::Error;

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Segment count used to approximate round buffer edges.
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 64;

/// Malformed coordinates, shapes or distances.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A coordinate component is NaN or infinite.
    #[error("Non-finite coordinate ({longitude}, {latitude})")]
    NonFiniteCoordinate {
        /// Offending longitude.
        longitude: f64,
        /// Offending latitude.
        latitude: f64,
    },

    /// A coordinate is outside the WGS84 range.
    #[error("Coordinate ({longitude}, {latitude}) is outside WGS84 range")]
    CoordinateOutOfRange {
        /// Offending longitude.
        longitude: f64,
        /// Offending latitude.
        latitude: f64,
    },

    /// A polygon ring has fewer than three distinct vertices.
    #[error("Polygon ring needs at least 3 distinct vertices, found {distinct}")]
    TooFewVertices {
        /// Number of distinct vertices found.
        distinct: usize,
    },

    /// A canonical ring does not end where it starts.
    #[error("Polygon ring is not closed")]
    UnclosedRing,

    /// All vertices of a ring are collinear.
    #[error("Polygon ring encloses zero area")]
    ZeroArea,

    /// A ring edge jumps across ±180° longitude.
    #[error("Polygon ring crosses the antimeridian between longitudes {from} and {to}")]
    CrossesAntimeridian {
        /// Longitude the edge starts at.
        from: f64,
        /// Longitude the edge ends at.
        to: f64,
    },

    /// A multipolygon has no member polygons.
    #[error("Multipolygon has no polygons")]
    EmptyMultiPolygon,

    /// A circle radius is zero, negative or non-finite.
    #[error("Circle radius must be positive and finite, got {radius_meters}")]
    InvalidRadius {
        /// Offending radius.
        radius_meters: f64,
    },

    /// A buffer distance is zero, negative or non-finite.
    #[error("Buffer distance must be positive and finite, got {distance_meters}")]
    InvalidDistance {
        /// Offending distance.
        distance_meters: f64,
    },

    /// A bounding box is inverted, empty or out of range.
    #[error("Invalid bounding box: {message}")]
    InvalidBounds {
        /// Description of what went wrong.
        message: String,
    },

    /// Buffering produced no usable polygon.
    #[error("Buffer construction failed: {message}")]
    BufferFailed {
        /// Description of what went wrong.
        message: String,
    },

    /// `GeoJSON` input could not be parsed or is not a supported shape.
    #[error("GeoJSON error: {message}")]
    GeoJson {
        /// Description of what went wrong.
        message: String,
    },
}

/// Errors from turning a drawn shape into a [`Region`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    /// The shape itself is malformed.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Not enough information to place the region.
    #[error("Insufficient input: {message}")]
    InsufficientInput {
        /// Description of what is missing.
        message: String,
    },
}

/// Checks that a coordinate is finite and inside WGS84 ranges.
///
/// # Errors
///
/// Returns [`GeometryError::NonFiniteCoordinate`] or
/// [`GeometryError::CoordinateOutOfRange`].
pub fn validate_coordinate(point: &GeoPoint) -> Result<(), GeometryError> {
    if !point.is_finite() {
        return Err(GeometryError::NonFiniteCoordinate {
            longitude: point.longitude,
            latitude: point.latitude,
        });
    }
    if !point.is_valid() {
        return Err(GeometryError::CoordinateOutOfRange {
            longitude: point.longitude,
            latitude: point.latitude,
        });
    }
    Ok(())
}

/// Checks that a bounding box is usable as an analysis extent.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidBounds`] if a corner is invalid or the
/// box has no width or height.
pub fn validate_bounds(bounds: &BoundingBox) -> Result<(), GeometryError> {
    validate_coordinate(&bounds.south_west())?;
    validate_coordinate(&bounds.north_east())?;
    if bounds.min_lng >= bounds.max_lng || bounds.min_lat >= bounds.max_lat {
        return Err(GeometryError::InvalidBounds {
            message: format!(
                "south-west ({}, {}) must be strictly below and left of north-east ({}, {})",
                bounds.min_lng, bounds.min_lat, bounds.max_lng, bounds.max_lat
            ),
        });
    }
    Ok(())
}

/// Checks that a bounding box can be measured edge to edge: valid and
/// narrower than half the globe. Envelopes of circles that cross the
/// antimeridian or reach a pole span the full longitude range and fail.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidBounds`] for an invalid or too wide box.
pub fn validate_extent(bounds: &BoundingBox) -> Result<(), GeometryError> {
    validate_bounds(bounds)?;
    let span = bounds.max_lng - bounds.min_lng;
    if span >= 180.0 {
        return Err(GeometryError::InvalidBounds {
            message: format!(
                "longitude span of {span} degrees has no usable extent; \
                 shapes crossing the antimeridian or reaching a pole are not supported"
            ),
        });
    }
    Ok(())
}

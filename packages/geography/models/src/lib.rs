#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geometric value types shared by every analysis.
//!
//! These types describe *where* an analysis runs: WGS84 coordinates,
//! bounding boxes, canonical regions and the raw shape specifications a
//! drawing tool hands over. They carry no algorithms; validation,
//! containment and area live in `complaint_map_geography`.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    /// Longitude in degrees, `[-180, 180]`.
    pub longitude: f64,
    /// Latitude in degrees, `[-90, 90]`.
    pub latitude: f64,
}

impl GeoPoint {
    /// Creates a point from longitude/latitude order (GeoJSON order).
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Returns `true` if both components are finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }

    /// Returns `true` if the coordinate is finite and inside the WGS84
    /// longitude/latitude ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

/// Axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Western edge.
    pub min_lng: f64,
    /// Southern edge.
    pub min_lat: f64,
    /// Eastern edge.
    pub max_lng: f64,
    /// Northern edge.
    pub max_lat: f64,
}

impl BoundingBox {
    /// Creates a box from its south-west and north-east corners.
    #[must_use]
    pub const fn from_corners(south_west: GeoPoint, north_east: GeoPoint) -> Self {
        Self {
            min_lng: south_west.longitude,
            min_lat: south_west.latitude,
            max_lng: north_east.longitude,
            max_lat: north_east.latitude,
        }
    }

    /// Smallest box containing every point, or `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self::from_corners(*first, *first);
        for p in &points[1..] {
            bounds.min_lng = bounds.min_lng.min(p.longitude);
            bounds.min_lat = bounds.min_lat.min(p.latitude);
            bounds.max_lng = bounds.max_lng.max(p.longitude);
            bounds.max_lat = bounds.max_lat.max(p.latitude);
        }
        Some(bounds)
    }

    /// South-west corner.
    #[must_use]
    pub const fn south_west(&self) -> GeoPoint {
        GeoPoint::new(self.min_lng, self.min_lat)
    }

    /// North-east corner.
    #[must_use]
    pub const fn north_east(&self) -> GeoPoint {
        GeoPoint::new(self.max_lng, self.max_lat)
    }

    /// Arithmetic center of the box.
    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lng + self.max_lng) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Returns `true` if the point lies inside or on the edge of the box.
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lng..=self.max_lng).contains(&point.longitude)
            && (self.min_lat..=self.max_lat).contains(&point.latitude)
    }

    /// Returns `true` if all edges are valid WGS84 values and the box has
    /// positive width and height.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.south_west().is_valid()
            && self.north_east().is_valid()
            && self.min_lng < self.max_lng
            && self.min_lat < self.max_lat
    }
}

/// Canonical containment boundary consumed by every analysis.
///
/// Polygon rings are closed (first coordinate equals last) and hold at
/// least three distinct vertices. Circle radii are strictly positive.
/// Holes are not modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Region {
    /// A single exterior ring.
    Polygon {
        /// Closed ring of `(lon, lat)` vertices.
        ring: Vec<GeoPoint>,
    },
    /// Several disjoint exterior rings; a point is inside if it is inside
    /// any of them.
    #[serde(rename_all = "camelCase")]
    MultiPolygon {
        /// Closed rings, one per member polygon.
        rings: Vec<Vec<GeoPoint>>,
    },
    /// Geodesic circle.
    #[serde(rename_all = "camelCase")]
    Circle {
        /// Circle center.
        center: GeoPoint,
        /// Great-circle radius in meters.
        radius_meters: f64,
    },
}

impl Region {
    /// Short lowercase name of the region shape.
    #[must_use]
    pub const fn shape_name(&self) -> &'static str {
        match self {
            Self::Polygon { .. } => "polygon",
            Self::MultiPolygon { .. } => "multipolygon",
            Self::Circle { .. } => "circle",
        }
    }
}

/// Weighting applied to a buffer distance.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BufferMode {
    /// Same distance in every direction.
    #[default]
    Standard,
    /// Distance scaled by the priority of a tagged point.
    Variable,
}

impl BufferMode {
    /// Distance multiplier for a complaint priority in [`BufferMode::Variable`].
    ///
    /// Priorities 1 and 2 keep the base distance, 3 widens it by half and
    /// anything else doubles it. [`BufferMode::Standard`] always returns 1.
    #[must_use]
    pub const fn weight(self, priority: u32) -> f64 {
        match self {
            Self::Standard => 1.0,
            Self::Variable => match priority {
                1 | 2 => 1.0,
                3 => 1.5,
                _ => 2.0,
            },
        }
    }
}

/// What a buffer is drawn around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BufferSource {
    /// A bare location.
    Point {
        /// Buffer center.
        location: GeoPoint,
    },
    /// A complaint location carrying a priority, used by
    /// [`BufferMode::Variable`].
    Tagged {
        /// Buffer center.
        location: GeoPoint,
        /// Priority of the feature being buffered.
        priority: u32,
    },
    /// An existing region that is offset outward.
    Shape {
        /// Region to grow.
        region: Region,
    },
}

impl BufferSource {
    /// The point the buffer is centred on, if the source is a point.
    #[must_use]
    pub const fn origin(&self) -> Option<GeoPoint> {
        match self {
            Self::Point { location } | Self::Tagged { location, .. } => Some(*location),
            Self::Shape { .. } => None,
        }
    }

    /// Priority used for distance weighting. Untagged sources behave like
    /// priority 1.
    #[must_use]
    pub const fn priority(&self) -> u32 {
        match self {
            Self::Tagged { priority, .. } => *priority,
            Self::Point { .. } | Self::Shape { .. } => 1,
        }
    }
}

/// Raw user-drawn shape prior to normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RegionSpec {
    /// Ordered vertex list; closing the ring is optional.
    Polygon {
        /// Vertices in drawing order.
        vertices: Vec<GeoPoint>,
    },
    /// Several vertex lists forming one multipolygon.
    MultiPolygon {
        /// One vertex list per member polygon.
        polygons: Vec<Vec<GeoPoint>>,
    },
    /// Axis-aligned rectangle.
    Rectangle {
        /// Rectangle extent.
        bounds: BoundingBox,
    },
    /// Circle with an explicit center.
    #[serde(rename_all = "camelCase")]
    Circle {
        /// Circle center.
        center: GeoPoint,
        /// Radius in meters.
        radius_meters: f64,
    },
    /// Buffer around a point. Without an explicit center the caller's
    /// reference location is used; if neither exists the build fails.
    #[serde(rename_all = "camelCase")]
    Buffer {
        /// Explicit buffer center.
        center: Option<GeoPoint>,
        /// Buffer distance in meters.
        distance_meters: f64,
        /// Distance weighting.
        #[serde(default)]
        mode: BufferMode,
        /// Priority used by [`BufferMode::Variable`].
        #[serde(default)]
        priority: Option<u32>,
    },
}

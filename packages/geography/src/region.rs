//! Canonical region checks and a prepared form for bulk containment.

use complaint_map_geography_models::{BoundingBox, GeoPoint, Region};
use geo::Polygon;

use crate::{
    GeometryError,
    circle::{circle_area_m2, validate_radius},
    distance::{haversine_distance, radius_envelope},
    polygon::{ring_area_m2, ring_contains, to_geo_polygon, validate_ring},
    validate_coordinate,
};

/// Checks that a [`Region`] satisfies its invariants.
///
/// # Errors
///
/// Returns the [`GeometryError`] for the first violated invariant.
pub fn validate_region(region: &Region) -> Result<(), GeometryError> {
    match region {
        Region::Polygon { ring } => validate_ring(ring),
        Region::MultiPolygon { rings } => {
            if rings.is_empty() {
                return Err(GeometryError::EmptyMultiPolygon);
            }
            rings.iter().try_for_each(|ring| validate_ring(ring))
        }
        Region::Circle {
            center,
            radius_meters,
        } => {
            validate_coordinate(center)?;
            validate_radius(*radius_meters)
        }
    }
}

/// Geodesic area of a region in square meters. Multipolygon members are
/// summed.
///
/// # Errors
///
/// Returns [`GeometryError`] if the region is invalid.
pub fn region_area_m2(region: &Region) -> Result<f64, GeometryError> {
    validate_region(region)?;
    Ok(unchecked_area(region))
}

/// Bounding box of a region.
///
/// # Errors
///
/// Returns [`GeometryError`] if the region is invalid.
pub fn region_bounds(region: &Region) -> Result<BoundingBox, GeometryError> {
    validate_region(region)?;
    Ok(unchecked_bounds(region))
}

fn unchecked_area(region: &Region) -> f64 {
    match region {
        Region::Polygon { ring } => ring_area_m2(ring),
        Region::MultiPolygon { rings } => rings.iter().map(|r| ring_area_m2(r)).sum(),
        Region::Circle { radius_meters, .. } => circle_area_m2(*radius_meters).unwrap_or(0.0),
    }
}

fn unchecked_bounds(region: &Region) -> BoundingBox {
    match region {
        Region::Polygon { ring } => ring_bounds(ring),
        Region::MultiPolygon { rings } => {
            let corners: Vec<GeoPoint> = rings
                .iter()
                .map(|r| ring_bounds(r))
                .flat_map(|b| [b.south_west(), b.north_east()])
                .collect();
            bounds_or_point(&corners, GeoPoint::new(0.0, 0.0))
        }
        Region::Circle {
            center,
            radius_meters,
        } => radius_envelope(center, *radius_meters),
    }
}

fn ring_bounds(ring: &[GeoPoint]) -> BoundingBox {
    bounds_or_point(ring, GeoPoint::new(0.0, 0.0))
}

fn bounds_or_point(points: &[GeoPoint], fallback: GeoPoint) -> BoundingBox {
    BoundingBox::from_points(points)
        .unwrap_or_else(|| BoundingBox::from_corners(fallback, fallback))
}

/// A polygon member with its bounding box for a cheap first check.
struct PreparedPolygon {
    bounds: BoundingBox,
    polygon: Polygon<f64>,
}

enum PreparedShape {
    Polygons(Vec<PreparedPolygon>),
    Circle { center: GeoPoint, radius_m: f64 },
}

/// A validated region with its geometry pre-built, for classifying many
/// points against the same boundary.
///
/// Immutable once built, so one instance can be shared across threads.
pub struct PreparedRegion {
    region: Region,
    shape: PreparedShape,
    area_m2: f64,
    bounds: BoundingBox,
}

impl PreparedRegion {
    /// Validates `region` and prepares it for containment queries.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] if the region is invalid.
    pub fn new(region: &Region) -> Result<Self, GeometryError> {
        validate_region(region)?;

        let prepare = |ring: &Vec<GeoPoint>| PreparedPolygon {
            bounds: ring_bounds(ring),
            polygon: to_geo_polygon(ring),
        };
        let shape = match region {
            Region::Polygon { ring } => PreparedShape::Polygons(vec![prepare(ring)]),
            Region::MultiPolygon { rings } => {
                PreparedShape::Polygons(rings.iter().map(prepare).collect())
            }
            Region::Circle {
                center,
                radius_meters,
            } => PreparedShape::Circle {
                center: *center,
                radius_m: *radius_meters,
            },
        };

        Ok(Self {
            region: region.clone(),
            shape,
            area_m2: unchecked_area(region),
            bounds: unchecked_bounds(region),
        })
    }

    /// Returns `true` if the point is inside the region. Boundaries count
    /// as inside.
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        match &self.shape {
            PreparedShape::Polygons(members) => members
                .iter()
                .any(|m| m.bounds.contains(point) && ring_contains(&m.polygon, point)),
            PreparedShape::Circle { center, radius_m } => {
                haversine_distance(point, center) <= *radius_m
            }
        }
    }

    /// Geodesic area in square meters.
    #[must_use]
    pub const fn area_m2(&self) -> f64 {
        self.area_m2
    }

    /// Bounding box of the region.
    #[must_use]
    pub const fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// The region this was prepared from.
    #[must_use]
    pub const fn region(&self) -> &Region {
        &self.region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min_lng: f64, min_lat: f64, size: f64) -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(min_lng, min_lat),
            GeoPoint::new(min_lng + size, min_lat),
            GeoPoint::new(min_lng + size, min_lat + size),
            GeoPoint::new(min_lng, min_lat + size),
            GeoPoint::new(min_lng, min_lat),
        ]
    }

    #[test]
    fn multipolygon_area_is_sum_of_members() {
        let a = square(0.0, 0.0, 0.1);
        let b = square(1.0, 0.0, 0.1);
        let multi = Region::MultiPolygon {
            rings: vec![a.clone(), b.clone()],
        };
        let total = region_area_m2(&multi).unwrap();
        let sum = region_area_m2(&Region::Polygon { ring: a }).unwrap()
            + region_area_m2(&Region::Polygon { ring: b }).unwrap();
        assert!((total - sum).abs() < 1e-6);
    }

    #[test]
    fn multipolygon_contains_any_member() {
        let prepared = PreparedRegion::new(&Region::MultiPolygon {
            rings: vec![square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)],
        })
        .unwrap();
        assert!(prepared.contains(&GeoPoint::new(0.5, 0.5)));
        assert!(prepared.contains(&GeoPoint::new(5.5, 5.5)));
        assert!(!prepared.contains(&GeoPoint::new(3.0, 3.0)));

        let bounds = prepared.bounds();
        assert!((bounds.min_lng - 0.0).abs() < f64::EPSILON);
        assert!((bounds.max_lat - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_multipolygon_is_invalid() {
        assert_eq!(
            validate_region(&Region::MultiPolygon { rings: vec![] }),
            Err(GeometryError::EmptyMultiPolygon)
        );
    }

    #[test]
    fn circle_region_checks_radius_and_center() {
        assert!(
            validate_region(&Region::Circle {
                center: GeoPoint::new(0.0, 0.0),
                radius_meters: -1.0,
            })
            .is_err()
        );
        assert!(
            validate_region(&Region::Circle {
                center: GeoPoint::new(0.0, 100.0),
                radius_meters: 10.0,
            })
            .is_err()
        );
    }

    #[test]
    fn prepared_circle_matches_distance() {
        let center = GeoPoint::new(0.0, 0.0);
        let prepared = PreparedRegion::new(&Region::Circle {
            center,
            radius_meters: 200.0,
        })
        .unwrap();
        assert!(prepared.contains(&GeoPoint::new(0.001, 0.001)));
        assert!(!prepared.contains(&GeoPoint::new(0.01, 0.0)));
        assert!(prepared.bounds().contains(&GeoPoint::new(0.0017, 0.0017)));
        assert!((prepared.area_m2() - std::f64::consts::PI * 40_000.0).abs() < 1.0);
    }

    #[test]
    fn unclosed_polygon_region_is_rejected() {
        let mut ring = square(0.0, 0.0, 1.0);
        ring.pop();
        assert!(PreparedRegion::new(&Region::Polygon { ring }).is_err());
    }

    #[test]
    fn circle_across_antimeridian_contains_both_sides() {
        let prepared = PreparedRegion::new(&Region::Circle {
            center: GeoPoint::new(179.98, -17.0),
            radius_meters: 5_000.0,
        })
        .unwrap();
        assert!(prepared.contains(&GeoPoint::new(179.99, -17.0)));
        assert!(prepared.contains(&GeoPoint::new(-179.99, -17.0)));
        assert!(!prepared.contains(&GeoPoint::new(0.0, -17.0)));
    }

    #[test]
    fn polygon_across_antimeridian_is_invalid() {
        let region = Region::Polygon {
            ring: vec![
                GeoPoint::new(179.95, -17.05),
                GeoPoint::new(-179.95, -17.05),
                GeoPoint::new(-179.95, -16.95),
                GeoPoint::new(179.95, -16.95),
                GeoPoint::new(179.95, -17.05),
            ],
        };
        assert!(matches!(
            PreparedRegion::new(&region),
            Err(GeometryError::CrossesAntimeridian { .. })
        ));
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index over complaint locations.
//!
//! Builds an R-tree over point positions once per analysis and answers
//! "which points are within `r` meters of here" queries. The tree narrows
//! candidates to a degree envelope; the exact great-circle distance decides
//! membership, so results match a linear scan exactly.

use complaint_map_geography::distance::{haversine_distance, radius_envelope};
use complaint_map_geography_models::GeoPoint;
use rstar::{AABB, RTree, RTreeObject};

/// Degrees added around each query envelope so points on its edge are
/// never lost to rounding.
const ENVELOPE_PAD_DEG: f64 = 1e-9;

/// A point stored in the R-tree with its position in the input slice.
struct IndexedPoint {
    index: usize,
    location: GeoPoint,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.location.longitude, self.location.latitude])
    }
}

/// Read-only R-tree over a point snapshot.
///
/// Built fresh for each analysis run and never mutated afterwards.
pub struct PointIndex {
    tree: RTree<IndexedPoint>,
}

impl PointIndex {
    /// Bulk-loads an index over `points`. Results refer back to positions
    /// in this slice.
    #[must_use]
    pub fn build(points: &[GeoPoint]) -> Self {
        let entries = points
            .iter()
            .enumerate()
            .map(|(index, location)| IndexedPoint {
                index,
                location: *location,
            })
            .collect();
        let tree = RTree::bulk_load(entries);
        log::debug!("Built point index over {} points", tree.size());
        Self { tree }
    }

    /// Number of indexed points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns `true` if the index holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Input positions of every point within `radius_m` meters of
    /// `center`, in ascending order.
    #[must_use]
    pub fn indices_within(&self, center: &GeoPoint, radius_m: f64) -> Vec<usize> {
        let mut found: Vec<usize> = self
            .candidates(center, radius_m)
            .filter(|entry| haversine_distance(center, &entry.location) <= radius_m)
            .map(|entry| entry.index)
            .collect();
        found.sort_unstable();
        found
    }

    /// Number of points within `radius_m` meters of `center`.
    #[must_use]
    pub fn count_within(&self, center: &GeoPoint, radius_m: f64) -> usize {
        self.candidates(center, radius_m)
            .filter(|entry| haversine_distance(center, &entry.location) <= radius_m)
            .count()
    }

    fn candidates<'a>(
        &'a self,
        center: &GeoPoint,
        radius_m: f64,
    ) -> impl Iterator<Item = &'a IndexedPoint> + 'a {
        let bounds = radius_envelope(center, radius_m);
        let query_env = AABB::from_corners(
            [bounds.min_lng - ENVELOPE_PAD_DEG, bounds.min_lat - ENVELOPE_PAD_DEG],
            [bounds.max_lng + ENVELOPE_PAD_DEG, bounds.max_lat + ENVELOPE_PAD_DEG],
        );
        self.tree.locate_in_envelope(&query_env)
    }
}

//! Seeded point fixtures for tests.

use chrono::{DateTime, Utc};
use complaint_map_complaint_models::{ComplaintAttributes, ComplaintPoint, ComplaintStatus};
use complaint_map_geography_models::BoundingBox;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Bare complaint at a position, bypassing validation so tests can build
/// invalid points too.
pub fn point(id: &str, longitude: f64, latitude: f64) -> ComplaintPoint {
    ComplaintPoint {
        id: id.to_string(),
        longitude,
        latitude,
        attributes: ComplaintAttributes::default(),
    }
}

/// Complaint with every attribute set.
pub fn tagged(
    id: &str,
    longitude: f64,
    latitude: f64,
    status: ComplaintStatus,
    category: &str,
    priority: u32,
    created_at: Option<DateTime<Utc>>,
) -> ComplaintPoint {
    ComplaintPoint {
        id: id.to_string(),
        longitude,
        latitude,
        attributes: ComplaintAttributes {
            status: Some(status),
            category: Some(category.to_string()),
            priority: Some(priority),
            created_at,
        },
    }
}

/// `count` points spread uniformly over `bounds`.
pub fn uniform_points(count: usize, bounds: &BoundingBox, seed: u64) -> Vec<ComplaintPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let longitude = rng.gen_range(bounds.min_lng..bounds.max_lng);
            let latitude = rng.gen_range(bounds.min_lat..bounds.max_lat);
            point(&format!("p{i}"), longitude, latitude)
        })
        .collect()
}

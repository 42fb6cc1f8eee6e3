//! Complaints within walking distance of a reference location.

use chrono::Utc;
use complaint_map_analytics_models::{NearbyComplaint, NearbyConfig, NearbyParams, NearbyResult};
use complaint_map_complaint_models::ComplaintPoint;
use complaint_map_geography::{
    circle::validate_radius, distance::haversine_distance, validate_coordinate,
};
use complaint_map_geography_models::Region;

use crate::{AnalyticsError, screening::screen};

/// Finds every complaint within the search radius of `params.reference`,
/// nearest first. Equal distances keep input order.
///
/// # Errors
///
/// Returns [`AnalyticsError::InsufficientInput`] without a reference
/// location and [`AnalyticsError::Geometry`] for an invalid reference or
/// radius.
pub fn find_nearby(
    points: &[ComplaintPoint],
    params: &NearbyParams,
    config: &NearbyConfig,
) -> Result<NearbyResult, AnalyticsError> {
    let Some(reference) = params.reference else {
        return Err(AnalyticsError::InsufficientInput {
            message: "nearby search needs a reference location".to_string(),
        });
    };
    validate_coordinate(&reference)?;
    let radius_m = params.radius_m.unwrap_or(config.default_radius_m);
    validate_radius(radius_m)?;

    let screened = screen(points, "nearby search");
    let mut complaints: Vec<NearbyComplaint> = screened
        .valid
        .iter()
        .filter_map(|p| {
            let distance_m = haversine_distance(&reference, &p.location());
            (distance_m <= radius_m).then(|| NearbyComplaint {
                id: p.id.clone(),
                location: p.location(),
                distance_m,
            })
        })
        .collect();
    complaints.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));

    log::info!(
        "Found {} complaints within {radius_m:.0} m of ({}, {})",
        complaints.len(),
        reference.longitude,
        reference.latitude
    );

    Ok(NearbyResult {
        timestamp: Utc::now(),
        region: Region::Circle {
            center: reference,
            radius_meters: radius_m,
        },
        reference,
        radius_m,
        total_nearby: complaints.len(),
        complaints,
        display_limit: config.display_limit,
        points_excluded: screened.excluded,
    })
}

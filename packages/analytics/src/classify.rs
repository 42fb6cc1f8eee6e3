//! Point-in-region classification and attribute breakdowns.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use complaint_map_analytics_models::{AgeBreakdown, CategoryCount, ClassificationResult};
use complaint_map_complaint_models::ComplaintPoint;
use complaint_map_geography::PreparedRegion;
use complaint_map_geography_models::Region;

use crate::{
    AnalyticsError, prepare_region,
    screening::{Screened, screen},
};

/// Classifies `points` against `region`, aging complaints relative to now.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidRegion`] if the region fails its
/// invariants. An empty point set is not an error.
pub fn classify(
    region: &Region,
    points: &[ComplaintPoint],
) -> Result<ClassificationResult, AnalyticsError> {
    classify_at(region, points, Utc::now())
}

/// Classifies `points` against `region`, aging complaints relative to
/// `as_of`.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidRegion`] if the region fails its
/// invariants.
pub fn classify_at(
    region: &Region,
    points: &[ComplaintPoint],
    as_of: DateTime<Utc>,
) -> Result<ClassificationResult, AnalyticsError> {
    let prepared = prepare_region(region)?;
    let screened = screen(points, "classification");
    let result = classify_screened(&prepared, &screened, as_of);

    log::info!(
        "Classified {} points against {}: {} inside ({:.1}%), {:.2} per km²",
        result.total_considered,
        region.shape_name(),
        result.total_in_region,
        result.percent_of_total,
        result.density_per_km2
    );
    Ok(result)
}

/// Classification over points that have already been screened.
pub(crate) fn classify_screened(
    prepared: &PreparedRegion,
    screened: &Screened<'_>,
    as_of: DateTime<Utc>,
) -> ClassificationResult {
    let mut by_status = BTreeMap::new();
    let mut categories: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_priority = BTreeMap::new();
    let mut by_age = AgeBreakdown::default();
    let mut point_ids = Vec::new();

    for point in screened.valid.iter().filter(|p| prepared.contains(&p.location())) {
        *by_status.entry(point.status()).or_insert(0) += 1;
        *categories.entry(point.category()).or_insert(0) += 1;
        *by_priority.entry(point.priority()).or_insert(0) += 1;
        add_to_age_bucket(&mut by_age, point.created_at(), as_of);
        point_ids.push(point.id.clone());
    }

    let total_in_region = point_ids.len();
    let total_considered = screened.valid.len();
    let area_km2 = prepared.area_m2() / 1_000_000.0;

    #[allow(clippy::cast_precision_loss)]
    let density_per_km2 = if area_km2 > 0.0 {
        total_in_region as f64 / area_km2
    } else {
        0.0
    };
    #[allow(clippy::cast_precision_loss)]
    let percent_of_total = if total_considered == 0 {
        0.0
    } else {
        100.0 * total_in_region as f64 / total_considered as f64
    };

    ClassificationResult {
        timestamp: Utc::now(),
        region: prepared.region().clone(),
        total_in_region,
        total_considered,
        points_excluded: screened.excluded,
        by_status,
        by_category: sorted_categories(categories),
        by_priority,
        by_age,
        area_km2,
        density_per_km2,
        percent_of_total,
        point_ids,
    }
}

/// Descending count, ties in name order.
fn sorted_categories(counts: BTreeMap<&str, usize>) -> Vec<CategoryCount> {
    let mut sorted: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));
    sorted
}

fn add_to_age_bucket(
    ages: &mut AgeBreakdown,
    created_at: Option<DateTime<Utc>>,
    as_of: DateTime<Utc>,
) {
    let Some(created_at) = created_at else {
        ages.older += 1;
        return;
    };
    let age = as_of - created_at;
    if age <= TimeDelta::days(1) {
        ages.last_24h += 1;
    } else if age <= TimeDelta::days(7) {
        ages.last_7d += 1;
    } else if age <= TimeDelta::days(30) {
        ages.last_30d += 1;
    } else {
        ages.older += 1;
    }
}

//! Pairwise great-circle distances over a bounded sample.

use chrono::Utc;
use complaint_map_analytics_models::{DistanceConfig, DistanceParams, DistancePair, DistanceResult};
use complaint_map_complaint_models::ComplaintPoint;
use complaint_map_geography::distance::haversine_distance;

use crate::{AnalyticsError, prepare_region, screening::screen};

/// Computes every pairwise distance among the eligible points.
///
/// Point sets larger than `config.sample_cap` are thinned to every Nth
/// point, N = ⌈len / cap⌉, so the pair count stays bounded and the sample
/// still spans the whole input. With a region in `params`, only points
/// inside it are eligible.
///
/// # Errors
///
/// Returns [`AnalyticsError::InsufficientData`] with fewer than two
/// eligible points, [`AnalyticsError::InvalidRegion`] for an invalid
/// region and [`AnalyticsError::Config`] for a sample cap below two.
pub fn analyze_distances(
    points: &[ComplaintPoint],
    params: &DistanceParams,
    config: &DistanceConfig,
) -> Result<DistanceResult, AnalyticsError> {
    if config.sample_cap < 2 {
        return Err(AnalyticsError::Config {
            message: format!("distance.sample_cap must be at least 2, got {}", config.sample_cap),
        });
    }

    let prepared = params.region.as_ref().map(prepare_region).transpose()?;
    let screened = screen(points, "distance analysis");
    let eligible: Vec<&ComplaintPoint> = match &prepared {
        Some(region) => screened
            .valid
            .iter()
            .copied()
            .filter(|p| region.contains(&p.location()))
            .collect(),
        None => screened.valid.clone(),
    };

    let original_count = eligible.len();
    if original_count < 2 {
        return Err(AnalyticsError::InsufficientData {
            analysis: "distance analysis",
            required: 2,
            actual: original_count,
        });
    }

    let sample_step = original_count.div_ceil(config.sample_cap);
    let sample: Vec<&ComplaintPoint> = eligible.iter().copied().step_by(sample_step).collect();
    let sampled = original_count > config.sample_cap;
    log::debug!(
        "Distance analysis: {original_count} eligible points, step {sample_step}, {} sampled",
        sample.len()
    );

    let mut pairs = Vec::with_capacity(sample.len() * (sample.len() - 1) / 2);
    for (i, from) in sample.iter().enumerate() {
        for to in &sample[i + 1..] {
            pairs.push(DistancePair {
                from_id: from.id.clone(),
                to_id: to.id.clone(),
                from: from.location(),
                to: to.location(),
                distance_m: haversine_distance(&from.location(), &to.location()),
            });
        }
    }
    pairs.sort_by(|a, b| b.distance_m.total_cmp(&a.distance_m));

    let max_m = pairs.first().map_or(0.0, |p| p.distance_m);
    let min_m = pairs.last().map_or(0.0, |p| p.distance_m);
    #[allow(clippy::cast_precision_loss)]
    let average_m = pairs.iter().map(|p| p.distance_m).sum::<f64>() / pairs.len() as f64;
    let top_pairs = pairs[..pairs.len().min(config.top_pairs)].to_vec();

    log::info!(
        "Distance analysis over {} points ({} pairs): \
         avg {average_m:.0} m, min {min_m:.0} m, max {max_m:.0} m",
        sample.len(),
        pairs.len()
    );

    Ok(DistanceResult {
        timestamp: Utc::now(),
        region: params.region.clone(),
        average_m,
        min_m,
        max_m,
        pair_count: pairs.len(),
        pairs,
        top_pairs,
        sampled,
        original_count,
        sampled_count: sample.len(),
        sample_step,
        points_excluded: screened.excluded,
    })
}

#[cfg(test)]
mod tests {
    use complaint_map_geography_models::{BoundingBox, GeoPoint, Region};

    use super::*;
    use crate::fixtures::{point, uniform_points};

    #[test]
    fn two_points_average_min_max_agree() {
        let points = vec![point("a", 73.05, 33.68), point("b", 73.10, 33.72)];
        let result =
            analyze_distances(&points, &DistanceParams::default(), &DistanceConfig::default())
                .unwrap();
        let expected = haversine_distance(&points[0].location(), &points[1].location());
        assert!((result.average_m - expected).abs() < 1e-9);
        assert!((result.min_m - expected).abs() < 1e-9);
        assert!((result.max_m - expected).abs() < 1e-9);
        assert_eq!(result.pair_count, 1);
        assert!(!result.sampled);
        assert!(result.region.is_none());
    }

    #[test]
    fn large_sets_are_sampled_evenly() {
        let bounds =
            BoundingBox::from_corners(GeoPoint::new(73.0, 33.6), GeoPoint::new(73.1, 33.7));
        let points = uniform_points(150, &bounds, 17);
        let result =
            analyze_distances(&points, &DistanceParams::default(), &DistanceConfig::default())
                .unwrap();
        assert!(result.sampled);
        assert_eq!(result.original_count, 150);
        assert_eq!(result.sample_step, 2);
        assert_eq!(result.sampled_count, 75);
        let n = result.sampled_count;
        assert_eq!(result.pair_count, n * (n - 1) / 2);
        assert_eq!(result.pairs.len(), result.pair_count);
        // Every other point, starting with the first.
        assert!(result.pairs.iter().all(|p| {
            let index = |id: &str| id[1..].parse::<usize>().unwrap();
            index(&p.from_id) % 2 == 0 && index(&p.to_id) % 2 == 0
        }));
    }

    #[test]
    fn pairs_sorted_longest_first_with_top_three() {
        let points = vec![
            point("a", 0.0, 0.0),
            point("b", 0.01, 0.0),
            point("c", 0.03, 0.0),
            point("d", 0.06, 0.0),
        ];
        let result =
            analyze_distances(&points, &DistanceParams::default(), &DistanceConfig::default())
                .unwrap();
        assert_eq!(result.pairs.len(), 6);
        assert!(result.pairs.windows(2).all(|w| w[0].distance_m >= w[1].distance_m));
        assert_eq!(result.top_pairs.len(), 3);
        let longest = &result.top_pairs[0];
        assert_eq!((longest.from_id.as_str(), longest.to_id.as_str()), ("a", "d"));
        assert!((result.max_m - result.top_pairs[0].distance_m).abs() < f64::EPSILON);
        assert!(result.min_m <= result.average_m && result.average_m <= result.max_m);
    }

    #[test]
    fn too_few_points() {
        let points = vec![point("a", 0.0, 0.0), point("bad", 0.0, 100.0)];
        match analyze_distances(&points, &DistanceParams::default(), &DistanceConfig::default()) {
            Err(AnalyticsError::InsufficientData { required, actual, .. }) => {
                assert_eq!(required, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn region_limits_eligible_points() {
        let points = vec![
            point("in1", 0.1, 0.1),
            point("in2", 0.2, 0.2),
            point("out", 5.0, 5.0),
        ];
        let region = Region::Circle {
            center: GeoPoint::new(0.15, 0.15),
            radius_meters: 50_000.0,
        };
        let params = DistanceParams {
            region: Some(region.clone()),
        };
        let result = analyze_distances(&points, &params, &DistanceConfig::default()).unwrap();
        assert_eq!(result.original_count, 2);
        assert_eq!(result.region, Some(region));
    }

    #[test]
    fn rejects_tiny_sample_cap() {
        let config = DistanceConfig {
            sample_cap: 1,
            ..DistanceConfig::default()
        };
        assert!(matches!(
            analyze_distances(&[], &DistanceParams::default(), &config),
            Err(AnalyticsError::Config { .. })
        ));
    }
}

//! Buffer analysis: classify the points around a location or shape.

use chrono::Utc;
use complaint_map_analytics_models::{BufferConfig, BufferResult};
use complaint_map_complaint_models::ComplaintPoint;
use complaint_map_geography::{create_buffer_with_segments, effective_distance};
use complaint_map_geography_models::{BufferMode, BufferSource};

use crate::{AnalyticsError, classify::classify_screened, prepare_region, screening::screen};

/// Buffers `source` by `distance_m` and classifies the points inside.
///
/// # Errors
///
/// Returns [`AnalyticsError::Geometry`] for an invalid source or distance.
pub fn analyze_buffer(
    source: &BufferSource,
    distance_m: f64,
    mode: BufferMode,
    points: &[ComplaintPoint],
    config: &BufferConfig,
) -> Result<BufferResult, AnalyticsError> {
    let region = create_buffer_with_segments(source, distance_m, mode, config.circle_segments)?;
    let prepared = prepare_region(&region)?;
    let screened = screen(points, "buffer analysis");
    let now = Utc::now();
    let stats = classify_screened(&prepared, &screened, now);

    let effective_distance_m = effective_distance(source, distance_m, mode);
    log::info!(
        "Buffer of {effective_distance_m:.0}m around {}: {} of {} points inside",
        region.shape_name(),
        stats.total_in_region,
        stats.total_considered
    );

    Ok(BufferResult {
        timestamp: now,
        region,
        buffer_distance_m: distance_m,
        effective_distance_m,
        mode,
        origin: source.origin(),
        stats,
    })
}

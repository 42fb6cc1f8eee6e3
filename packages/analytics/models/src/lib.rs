#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Input and output types for complaint analyses.
//!
//! Parameter structs carry everything an analysis needs besides the point
//! snapshot. Result structs are built once per call and never updated;
//! each records when it was computed and which region it describes.

pub mod config;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use complaint_map_complaint_models::ComplaintStatus;
use complaint_map_geography_models::{BoundingBox, BufferMode, GeoPoint, Region};
use serde::{Deserialize, Serialize};

pub use config::{AnalysisConfig, BufferConfig, DistanceConfig, HotspotConfig, NearbyConfig};

/// Parameters for density grid and hotspot detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotParams {
    /// Drawn region whose bounds the grid covers.
    #[serde(default)]
    pub region: Option<Region>,
    /// Map viewport, used when no region is drawn.
    #[serde(default)]
    pub viewport: Option<BoundingBox>,
    /// Location used to break ties between equally dense hotspots.
    #[serde(default)]
    pub reference: Option<GeoPoint>,
}

/// Parameters for pairwise distance analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceParams {
    /// Restricts the analysis to points inside this region.
    #[serde(default)]
    pub region: Option<Region>,
}

/// Parameters for a nearby search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyParams {
    /// Search center. Required.
    #[serde(default)]
    pub reference: Option<GeoPoint>,
    /// Search radius; the configured default applies when absent.
    #[serde(default)]
    pub radius_m: Option<f64>,
}

/// Number of complaints in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Category name.
    pub category: String,
    /// Complaints in the category.
    pub count: usize,
}

/// Complaint counts by age relative to the analysis instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBreakdown {
    /// Created within the last day (including future timestamps).
    pub last_24h: usize,
    /// Older than a day, within the last week.
    pub last_7d: usize,
    /// Older than a week, within the last 30 days.
    pub last_30d: usize,
    /// Older than 30 days, or without a creation time.
    pub older: usize,
}

impl AgeBreakdown {
    /// Sum over all buckets.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.last_24h + self.last_7d + self.last_30d + self.older
    }
}

/// Counts and breakdowns for the points inside one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    /// When the analysis ran.
    pub timestamp: DateTime<Utc>,
    /// Region the points were classified against.
    pub region: Region,
    /// Valid points inside the region.
    pub total_in_region: usize,
    /// Valid points examined.
    pub total_considered: usize,
    /// Invalid points left out of every count.
    pub points_excluded: usize,
    /// Inside points per status.
    pub by_status: BTreeMap<ComplaintStatus, usize>,
    /// Inside points per category, by descending count then name.
    pub by_category: Vec<CategoryCount>,
    /// Inside points per priority.
    pub by_priority: BTreeMap<u32, usize>,
    /// Inside points per age bucket.
    pub by_age: AgeBreakdown,
    /// Region area in km².
    pub area_km2: f64,
    /// Inside points per km².
    pub density_per_km2: f64,
    /// Share of valid points inside the region, 0–100.
    pub percent_of_total: f64,
    /// Identifiers of the inside points, in input order.
    pub point_ids: Vec<String>,
}

/// A buffer region and the classification of points inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferResult {
    /// When the analysis ran.
    pub timestamp: DateTime<Utc>,
    /// The buffer region.
    pub region: Region,
    /// Requested buffer distance in meters.
    pub buffer_distance_m: f64,
    /// Distance after priority weighting.
    pub effective_distance_m: f64,
    /// Weighting mode.
    pub mode: BufferMode,
    /// Buffer center for point sources.
    pub origin: Option<GeoPoint>,
    /// Classification of the points inside the buffer.
    pub stats: ClassificationResult,
}

/// One ranked density peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// 1-based rank.
    pub rank: usize,
    /// Grid node position.
    pub center: GeoPoint,
    /// Points within the search radius of the node.
    pub count: usize,
    /// `count / total_points_considered`.
    pub intensity: f64,
    /// Distance from the reference location, when one was given.
    pub distance_from_reference_m: Option<f64>,
}

/// Density grid summary and the full ranked hotspot list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityResult {
    /// When the analysis ran.
    pub timestamp: DateTime<Utc>,
    /// Region the grid was laid over, if one was drawn.
    pub region: Option<Region>,
    /// Extent covered by the grid.
    pub bounds: BoundingBox,
    /// Valid points used for counting.
    pub total_points_considered: usize,
    /// Invalid points left out.
    pub points_excluded: usize,
    /// Highest node count.
    pub max_density: usize,
    /// Mean count over non-empty nodes.
    pub average_density: f64,
    /// Grid spacing in km.
    pub cell_size_km: f64,
    /// Node search radius in meters.
    pub search_radius_m: f64,
    /// Node columns.
    pub grid_columns: usize,
    /// Node rows.
    pub grid_rows: usize,
    /// Nodes with at least one point in range.
    pub nonzero_cells: usize,
    /// Threshold fraction applied.
    pub threshold_fraction: f64,
    /// Display limit for [`DensityResult::top_hotspots`].
    pub max_hotspots: usize,
    /// Every hotspot candidate, ranked.
    pub hotspots: Vec<Hotspot>,
    /// Tie-break location, if given.
    pub reference: Option<GeoPoint>,
    /// Whether neighbour counts came from the R-tree index.
    pub used_spatial_index: bool,
}

impl DensityResult {
    /// The highest-ranked hotspots, up to `max_hotspots`.
    #[must_use]
    pub fn top_hotspots(&self) -> &[Hotspot] {
        &self.hotspots[..self.hotspots.len().min(self.max_hotspots)]
    }
}

/// Distance between two complaints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistancePair {
    /// First complaint id.
    pub from_id: String,
    /// Second complaint id.
    pub to_id: String,
    /// First complaint location.
    pub from: GeoPoint,
    /// Second complaint location.
    pub to: GeoPoint,
    /// Great-circle distance in meters.
    pub distance_m: f64,
}

/// Pairwise distance statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceResult {
    /// When the analysis ran.
    pub timestamp: DateTime<Utc>,
    /// Region the points were restricted to, if any.
    pub region: Option<Region>,
    /// Mean pair distance in meters.
    pub average_m: f64,
    /// Shortest pair distance in meters.
    pub min_m: f64,
    /// Longest pair distance in meters.
    pub max_m: f64,
    /// Every pair, longest first.
    pub pairs: Vec<DistancePair>,
    /// The longest pairs for display.
    pub top_pairs: Vec<DistancePair>,
    /// Whether the point set was downsampled.
    pub sampled: bool,
    /// Points eligible before sampling.
    pub original_count: usize,
    /// Points actually paired.
    pub sampled_count: usize,
    /// Every `sample_step`-th point was kept.
    pub sample_step: usize,
    /// Number of pairs, `C(sampled_count, 2)`.
    pub pair_count: usize,
    /// Invalid points left out.
    pub points_excluded: usize,
}

/// A complaint found by a nearby search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyComplaint {
    /// Complaint id.
    pub id: String,
    /// Complaint location.
    pub location: GeoPoint,
    /// Distance from the reference in meters.
    pub distance_m: f64,
}

/// Complaints within a radius of a reference location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyResult {
    /// When the analysis ran.
    pub timestamp: DateTime<Utc>,
    /// The search circle.
    pub region: Region,
    /// Search center.
    pub reference: GeoPoint,
    /// Search radius in meters.
    pub radius_m: f64,
    /// Complaints found.
    pub total_nearby: usize,
    /// Every complaint found, nearest first.
    pub complaints: Vec<NearbyComplaint>,
    /// Number of entries a display should show.
    pub display_limit: usize,
    /// Invalid points left out.
    pub points_excluded: usize,
}

impl NearbyResult {
    /// The nearest complaints, up to `display_limit`.
    #[must_use]
    pub fn displayed(&self) -> &[NearbyComplaint] {
        &self.complaints[..self.complaints.len().min(self.display_limit)]
    }
}

/// Any analysis outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AnalysisResult {
    /// Region classification.
    Classification(ClassificationResult),
    /// Buffer analysis.
    Buffer(BufferResult),
    /// Density grid and hotspots.
    Density(DensityResult),
    /// Pairwise distances.
    Distance(DistanceResult),
    /// Nearby search.
    Nearby(NearbyResult),
}

impl AnalysisResult {
    /// When the analysis ran.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Classification(r) => r.timestamp,
            Self::Buffer(r) => r.timestamp,
            Self::Density(r) => r.timestamp,
            Self::Distance(r) => r.timestamp,
            Self::Nearby(r) => r.timestamp,
        }
    }

    /// Region the analysis ran against, `None` for global analyses.
    #[must_use]
    pub const fn region(&self) -> Option<&Region> {
        match self {
            Self::Classification(r) => Some(&r.region),
            Self::Buffer(r) => Some(&r.region),
            Self::Nearby(r) => Some(&r.region),
            Self::Density(r) => r.region.as_ref(),
            Self::Distance(r) => r.region.as_ref(),
        }
    }

    /// Invalid points excluded from the analysis.
    #[must_use]
    pub const fn points_excluded(&self) -> usize {
        match self {
            Self::Classification(r) => r.points_excluded,
            Self::Buffer(r) => r.stats.points_excluded,
            Self::Density(r) => r.points_excluded,
            Self::Distance(r) => r.points_excluded,
            Self::Nearby(r) => r.points_excluded,
        }
    }
}

/// A labelled value in a report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    /// Row label.
    pub label: String,
    /// Formatted value.
    pub value: String,
}

/// A titled group of report rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSection {
    /// Section heading.
    pub title: String,
    /// Rows in display order.
    pub rows: Vec<ReportRow>,
}

/// Display-ready summary of an analysis result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Report heading.
    pub title: String,
    /// One-line summaries.
    pub summary: Vec<String>,
    /// Detailed sections.
    pub sections: Vec<ReportSection>,
    /// Timestamp of the underlying analysis.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_density(hotspots: usize, max_hotspots: usize) -> DensityResult {
        DensityResult {
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            region: None,
            bounds: BoundingBox::from_corners(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)),
            total_points_considered: 0,
            points_excluded: 0,
            max_density: 0,
            average_density: 0.0,
            cell_size_km: 1.0,
            search_radius_m: 1_200.0,
            grid_columns: 1,
            grid_rows: 1,
            nonzero_cells: 0,
            threshold_fraction: 0.6,
            max_hotspots,
            hotspots: (1..=hotspots)
                .map(|rank| Hotspot {
                    rank,
                    center: GeoPoint::new(0.5, 0.5),
                    count: 1,
                    intensity: 0.0,
                    distance_from_reference_m: None,
                })
                .collect(),
            reference: None,
            used_spatial_index: false,
        }
    }

    #[test]
    fn top_hotspots_truncates_but_keeps_full_list() {
        let result = empty_density(15, 10);
        assert_eq!(result.top_hotspots().len(), 10);
        assert_eq!(result.hotspots.len(), 15);
        assert_eq!(empty_density(4, 10).top_hotspots().len(), 4);
    }

    #[test]
    fn analysis_result_is_tagged_by_type() {
        let result = AnalysisResult::Density(empty_density(0, 10));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "density");
        assert!(json["region"].is_null());
        assert_eq!(json["maxHotspots"], 10);
        let back: AnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
        assert!(back.region().is_none());
    }

    #[test]
    fn config_defaults() {
        let config = AnalysisConfig::default();
        assert!((config.hotspot.threshold_fraction - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.hotspot.max_hotspots, 10);
        assert_eq!(config.hotspot.index_threshold, 2_000);
        assert_eq!(config.distance.sample_cap, 100);
        assert_eq!(config.distance.top_pairs, 3);
        assert_eq!(config.nearby.display_limit, 20);
        assert_eq!(config.buffer.circle_segments, 64);
    }

    #[test]
    fn age_breakdown_total() {
        let ages = AgeBreakdown {
            last_24h: 1,
            last_7d: 2,
            last_30d: 3,
            older: 4,
        };
        assert_eq!(ages.total(), 10);
    }
}

//! Tunable analysis parameters.
//!
//! Every field has a serde default, so a partial TOML document (or an
//! empty one) deserializes into a complete configuration. Keys are
//! `snake_case`, matching the field names.

use serde::{Deserialize, Serialize};

/// All analysis settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Density grid and hotspot ranking.
    #[serde(default)]
    pub hotspot: HotspotConfig,
    /// Pairwise distance sampling.
    #[serde(default)]
    pub distance: DistanceConfig,
    /// Nearby search.
    #[serde(default)]
    pub nearby: NearbyConfig,
    /// Buffer construction.
    #[serde(default)]
    pub buffer: BufferConfig,
}

/// Density grid and hotspot settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotConfig {
    /// Fraction of the maximum node count a node needs to be a hotspot.
    #[serde(default = "default_threshold_fraction")]
    pub threshold_fraction: f64,
    /// Number of hotspots returned by `DensityResult::top_hotspots`.
    #[serde(default = "default_max_hotspots")]
    pub max_hotspots: usize,
    /// Search radius as a multiple of the cell size.
    #[serde(default = "default_search_radius_factor")]
    pub search_radius_factor: f64,
    /// Point count above which neighbour counts use the R-tree index.
    #[serde(default = "default_index_threshold")]
    pub index_threshold: usize,
    /// Upper bound on grid nodes; the cell size grows to respect it.
    #[serde(default = "default_max_grid_nodes")]
    pub max_grid_nodes: usize,
    /// Fewest valid points the grid will run on.
    #[serde(default = "default_min_points")]
    pub min_points: usize,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            threshold_fraction: default_threshold_fraction(),
            max_hotspots: default_max_hotspots(),
            search_radius_factor: default_search_radius_factor(),
            index_threshold: default_index_threshold(),
            max_grid_nodes: default_max_grid_nodes(),
            min_points: default_min_points(),
        }
    }
}

/// Pairwise distance settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceConfig {
    /// Largest point set analyzed without sampling.
    #[serde(default = "default_sample_cap")]
    pub sample_cap: usize,
    /// Number of longest pairs highlighted for display.
    #[serde(default = "default_top_pairs")]
    pub top_pairs: usize,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            sample_cap: default_sample_cap(),
            top_pairs: default_top_pairs(),
        }
    }
}

/// Nearby search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyConfig {
    /// Radius used when the caller gives none.
    #[serde(default = "default_nearby_radius_m")]
    pub default_radius_m: f64,
    /// Number of entries a display shows.
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
}

impl Default for NearbyConfig {
    fn default() -> Self {
        Self {
            default_radius_m: default_nearby_radius_m(),
            display_limit: default_display_limit(),
        }
    }
}

/// Buffer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Segments used to approximate round buffer edges.
    #[serde(default = "default_circle_segments")]
    pub circle_segments: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            circle_segments: default_circle_segments(),
        }
    }
}

const fn default_threshold_fraction() -> f64 {
    0.6
}

const fn default_max_hotspots() -> usize {
    10
}

const fn default_search_radius_factor() -> f64 {
    1.2
}

const fn default_index_threshold() -> usize {
    2_000
}

const fn default_max_grid_nodes() -> usize {
    250_000
}

const fn default_min_points() -> usize {
    3
}

const fn default_sample_cap() -> usize {
    100
}

const fn default_top_pairs() -> usize {
    3
}

const fn default_nearby_radius_m() -> f64 {
    1_000.0
}

const fn default_display_limit() -> usize {
    20
}

const fn default_circle_segments() -> usize {
    64
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analyses over a snapshot of complaint points.
//!
//! Each public function is one analysis. It takes the point slice and
//! immutable parameters, and returns a freshly built result or an error,
//! never both. Nothing is cached between calls, so analyses can run side
//! by side on the same snapshot from different threads.
//!
//! Points with invalid coordinates are screened out up front and counted
//! in each result's `points_excluded`.

pub mod buffer;
pub mod classify;
pub mod config;
pub mod distance;
pub mod hotspot;
pub mod nearby;
pub mod report;
pub mod screening;

#[cfg(test)]
mod fixtures;

pub use buffer::analyze_buffer;
pub use classify::{classify, classify_at};
pub use config::{parse_config_toml, validate_config};
pub use distance::analyze_distances;
pub use hotspot::detect_hotspots;
pub use nearby::find_nearby;
pub use report::build_report;

use complaint_map_complaint_models::InvalidPointError;
use complaint_map_geography::{GeometryError, PreparedRegion, RegionError};
use complaint_map_geography_models::Region;
use thiserror::Error;

/// Errors that can occur during an analysis.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Malformed coordinates, shapes or distances in the request.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The region handed to the analysis fails its invariants.
    #[error("Invalid region: {message}")]
    InvalidRegion {
        /// Description of what went wrong.
        message: String,
    },

    /// Required input such as a region or reference location is missing.
    #[error("Insufficient input: {message}")]
    InsufficientInput {
        /// Description of what is missing.
        message: String,
    },

    /// Too few valid points for the analysis.
    #[error("{analysis} needs at least {required} valid points, got {actual}")]
    InsufficientData {
        /// Analysis that was attempted.
        analysis: &'static str,
        /// Minimum number of points.
        required: usize,
        /// Number of valid points available.
        actual: usize,
    },

    /// A point failed coordinate validation.
    #[error(transparent)]
    InvalidPoint(#[from] InvalidPointError),

    /// Configuration could not be parsed or holds invalid values.
    #[error("Config error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}

impl From<RegionError> for AnalyticsError {
    fn from(value: RegionError) -> Self {
        match value {
            RegionError::Geometry(e) => Self::Geometry(e),
            RegionError::InsufficientInput { message } => Self::InsufficientInput { message },
        }
    }
}

/// Validates a caller-supplied region and prepares it for containment.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidRegion`] if the region fails its
/// invariants.
pub fn prepare_region(region: &Region) -> Result<PreparedRegion, AnalyticsError> {
    PreparedRegion::new(region).map_err(|e| AnalyticsError::InvalidRegion {
        message: format!("{} region: {e}", region.shape_name()),
    })
}

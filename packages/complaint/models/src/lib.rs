#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geolocated complaint records and their attribute schema.
//!
//! Every data source normalizes its records into [`ComplaintPoint`] once,
//! at ingestion. Attribute defaults are centralized here so every analysis
//! treats a missing status, category or priority the same way.

use chrono::{DateTime, Utc};
use complaint_map_geography_models::GeoPoint;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Category assigned to complaints that carry none.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Priority assigned to complaints that carry none.
pub const DEFAULT_PRIORITY: u32 = 1;

/// Workflow status of a complaint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComplaintStatus {
    /// Reported, not yet picked up.
    Open,
    /// Assigned and being worked on.
    InProgress,
    /// Fixed, awaiting closure.
    Resolved,
    /// Closed out.
    Closed,
    /// Missing or unrecognized status.
    #[default]
    Unknown,
}

impl ComplaintStatus {
    /// Parses a status string from a data source.
    ///
    /// Matching ignores case and accepts spaces or dashes in place of the
    /// underscore (`"In Progress"`, `"in-progress"`). Anything unrecognized
    /// maps to [`ComplaintStatus::Unknown`].
    #[must_use]
    pub fn from_source(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase().replace([' ', '-'], "_");
        normalized.parse().unwrap_or(Self::Unknown)
    }

    /// Human-readable label (`in_progress` becomes `"In Progress"`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
            Self::Unknown => "Unknown",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Open,
            Self::InProgress,
            Self::Resolved,
            Self::Closed,
            Self::Unknown,
        ]
    }
}

/// Tagged attributes of a complaint. Every field is optional in the raw
/// data; use the accessors on [`ComplaintPoint`] to read them with defaults
/// applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintAttributes {
    /// Workflow status.
    #[serde(default)]
    pub status: Option<ComplaintStatus>,
    /// Category name (free text).
    #[serde(default)]
    pub category: Option<String>,
    /// Priority, 1 being the lowest.
    #[serde(default)]
    pub priority: Option<u32>,
    /// Creation time of the complaint.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A single geolocated complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintPoint {
    /// Opaque identifier.
    pub id: String,
    /// WGS84 longitude in degrees.
    pub longitude: f64,
    /// WGS84 latitude in degrees.
    pub latitude: f64,
    /// Tagged attributes.
    #[serde(default)]
    pub attributes: ComplaintAttributes,
}

impl ComplaintPoint {
    /// Creates a complaint, rejecting coordinates outside WGS84 ranges.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPointError`] if either coordinate is non-finite or
    /// out of range. Coordinates are never clamped.
    pub fn new(
        id: impl Into<String>,
        longitude: f64,
        latitude: f64,
        attributes: ComplaintAttributes,
    ) -> Result<Self, InvalidPointError> {
        let point = Self {
            id: id.into(),
            longitude,
            latitude,
            attributes,
        };
        point.validate()?;
        Ok(point)
    }

    /// Checks the coordinate invariant.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPointError`] if the coordinate is not a valid
    /// WGS84 position.
    pub fn validate(&self) -> Result<(), InvalidPointError> {
        if self.location().is_valid() {
            Ok(())
        } else {
            Err(InvalidPointError {
                id: self.id.clone(),
                longitude: self.longitude,
                latitude: self.latitude,
            })
        }
    }

    /// The complaint position.
    #[must_use]
    pub const fn location(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }

    /// Status, defaulting to [`ComplaintStatus::Unknown`].
    #[must_use]
    pub fn status(&self) -> ComplaintStatus {
        self.attributes.status.unwrap_or_default()
    }

    /// Category, defaulting to [`DEFAULT_CATEGORY`] when missing or blank.
    #[must_use]
    pub fn category(&self) -> &str {
        match self.attributes.category.as_deref() {
            Some(category) if !category.trim().is_empty() => category,
            _ => DEFAULT_CATEGORY,
        }
    }

    /// Priority, defaulting to [`DEFAULT_PRIORITY`] when missing or zero.
    #[must_use]
    pub fn priority(&self) -> u32 {
        match self.attributes.priority {
            Some(priority) if priority > 0 => priority,
            _ => DEFAULT_PRIORITY,
        }
    }

    /// Creation time, if known.
    #[must_use]
    pub const fn created_at(&self) -> Option<DateTime<Utc>> {
        self.attributes.created_at
    }
}

/// Error returned when a complaint's coordinate is not a valid WGS84
/// position.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidPointError {
    /// Identifier of the offending complaint.
    pub id: String,
    /// The rejected longitude.
    pub longitude: f64,
    /// The rejected latitude.
    pub latitude: f64,
}

impl std::fmt::Display for InvalidPointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid coordinate for complaint {}: ({}, {}) is outside WGS84 range",
            self.id, self.longitude, self.latitude
        )
    }
}

impl std::error::Error for InvalidPointError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_coordinates() {
        let attrs = ComplaintAttributes::default();
        assert!(ComplaintPoint::new("a", 73.05, 33.6, attrs.clone()).is_ok());
        assert!(ComplaintPoint::new("b", 181.0, 33.6, attrs.clone()).is_err());
        assert!(ComplaintPoint::new("c", 73.05, -90.5, attrs.clone()).is_err());
        let err = ComplaintPoint::new("d", f64::INFINITY, 0.0, attrs).unwrap_err();
        assert_eq!(err.id, "d");
    }

    #[test]
    fn attribute_defaults() {
        let point = ComplaintPoint::new("a", 0.0, 0.0, ComplaintAttributes::default()).unwrap();
        assert_eq!(point.status(), ComplaintStatus::Unknown);
        assert_eq!(point.category(), DEFAULT_CATEGORY);
        assert_eq!(point.priority(), DEFAULT_PRIORITY);
        assert!(point.created_at().is_none());

        let blank = ComplaintAttributes {
            category: Some("  ".to_string()),
            priority: Some(0),
            ..ComplaintAttributes::default()
        };
        let point = ComplaintPoint::new("b", 0.0, 0.0, blank).unwrap();
        assert_eq!(point.category(), DEFAULT_CATEGORY);
        assert_eq!(point.priority(), DEFAULT_PRIORITY);
    }

    #[test]
    fn status_from_source_strings() {
        assert_eq!(ComplaintStatus::from_source("open"), ComplaintStatus::Open);
        assert_eq!(
            ComplaintStatus::from_source("In Progress"),
            ComplaintStatus::InProgress
        );
        assert_eq!(
            ComplaintStatus::from_source("in-progress"),
            ComplaintStatus::InProgress
        );
        assert_eq!(
            ComplaintStatus::from_source("escalated"),
            ComplaintStatus::Unknown
        );
    }

    #[test]
    fn status_display_matches_serde() {
        for status in ComplaintStatus::all() {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
        assert_eq!(ComplaintStatus::InProgress.label(), "In Progress");
    }
}

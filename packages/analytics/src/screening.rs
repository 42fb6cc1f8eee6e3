//! Coordinate screening applied before every analysis.

use complaint_map_complaint_models::ComplaintPoint;

use crate::AnalyticsError;

/// Points that passed screening, plus how many did not.
pub struct Screened<'a> {
    /// Valid points in input order.
    pub valid: Vec<&'a ComplaintPoint>,
    /// Points dropped for invalid coordinates.
    pub excluded: usize,
}

/// Splits `points` into valid ones and an excluded count, logging a
/// warning when anything is dropped.
#[must_use]
pub fn screen<'a>(points: &'a [ComplaintPoint], analysis: &str) -> Screened<'a> {
    let mut valid = Vec::with_capacity(points.len());
    let mut first_invalid: Option<&str> = None;
    let mut excluded = 0;

    for point in points {
        if point.validate().is_ok() {
            valid.push(point);
        } else {
            excluded += 1;
            first_invalid.get_or_insert(point.id.as_str());
        }
    }

    if let Some(id) = first_invalid {
        log::warn!(
            "{analysis}: excluded {excluded} of {} points with invalid coordinates (first: {id})",
            points.len()
        );
    }

    Screened { valid, excluded }
}

/// Strict check for callers that would rather reject a snapshot than
/// analyze part of it.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidPoint`] for the first invalid point.
pub fn validate_points(points: &[ComplaintPoint]) -> Result<(), AnalyticsError> {
    points.iter().try_for_each(|p| p.validate().map_err(Into::into))
}

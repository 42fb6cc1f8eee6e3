//! Loading and validating [`AnalysisConfig`] from TOML.

use complaint_map_analytics_models::AnalysisConfig;

use crate::AnalyticsError;

/// Parses an [`AnalysisConfig`] from a TOML string and validates it.
/// Missing tables and keys take their defaults.
///
/// ```toml
/// [hotspot]
/// threshold_fraction = 0.5
///
/// [distance]
/// sample_cap = 200
/// ```
///
/// # Errors
///
/// Returns [`AnalyticsError::Config`] if the TOML is malformed or a value
/// is out of range.
pub fn parse_config_toml(toml_str: &str) -> Result<AnalysisConfig, AnalyticsError> {
    let config: AnalysisConfig = toml::de::from_str(toml_str).map_err(|e| AnalyticsError::Config {
        message: e.to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks that every setting is within its usable range.
///
/// # Errors
///
/// Returns [`AnalyticsError::Config`] naming the first bad setting.
pub fn validate_config(config: &AnalysisConfig) -> Result<(), AnalyticsError> {
    let hotspot = &config.hotspot;
    if !(hotspot.threshold_fraction > 0.0 && hotspot.threshold_fraction <= 1.0) {
        return Err(invalid(format!(
            "hotspot.threshold_fraction must be in (0, 1], got {}",
            hotspot.threshold_fraction
        )));
    }
    if !(hotspot.search_radius_factor.is_finite() && hotspot.search_radius_factor > 0.0) {
        return Err(invalid(format!(
            "hotspot.search_radius_factor must be positive, got {}",
            hotspot.search_radius_factor
        )));
    }
    if hotspot.max_grid_nodes == 0 {
        return Err(invalid("hotspot.max_grid_nodes must be positive".to_string()));
    }
    if hotspot.min_points == 0 {
        return Err(invalid("hotspot.min_points must be positive".to_string()));
    }
    if config.distance.sample_cap < 2 {
        return Err(invalid(format!(
            "distance.sample_cap must be at least 2, got {}",
            config.distance.sample_cap
        )));
    }
    let radius = config.nearby.default_radius_m;
    if !(radius.is_finite() && radius > 0.0) {
        return Err(invalid(format!(
            "nearby.default_radius_m must be positive, got {radius}"
        )));
    }
    if config.buffer.circle_segments < 8 {
        return Err(invalid(format!(
            "buffer.circle_segments must be at least 8, got {}",
            config.buffer.circle_segments
        )));
    }

    log::debug!("Validated analysis config: {config:?}");
    Ok(())
}

const fn invalid(message: String) -> AnalyticsError {
    AnalyticsError::Config { message }
}

//! Semantic validation of analysis parameters.

use thiserror::Error;

use crate::params::AnalysisParams;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Parameter validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),
}

impl ValidationError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue { field: field.to_string(), message: message.into() }
    }
}

/// Validate analysis parameters semantically.
pub fn validate_params(params: &AnalysisParams) -> ValidationResult<()> {
    if params.baseline_pre_days == 0 {
        return Err(ValidationError::invalid("baseline_pre_days", "must be at least 1"));
    }
    if params.baseline_exclude_days > params.baseline_pre_days {
        return Err(ValidationError::SemanticError(format!(
            "baseline window is empty: exclude_days ({}) exceeds pre_days ({})",
            params.baseline_exclude_days, params.baseline_pre_days,
        )));
    }
    if params.min_baseline_sample_days == 0 {
        return Err(ValidationError::invalid("min_baseline_sample_days", "must be at least 1"));
    }

    if params.decay_window_days == 0 {
        return Err(ValidationError::invalid("decay_window_days", "must be at least 1"));
    }
    if params.decay_roll_days == 0 {
        return Err(ValidationError::invalid("decay_roll_days", "must be at least 1"));
    }
    if !params.decay_tolerance.is_finite() || params.decay_tolerance < 0.0 {
        return Err(ValidationError::invalid(
            "decay_tolerance",
            format!("must be a non-negative finite number, got {}", params.decay_tolerance),
        ));
    }

    if !params.baseline_floor.is_finite() || params.baseline_floor < 0.0 {
        return Err(ValidationError::invalid(
            "baseline_floor",
            format!("must be a non-negative finite number, got {}", params.baseline_floor),
        ));
    }

    if params.discount_tier_cuts.is_empty() {
        return Err(ValidationError::invalid("discount_tier_cuts", "must not be empty"));
    }
    let mut prev = 0.0;
    for cut in &params.discount_tier_cuts {
        if !cut.is_finite() || *cut <= prev || *cut >= 100.0 {
            return Err(ValidationError::invalid(
                "discount_tier_cuts",
                format!("cut points must be strictly increasing within (0, 100), got {cut}"),
            ));
        }
        prev = *cut;
    }

    if params.popularity_quantiles < 2 {
        return Err(ValidationError::invalid("popularity_quantiles", "must be at least 2"));
    }
    if params.cadence_lookback_days == 0 {
        return Err(ValidationError::invalid("cadence_lookback_days", "must be at least 1"));
    }

    if params.min_segment_n == 0 {
        return Err(ValidationError::invalid("min_segment_n", "must be at least 1"));
    }
    if params.min_tier_n == 0 {
        return Err(ValidationError::invalid("min_tier_n", "must be at least 1"));
    }
    if !params.pre_bias_threshold_pct.is_finite() || params.pre_bias_threshold_pct < 0.0 {
        return Err(ValidationError::invalid(
            "pre_bias_threshold_pct",
            "must be a non-negative finite number",
        ));
    }

    if !(0.0..=100.0).contains(&params.wishlist_notify_discount_pct) {
        return Err(ValidationError::invalid(
            "wishlist_notify_discount_pct",
            format!("must be in [0, 100], got {}", params.wishlist_notify_discount_pct),
        ));
    }

    for window in &params.seasonal_windows {
        let field = format!("seasonal_windows.{}", window.name);
        for (month, day) in [
            (window.start_month, window.start_day),
            (window.end_month, window.end_day),
        ] {
            if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
                return Err(ValidationError::invalid(
                    &field,
                    format!("invalid month/day: {month}/{day}"),
                ));
            }
        }
    }

    Ok(())
}

//! Pre-event baseline computation.
//!
//! The baseline window is `[start - pre_days, start - exclude_days]`; the
//! day(s) immediately before the episode are excluded to keep pre-sale
//! anticipation effects out of the reference value. The baseline is always a
//! median, never a mean, so a single unrelated spike day cannot drag it.

use chrono::{Duration, NaiveDate};
use pl_config::AnalysisParams;

use crate::panel::ProductSeries;

/// Baseline estimate for one episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineEstimate {
    /// Median engagement over the window; `None` when no day was observed.
    pub value: Option<f64>,
    /// Count of non-null observations inside the window.
    pub sample_days: usize,
}

impl BaselineEstimate {
    /// Whether the window held enough evidence for the episode to be kept.
    pub fn is_sufficient(&self, min_sample_days: usize) -> bool {
        self.value.is_some() && self.sample_days >= min_sample_days
    }
}

/// Compute the baseline for an episode starting at `start_date`.
pub fn compute_baseline(
    series: &ProductSeries,
    start_date: NaiveDate,
    params: &AnalysisParams,
) -> BaselineEstimate {
    let from = start_date - Duration::days(i64::from(params.baseline_pre_days));
    let to = start_date - Duration::days(i64::from(params.baseline_exclude_days));
    let observed = series.engagement_in(from, to);
    BaselineEstimate {
        value: pl_math::median(&observed),
        sample_days: observed.len(),
    }
}

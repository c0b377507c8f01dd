//! Analysis parameters with documented defaults.
//!
//! Every numeric policy choice of the engine lives here so that downstream
//! consumers can tune them; none of the thresholds is a hard constant.

use serde::{Deserialize, Serialize};

/// A recurring seasonal sale window, expressed as month/day boundaries.
///
/// A window whose end month/day precedes its start wraps into the following
/// year (e.g. mid-December to mid-January).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalWindow {
    pub name: String,
    pub start_month: u32,
    pub start_day: u32,
    pub end_month: u32,
    pub end_day: u32,
}

impl SeasonalWindow {
    pub fn new(name: &str, start: (u32, u32), end: (u32, u32)) -> Self {
        SeasonalWindow {
            name: name.to_string(),
            start_month: start.0,
            start_day: start.1,
            end_month: end.0,
            end_day: end.1,
        }
    }

    /// True when the window spans a year boundary.
    pub fn wraps_year(&self) -> bool {
        (self.end_month, self.end_day) < (self.start_month, self.start_day)
    }
}

/// Flat set of named numeric parameters controlling the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// Days before episode start covered by the event window.
    pub event_window_pre_days: u32,
    /// Days after episode start covered by the event window.
    pub event_window_post_days: u32,

    /// Lookback for the pre-event baseline window.
    pub baseline_pre_days: u32,
    /// Days immediately before start excluded from the baseline window
    /// (guards against pre-sale anticipation effects).
    pub baseline_exclude_days: u32,
    /// Minimum observed days in the baseline window; episodes below this are
    /// excluded and counted.
    pub min_baseline_sample_days: usize,

    /// Post-start offsets searched for the peak lift.
    pub peak_window_days: u32,
    /// Post-end offsets searched for decay to baseline.
    pub decay_window_days: u32,
    /// Relative tolerance above baseline that still counts as "returned".
    pub decay_tolerance: f64,
    /// Rolling median window (days) for decay detection.
    pub decay_roll_days: usize,

    /// Baselines below this floor produce no lift percentage.
    pub baseline_floor: f64,

    /// Ascending interior cut points (percent) for discount tier buckets.
    /// The outer bounds 0 and 100 are implicit.
    pub discount_tier_cuts: Vec<f64>,
    /// Number of popularity quantile buckets (Q1..Qn).
    pub popularity_quantiles: usize,

    /// Trailing window for cadence features.
    pub cadence_lookback_days: u32,

    /// Below this eligible-episode count, segmentation uses equal terciles.
    pub min_episodes_for_quantile_split: usize,
    /// Minimum episode count per popularity segment.
    pub min_segment_n: usize,
    /// Minimum episode count per discount tier within a segment.
    pub min_tier_n: usize,
    /// Absolute pre-period median lift (percent) above which a
    /// (segment, tier) pair is flagged.
    pub pre_bias_threshold_pct: f64,

    /// Discount depth at which wishlist notifications fire.
    pub wishlist_notify_discount_pct: f64,

    /// Recurring seasonal sale windows checked for overlap.
    pub seasonal_windows: Vec<SeasonalWindow>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        AnalysisParams {
            event_window_pre_days: 14,
            event_window_post_days: 14,
            baseline_pre_days: 14,
            baseline_exclude_days: 1,
            min_baseline_sample_days: 7,
            peak_window_days: 7,
            decay_window_days: 14,
            decay_tolerance: 0.05,
            decay_roll_days: 3,
            baseline_floor: 1.0,
            discount_tier_cuts: vec![10.0, 25.0, 50.0, 75.0],
            popularity_quantiles: 4,
            cadence_lookback_days: 90,
            min_episodes_for_quantile_split: 200,
            min_segment_n: 25,
            min_tier_n: 10,
            pre_bias_threshold_pct: 5.0,
            wishlist_notify_discount_pct: 20.0,
            seasonal_windows: default_seasonal_windows(),
        }
    }
}

/// Approximate windows for the major recurring seasonal sales.
pub fn default_seasonal_windows() -> Vec<SeasonalWindow> {
    vec![
        SeasonalWindow::new("Spring", (3, 15), (3, 31)),
        SeasonalWindow::new("Summer", (6, 15), (7, 15)),
        SeasonalWindow::new("Autumn", (11, 15), (11, 30)),
        SeasonalWindow::new("Winter", (12, 15), (1, 10)),
    ]
}

impl AnalysisParams {
    /// Full ascending tier breakpoints including the implicit outer bounds.
    pub fn tier_breaks(&self) -> Vec<f64> {
        let mut breaks = Vec::with_capacity(self.discount_tier_cuts.len() + 2);
        breaks.push(0.0);
        breaks.extend(self.discount_tier_cuts.iter().copied());
        breaks.push(100.0);
        breaks
    }

    /// Human-readable labels for each tier bucket, e.g. `"0-10%"`, `"11-25%"`.
    pub fn tier_labels(&self) -> Vec<String> {
        let breaks = self.tier_breaks();
        let mut labels = Vec::with_capacity(breaks.len() - 1);
        for i in 0..breaks.len() - 1 {
            let lo = if i == 0 { 0 } else { breaks[i] as i64 + 1 };
            labels.push(format!("{}-{}%", lo, breaks[i + 1] as i64));
        }
        labels
    }
}

//! Event-window expansion.
//!
//! Each retained episode expands into one row per integer offset k in
//! `[-pre_days, +post_days]`, aligned to calendar dates. Rows exist even when
//! the panel has no observation for the date, so missing-data gaps stay
//! visible instead of being silently compressed. This expansion is the main
//! cost driver: O(episodes x window width) rows.

use chrono::Duration;
use pl_common::{EventWindowRow, SaleRecord};
use pl_config::AnalysisParams;

use crate::panel::ProductSeries;

/// Observed engagement relative to baseline, as a ratio.
///
/// `None` when the baseline is not strictly positive; absolute-uplift
/// consumers get a ratio whenever one is defined, independent of the floor.
pub fn compute_lift_ratio(engagement: f64, baseline: f64) -> Option<f64> {
    (baseline > 0.0).then(|| engagement / baseline)
}

/// Observed engagement relative to baseline, as a percentage deviation:
/// `(ratio - 1) * 100`.
pub fn compute_lift_pct(engagement: f64, baseline: f64) -> Option<f64> {
    compute_lift_ratio(engagement, baseline).map(|r| (r - 1.0) * 100.0)
}

/// Expand one retained episode into its event-window rows, ordered by k.
pub fn build_event_window(
    record: &SaleRecord,
    series: &ProductSeries,
    params: &AnalysisParams,
) -> Vec<EventWindowRow> {
    let pre = params.event_window_pre_days as i32;
    let post = params.event_window_post_days as i32;
    let episode = &record.episode;
    let baseline = record.baseline_value;

    let mut rows = Vec::with_capacity((pre + post + 1) as usize);
    for k in -pre..=post {
        let date = episode.start_date + Duration::days(i64::from(k));
        let engagement = series.engagement_on(date);
        let lift_ratio = engagement.and_then(|e| compute_lift_ratio(e, baseline));
        // Below the floor the percentage deviation is not meaningful.
        let lift_pct = if baseline >= params.baseline_floor {
            lift_ratio.map(|r| (r - 1.0) * 100.0)
        } else {
            None
        };
        rows.push(EventWindowRow {
            episode_id: episode.episode_id.clone(),
            product_id: episode.product_id,
            k,
            date,
            engagement,
            baseline_value: baseline,
            lift_ratio,
            lift_pct,
            in_episode: date >= episode.start_date && date <= episode.end_date,
        });
    }
    rows
}

//! Cadence and mechanism annotation.
//!
//! Cadence features describe how saturated a product's recent sale history
//! is: the gap since the previous retained episode and the density of
//! discount activity over a trailing lookback window. Saturation counts run
//! against every detected episode, including ones later excluded for a thin
//! baseline, because the discounting itself happened either way.

use chrono::{Duration, NaiveDate};
use pl_common::{SaleEpisode, SaleRecord};
use pl_config::{AnalysisParams, SeasonalWindow};

use crate::panel::ProductSeries;

/// Fill recency and trailing-window cadence fields for one product's
/// retained records, in start-date order.
pub fn annotate_cadence(
    records: &mut [SaleRecord],
    detected: &[SaleEpisode],
    series: &ProductSeries,
    params: &AnalysisParams,
) {
    let lookback = i64::from(params.cadence_lookback_days);
    let mut prev_end: Option<NaiveDate> = None;

    for record in records.iter_mut() {
        let start = record.episode.start_date;
        record.days_since_last_sale = prev_end.map(|end| (start - end).num_days());

        let from = start - Duration::days(lookback);
        let to = start - Duration::days(1);

        record.sales_count_last_n = detected
            .iter()
            .filter(|ep| ep.start_date <= to && ep.end_date >= from)
            .count() as u32;
        record.sale_days_last_n = series.discount_day_count_in(from, to) as u32;
        record.sale_share_last_n = if lookback > 0 {
            f64::from(record.sale_days_last_n) / lookback as f64
        } else {
            0.0
        };

        prev_end = Some(record.episode.end_date);
    }
}

/// Tag mechanism hypotheses: wishlist-notification eligibility and seasonal
/// sale overlap.
pub fn apply_mechanism_tags(records: &mut [SaleRecord], params: &AnalysisParams) {
    for record in records.iter_mut() {
        record.wishlist_notify_eligible =
            record.episode.max_discount_pct >= params.wishlist_notify_discount_pct;
        record.seasonal_overlap = overlaps_seasonal_window(
            record.episode.start_date,
            record.episode.end_date,
            &params.seasonal_windows,
        );
    }
}

/// Whether `[start, end]` intersects any recurring seasonal window.
///
/// Windows are instantiated for the years adjacent to the episode so that
/// wrapping windows (mid-December into January) are caught from both sides.
fn overlaps_seasonal_window(start: NaiveDate, end: NaiveDate, windows: &[SeasonalWindow]) -> bool {
    use chrono::Datelike;

    let years = [start.year() - 1, start.year(), end.year()];
    for window in windows {
        for year in years {
            let Some(w_start) =
                NaiveDate::from_ymd_opt(year, window.start_month, window.start_day)
            else {
                continue;
            };
            let end_year = if window.wraps_year() { year + 1 } else { year };
            let Some(w_end) = NaiveDate::from_ymd_opt(end_year, window.end_month, window.end_day)
            else {
                continue;
            };
            if w_start <= end && start <= w_end {
                return true;
            }
        }
    }
    false
}

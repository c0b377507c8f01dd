//! Per-episode scalar metrics: peak lift, area-under-lift, decay day.
//!
//! Metric computation is idempotent: recomputing on unchanged inputs yields
//! identical values, and a refresh overwrites the previously computed fields
//! on the sale record rather than accumulating duplicates.

use std::collections::HashMap;

use chrono::Duration;
use pl_common::{DecayStatus, EventWindowRow, SaleRecord};
use pl_config::AnalysisParams;

use crate::panel::{Panel, ProductSeries};

/// Maximum lift percentage over offsets `k` in `[0, peak_window_days]`.
///
/// `None` when every post-period lift is null.
pub fn peak_lift_pct<'a>(
    rows: impl IntoIterator<Item = &'a EventWindowRow>,
    peak_window_days: u32,
) -> Option<f64> {
    rows.into_iter()
        .filter(|r| r.k >= 0 && r.k <= peak_window_days as i32)
        .filter_map(|r| r.lift_pct)
        .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))))
}

/// Area under lift: sum of `max(lift_ratio - 1, 0)` over in-episode rows.
///
/// Negative deviations are clamped per day before summing, so the result is
/// never negative. `None` only when the event window itself is empty.
pub fn area_under_lift<'a>(
    rows: impl IntoIterator<Item = &'a EventWindowRow>,
) -> Option<f64> {
    let mut seen_any = false;
    let mut total = 0.0;
    for row in rows {
        seen_any = true;
        if row.in_episode {
            if let Some(ratio) = row.lift_ratio {
                total += (ratio - 1.0).max(0.0);
            }
        }
    }
    seen_any.then_some(total)
}

/// Days after episode end until a rolling median of engagement returns to
/// within `baseline * (1 + tolerance)`.
///
/// The rolling median runs over the actual date-ordered post-end series, so
/// missing calendar days do not bias the window. No post-end observations at
/// all leaves the episode `Pending`; observations that never reach the
/// threshold within the decay window resolve right-censored at the window
/// maximum.
pub fn decay_to_baseline(
    record: &SaleRecord,
    series: &ProductSeries,
    params: &AnalysisParams,
) -> DecayStatus {
    let end = record.episode.end_date;
    let from = end + Duration::days(1);
    let to = end + Duration::days(i64::from(params.decay_window_days));

    let observations = series.observations_in(from, to);
    if observations.is_empty() {
        return DecayStatus::Pending;
    }

    let values: Vec<Option<f64>> = observations.iter().map(|o| o.engagement).collect();
    let rolled = pl_math::rolling_median(&values, params.decay_roll_days);
    let threshold = record.baseline_value * (1.0 + params.decay_tolerance);

    for (obs, rolled_value) in observations.iter().zip(rolled.iter()) {
        if let Some(v) = rolled_value {
            if *v <= threshold {
                let day = (obs.date - end).num_days() as u32;
                return DecayStatus::Resolved { day, censored: false };
            }
        }
    }

    DecayStatus::Resolved { day: params.decay_window_days, censored: true }
}

/// Compute and write peak lift, AUL, and decay for every record.
///
/// Existing metric values are overwritten, never appended to.
pub fn apply_metrics(
    records: &mut [SaleRecord],
    event_window: &[EventWindowRow],
    panel: &Panel,
    params: &AnalysisParams,
) {
    let mut by_episode: HashMap<&str, Vec<&EventWindowRow>> = HashMap::new();
    for row in event_window {
        by_episode.entry(row.episode_id.as_str()).or_default().push(row);
    }

    for record in records.iter_mut() {
        let rows = by_episode
            .get(record.episode.episode_id.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        record.peak_lift_pct = peak_lift_pct(rows.iter().copied(), params.peak_window_days);
        record.aul = area_under_lift(rows.iter().copied());
        record.decay = match panel.product(record.episode.product_id) {
            Some(series) => decay_to_baseline(record, series, params),
            None => DecayStatus::Pending,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pl_common::{PanelRow, SaleEpisode};

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn window_row(k: i32, lift_ratio: Option<f64>, in_episode: bool) -> EventWindowRow {
        EventWindowRow {
            episode_id: "1_2020-01-10".into(),
            product_id: 1,
            k,
            date: d("2020-01-10") + Duration::days(i64::from(k)),
            engagement: lift_ratio.map(|r| r * 100.0),
            baseline_value: 100.0,
            lift_ratio,
            lift_pct: lift_ratio.map(|r| (r - 1.0) * 100.0),
            in_episode,
        }
    }

    fn record_ending(end: &str, baseline: f64) -> SaleRecord {
        let episode = SaleEpisode {
            episode_id: "1_2020-01-05".into(),
            product_id: 1,
            start_date: d("2020-01-05"),
            end_date: d(end),
            duration_days: 6,
            max_discount_pct: 40.0,
            modal_discount_pct: 40.0,
        };
        SaleRecord::from_baseline(episode, baseline, 14)
    }

    #[test]
    fn aul_clamps_negative_deviations() {
        let rows = vec![
            window_row(0, Some(0.8), true),
            window_row(1, Some(1.2), true),
            window_row(2, Some(1.5), true),
        ];
        let aul = area_under_lift(&rows).unwrap();
        assert!((aul - 0.7).abs() < 1e-9);
    }

    #[test]
    fn aul_never_negative() {
        let rows = vec![
            window_row(0, Some(0.2), true),
            window_row(1, Some(0.5), true),
        ];
        assert_eq!(area_under_lift(&rows), Some(0.0));
        assert_eq!(area_under_lift(&[]), None);
    }

    #[test]
    fn aul_ignores_out_of_episode_rows() {
        let rows = vec![
            window_row(-1, Some(3.0), false),
            window_row(0, Some(1.1), true),
            window_row(5, Some(2.0), false),
        ];
        let aul = area_under_lift(&rows).unwrap();
        assert!((aul - 0.1).abs() < 1e-9);
    }

    #[test]
    fn peak_lift_searches_post_window_only() {
        let rows = vec![
            window_row(-2, Some(5.0), false), // pre-period, ignored
            window_row(0, Some(1.2), true),
            window_row(3, Some(1.8), true),
            window_row(8, Some(9.0), false), // beyond peak window (7)
        ];
        let peak = peak_lift_pct(&rows, 7).unwrap();
        assert!((peak - 80.0).abs() < 1e-9);
    }

    #[test]
    fn peak_lift_none_when_all_null() {
        let rows = vec![window_row(0, None, true), window_row(1, None, true)];
        assert_eq!(peak_lift_pct(&rows, 7), None);
    }

    fn decay_panel(end: &str, post_values: &[Option<f64>]) -> Panel {
        let end = d(end);
        let rows: Vec<PanelRow> = post_values
            .iter()
            .enumerate()
            .map(|(i, e)| PanelRow {
                product_id: 1,
                date: end + Duration::days(i as i64 + 1),
                engagement: *e,
                discount_pct: Some(0.0),
            })
            .collect();
        Panel::from_rows(rows).unwrap()
    }

    #[test]
    fn decay_day_with_rolling_median() {
        // baseline 100, tolerance 5% -> threshold 105.
        // Post series 150,120,105,100; rolling(3) medians 150,135,120,105.
        let panel = decay_panel("2020-01-10", &[Some(150.0), Some(120.0), Some(105.0), Some(100.0)]);
        let record = record_ending("2020-01-10", 100.0);
        let status = decay_to_baseline(&record, panel.product(1).unwrap(), &AnalysisParams::default());
        assert_eq!(status, DecayStatus::Resolved { day: 4, censored: false });
    }

    #[test]
    fn decay_pending_without_post_data() {
        let panel = decay_panel("2019-12-01", &[Some(100.0)]);
        let record = record_ending("2020-01-10", 100.0);
        let status = decay_to_baseline(&record, panel.product(1).unwrap(), &AnalysisParams::default());
        assert_eq!(status, DecayStatus::Pending);
    }

    #[test]
    fn decay_censored_when_never_returning() {
        let panel = decay_panel("2020-01-10", &[Some(300.0); 14]);
        let record = record_ending("2020-01-10", 100.0);
        let status = decay_to_baseline(&record, panel.product(1).unwrap(), &AnalysisParams::default());
        assert_eq!(status, DecayStatus::Resolved { day: 14, censored: true });
        assert!(status.is_censored());
    }

    #[test]
    fn decay_skips_missing_days_without_bias() {
        // Observed days are sparse; the rolling median runs over the actual
        // date-ordered series, not over dense offsets.
        let panel = decay_panel(
            "2020-01-10",
            &[Some(200.0), None, None, Some(104.0), None, Some(103.0)],
        );
        let record = record_ending("2020-01-10", 100.0);
        let params = AnalysisParams { decay_roll_days: 1, ..Default::default() };
        let status = decay_to_baseline(&record, panel.product(1).unwrap(), &params);
        assert_eq!(status, DecayStatus::Resolved { day: 4, censored: false });
    }

    #[test]
    fn metrics_refresh_is_idempotent() {
        let mut records = vec![record_ending("2020-01-10", 100.0)];
        records[0].episode.episode_id = "1_2020-01-10".into();
        let rows = vec![
            window_row(0, Some(1.5), true),
            window_row(1, Some(1.2), true),
        ];
        let panel = decay_panel("2020-01-10", &[Some(100.0); 5]);
        let params = AnalysisParams::default();

        apply_metrics(&mut records, &rows, &panel, &params);
        let first = records[0].clone();
        apply_metrics(&mut records, &rows, &panel, &params);
        assert_eq!(records[0], first);
        assert_eq!(records[0].peak_lift_pct, Some(50.0));
    }
}

//! Episode detection: run-length grouping of discount days.
//!
//! A new episode starts at the first discount day and whenever the gap from
//! the previous discount day exceeds one day. Gap days without a discount
//! split runs; missing discount values are not discount days, so an episode
//! is never fabricated from missing data.

use chrono::NaiveDate;
use pl_common::SaleEpisode;

use crate::panel::ProductSeries;

/// Detect discount episodes for one product, ordered by start date.
///
/// Output episodes never overlap; duration is always at least one day.
pub fn detect_episodes(series: &ProductSeries) -> Vec<SaleEpisode> {
    let mut episodes = Vec::new();
    let mut run: Vec<(NaiveDate, f64)> = Vec::new();

    for &(date, pct) in series.discount_days() {
        if let Some(&(prev, _)) = run.last() {
            if (date - prev).num_days() > 1 {
                episodes.push(episode_from_run(series.product_id, &run));
                run.clear();
            }
        }
        run.push((date, pct));
    }
    if !run.is_empty() {
        episodes.push(episode_from_run(series.product_id, &run));
    }

    episodes
}

fn episode_from_run(product_id: u64, run: &[(NaiveDate, f64)]) -> SaleEpisode {
    let start_date = run[0].0;
    let end_date = run[run.len() - 1].0;
    let duration_days = (end_date - start_date).num_days() as u32 + 1;

    let max_discount_pct = run
        .iter()
        .map(|(_, p)| *p)
        .fold(f64::NEG_INFINITY, f64::max);
    let modal_discount_pct = modal_discount(run);

    SaleEpisode {
        episode_id: format!("{product_id}_{start_date}"),
        product_id,
        start_date,
        end_date,
        duration_days,
        max_discount_pct,
        modal_discount_pct,
    }
}

/// Most frequent discount value in the run; ties resolve to the value first
/// observed in date order.
fn modal_discount(run: &[(NaiveDate, f64)]) -> f64 {
    let mut best_value = run[0].1;
    let mut best_count = 0usize;
    for (i, &(_, candidate)) in run.iter().enumerate() {
        // Count occurrences; only the first occurrence of a value can win,
        // which makes tie-breaking by first observation automatic.
        if run[..i].iter().any(|(_, p)| *p == candidate) {
            continue;
        }
        let count = run.iter().filter(|(_, p)| *p == candidate).count();
        if count > best_count {
            best_count = count;
            best_value = candidate;
        }
    }
    best_value
}

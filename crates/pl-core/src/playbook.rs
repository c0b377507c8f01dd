//! Playbook summary table.
//!
//! The playbook condenses retained episodes into one row per
//! (discount tier, popularity bucket, cadence bucket) cell: how many
//! episodes landed there and the median peak lift, AUL, and decay day.
//! Cells with no episodes are absent rather than emitted empty, and the
//! episode count travels with every row so a reader can weigh thin cells.

use std::collections::BTreeMap;

use pl_common::{CadenceBucket, SaleRecord, SegmentAssignment};
use serde::{Deserialize, Serialize};

/// One aggregated playbook cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybookRow {
    /// Global discount tier label.
    pub discount_tier: String,
    /// Popularity quantile bucket (`Q1..Qn`).
    pub popularity_bucket: String,
    pub cadence_bucket: CadenceBucket,
    /// Episodes aggregated into this cell.
    pub n: usize,
    pub median_peak_lift_pct: Option<f64>,
    /// Spread of peak lift within the cell.
    pub iqr_peak_lift_pct: Option<f64>,
    pub median_aul: Option<f64>,
    /// Median of peak lift divided by the episode's max discount depth.
    /// Zero-depth episodes are skipped rather than producing infinities.
    pub median_lift_per_point: Option<f64>,
    /// Median days to return to baseline, over uncensored resolved episodes
    /// only. Censored episodes would drag this toward the window maximum.
    pub median_decay_day: Option<f64>,
}

/// Aggregate retained records into the playbook table.
///
/// Records whose assignment lacks a popularity or cadence bucket are
/// dropped; every emitted row has `n >= 1`. Row order is deterministic:
/// tier, then popularity bucket, then cadence bucket.
pub fn build_playbook(
    records: &[SaleRecord],
    assignments: &[SegmentAssignment],
) -> Vec<PlaybookRow> {
    let buckets: BTreeMap<&str, (&str, CadenceBucket)> = assignments
        .iter()
        .filter_map(|a| {
            let pop = a.popularity_bucket.as_deref()?;
            let cadence = a.cadence_bucket?;
            Some((a.episode_id.as_str(), (pop, cadence)))
        })
        .collect();

    let mut groups: BTreeMap<(String, String, CadenceBucket), Vec<&SaleRecord>> = BTreeMap::new();
    for record in records {
        if let Some(&(pop, cadence)) = buckets.get(record.episode.episode_id.as_str()) {
            groups
                .entry((record.discount_tier.clone(), pop.to_string(), cadence))
                .or_default()
                .push(record);
        }
    }

    groups
        .into_iter()
        .map(|((tier, pop, cadence), members)| {
            let peaks: Vec<f64> = members.iter().filter_map(|r| r.peak_lift_pct).collect();
            let auls: Vec<f64> = members.iter().filter_map(|r| r.aul).collect();
            let per_point: Vec<f64> = members
                .iter()
                .filter(|r| r.episode.max_discount_pct > 0.0)
                .filter_map(|r| r.peak_lift_pct.map(|p| p / r.episode.max_discount_pct))
                .collect();
            let decays: Vec<f64> = members
                .iter()
                .filter(|r| !r.decay.is_censored())
                .filter_map(|r| r.decay.day())
                .map(f64::from)
                .collect();
            PlaybookRow {
                discount_tier: tier,
                popularity_bucket: pop,
                cadence_bucket: cadence,
                n: members.len(),
                median_peak_lift_pct: pl_math::median(&peaks),
                iqr_peak_lift_pct: pl_math::iqr(&peaks),
                median_aul: pl_math::median(&auls),
                median_lift_per_point: pl_math::median(&per_point),
                median_decay_day: pl_math::median(&decays),
            }
        })
        .collect()
}

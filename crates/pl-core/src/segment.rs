//! Adaptive segmentation with small-sample guardrails.
//!
//! Episodes are split into popularity segments by baseline engagement,
//! bucketed by popularity quantile and cadence tercile, and labelled with a
//! discount tier. Every adaptive fallback (tercile split, tail widening,
//! segment-local tier collapse) leaves a note; results never silently change
//! shape.

use std::collections::BTreeMap;

use pl_common::{
    BiasFlag, EventWindowRow, Note, NoteKind, SaleRecord, SegmentAssignment, SegmentLabel,
    CadenceBucket, TIER_UNKNOWN,
};
use pl_config::AnalysisParams;
use pl_math::two_step_bin;

/// Default head/mid/tail split fractions by baseline engagement.
const DEFAULT_SEGMENT_QS: [f64; 4] = [0.0, 0.4, 0.8, 1.0];
/// Split fractions after widening the tail segment.
const WIDENED_SEGMENT_QS: [f64; 4] = [0.0, 0.5, 0.8, 1.0];
/// Equal terciles, used both for small samples and for cadence buckets.
const TERCILE_QS: [f64; 4] = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0];

/// Segment assignments plus the notes the adaptive fallbacks produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationResult {
    pub assignments: Vec<SegmentAssignment>,
    pub notes: Vec<Note>,
}

/// Map a discount depth to its global tier label.
///
/// Depths are clamped to `[0, 100]` before binning, so a slightly
/// out-of-range value from an upstream rounding step still gets the edge
/// tier. Only a non-finite depth resolves to [`TIER_UNKNOWN`].
pub fn tier_label(discount_pct: f64, params: &AnalysisParams) -> String {
    if !discount_pct.is_finite() {
        return TIER_UNKNOWN.to_string();
    }
    let clamped = discount_pct.clamp(0.0, 100.0);
    let breaks = params.tier_breaks();
    match pl_math::bin_value(clamped, &breaks) {
        Some(i) => params.tier_labels()[i].clone(),
        None => TIER_UNKNOWN.to_string(),
    }
}

/// Assign every retained episode to a popularity segment, popularity
/// quantile bucket, cadence bucket, and (possibly collapsed) discount tier.
///
/// Guardrails, in order:
/// 1. Below the split minimum the segment split uses equal terciles.
/// 2. If the smallest segment is still under `min_segment_n`, the tail split
///    point widens and segments are recomputed once.
/// 3. If a segment remains under the minimum after widening, a note records
///    that its summaries are unreliable.
/// 4. Within each segment, thin discount tiers collapse the top two tiers
///    into one.
pub fn assign_segments(records: &[SaleRecord], params: &AnalysisParams) -> SegmentationResult {
    let mut notes = Vec::new();
    if records.is_empty() {
        return SegmentationResult { assignments: Vec::new(), notes };
    }

    let baselines: Vec<Option<f64>> = records.iter().map(|r| Some(r.baseline_value)).collect();

    let small_sample = records.len() < params.min_episodes_for_quantile_split;
    let initial_qs: &[f64] = if small_sample { &TERCILE_QS } else { &DEFAULT_SEGMENT_QS };
    if small_sample {
        notes.push(Note::new(
            NoteKind::SmallSampleTerciles,
            format!(
                "{} eligible episodes (< {}); using equal terciles for the segment split",
                records.len(),
                params.min_episodes_for_quantile_split
            ),
        ));
    }

    let mut outcome = two_step_bin(&baselines, initial_qs);
    if smallest_segment(&outcome.bins) < params.min_segment_n {
        outcome = two_step_bin(&baselines, &WIDENED_SEGMENT_QS);
        notes.push(Note::new(
            NoteKind::TailWidened,
            "smallest segment under minimum; widened the tail split point and re-segmented",
        ));
        if smallest_segment(&outcome.bins) < params.min_segment_n {
            notes.push(Note::new(
                NoteKind::InsufficientSegmentSample,
                format!(
                    "a segment holds fewer than {} episodes even after widening; treat its summaries as directional",
                    params.min_segment_n
                ),
            ));
        }
    }

    let popularity = assign_popularity_buckets(&baselines, params);
    let cadence = assign_cadence_buckets(records);

    let mut assignments: Vec<SegmentAssignment> = records
        .iter()
        .enumerate()
        .map(|(i, record)| SegmentAssignment {
            episode_id: record.episode.episode_id.clone(),
            // Finite baselines always bin; default to tail if one ever
            // escapes the fallback.
            segment: segment_from_bin(outcome.bins[i].unwrap_or(0)),
            popularity_bucket: popularity[i].clone(),
            cadence_bucket: cadence[i],
            discount_tier: record.discount_tier.clone(),
        })
        .collect();

    notes.extend(collapse_thin_tiers(&mut assignments, params));

    SegmentationResult { assignments, notes }
}

fn segment_from_bin(bin: usize) -> SegmentLabel {
    match bin {
        0 => SegmentLabel::Tail,
        1 => SegmentLabel::Mid,
        _ => SegmentLabel::Head,
    }
}

/// Size of the smallest of the three segments, counting empty ones.
fn smallest_segment(bins: &[Option<usize>]) -> usize {
    let mut counts = [0usize; 3];
    for bin in bins.iter().flatten() {
        counts[(*bin).min(2)] += 1;
    }
    counts.into_iter().min().unwrap_or(0)
}

/// Quantile popularity buckets `Q1..Qn` over baseline engagement.
fn assign_popularity_buckets(
    baselines: &[Option<f64>],
    params: &AnalysisParams,
) -> Vec<Option<String>> {
    let n = params.popularity_quantiles.max(1);
    let qs: Vec<f64> = (0..=n).map(|i| i as f64 / n as f64).collect();
    two_step_bin(baselines, &qs)
        .bins
        .into_iter()
        .map(|b| b.map(|i| format!("Q{}", i + 1)))
        .collect()
}

/// Tercile cadence buckets over the trailing discount-day share.
fn assign_cadence_buckets(records: &[SaleRecord]) -> Vec<Option<CadenceBucket>> {
    let shares: Vec<Option<f64>> = records.iter().map(|r| Some(r.sale_share_last_n)).collect();
    two_step_bin(&shares, &TERCILE_QS)
        .bins
        .into_iter()
        .map(|b| {
            b.map(|i| match i {
                0 => CadenceBucket::Low,
                1 => CadenceBucket::Mid,
                _ => CadenceBucket::High,
            })
        })
        .collect()
}

/// Collapse the top two discount tiers within any segment holding a tier
/// thinner than `min_tier_n`.
///
/// Collapsing is segment-local: the same episode depth can stay fine-grained
/// in one segment and merged in another.
fn collapse_thin_tiers(
    assignments: &mut [SegmentAssignment],
    params: &AnalysisParams,
) -> Vec<Note> {
    let labels = params.tier_labels();
    if labels.len() < 2 {
        return Vec::new();
    }
    let top_two = [&labels[labels.len() - 2], &labels[labels.len() - 1]];
    let breaks = params.tier_breaks();
    let merged = format!("{}%+", breaks[breaks.len() - 3] as i64 + 1);

    let mut notes = Vec::new();
    for segment in SegmentLabel::ORDER {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for a in assignments.iter().filter(|a| a.segment == segment) {
            if a.discount_tier != TIER_UNKNOWN {
                *counts.entry(a.discount_tier.clone()).or_default() += 1;
            }
        }
        if counts.is_empty() || counts.values().all(|&n| n >= params.min_tier_n) {
            continue;
        }
        for a in assignments
            .iter_mut()
            .filter(|a| a.segment == segment)
            .filter(|a| top_two.iter().any(|t| a.discount_tier == **t))
        {
            a.discount_tier = merged.clone();
        }
        notes.push(Note::new(
            NoteKind::TierCollapsed,
            format!("segment '{segment}' has a tier under n={}; merged top tiers into '{merged}'", params.min_tier_n),
        ));
    }
    notes
}

/// Flag (segment, tier) pairs whose pre-period median lift exceeds the bias
/// threshold.
///
/// A clean pre-period should hover near zero lift; a persistent offset means
/// the baseline window is contaminated and uplift for that pair reads high
/// or low across the board. Episodes with a baseline under the floor are
/// skipped, matching the lift-percentage suppression in the event window.
/// The check runs on global (pre-collapse) tiers.
pub fn pre_period_bias_check(
    records: &[SaleRecord],
    assignments: &[SegmentAssignment],
    event_window: &[EventWindowRow],
    params: &AnalysisParams,
) -> (Vec<BiasFlag>, Vec<Note>) {
    let segment_of: BTreeMap<&str, SegmentLabel> = assignments
        .iter()
        .map(|a| (a.episode_id.as_str(), a.segment))
        .collect();
    let mut group_of: BTreeMap<&str, (SegmentLabel, &str)> = BTreeMap::new();
    for record in records {
        if record.baseline_value < params.baseline_floor {
            continue;
        }
        let id = record.episode.episode_id.as_str();
        if let Some(&segment) = segment_of.get(id) {
            group_of.insert(id, (segment, record.discount_tier.as_str()));
        }
    }

    let mut pre_lifts: BTreeMap<(SegmentLabel, &str), Vec<f64>> = BTreeMap::new();
    for row in event_window.iter().filter(|r| r.k < 0) {
        if let (Some(&group), Some(lift)) = (group_of.get(row.episode_id.as_str()), row.lift_pct) {
            pre_lifts.entry(group).or_default().push(lift);
        }
    }

    let mut flags = Vec::new();
    let mut notes = Vec::new();
    for ((segment, tier), lifts) in &pre_lifts {
        let Some(median) = pl_math::median(lifts) else { continue };
        if median.abs() > params.pre_bias_threshold_pct {
            flags.push(BiasFlag {
                segment: *segment,
                tier: tier.to_string(),
                median_pre_lift_pct: median,
            });
            notes.push(Note::new(
                NoteKind::PrePeriodBias,
                format!(
                    "segment '{segment}' tier '{tier}': pre-period median lift {median:.1}% exceeds +/-{}%",
                    params.pre_bias_threshold_pct
                ),
            ));
        }
    }
    (flags, notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pl_common::SaleEpisode;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn record(id: u64, baseline: f64, depth: f64, params: &AnalysisParams) -> SaleRecord {
        let start = d("2020-01-20");
        let episode = SaleEpisode {
            episode_id: format!("{id}_{start}"),
            product_id: id,
            start_date: start,
            end_date: d("2020-01-22"),
            duration_days: 3,
            max_discount_pct: depth,
            modal_discount_pct: depth,
        };
        let mut r = SaleRecord::from_baseline(episode, baseline, 14);
        r.discount_tier = tier_label(depth, params);
        r
    }

    #[test]
    fn tier_labels_cover_edges() {
        let params = AnalysisParams::default();
        assert_eq!(tier_label(0.0, &params), "0-10%");
        assert_eq!(tier_label(10.0, &params), "0-10%");
        assert_eq!(tier_label(10.5, &params), "11-25%");
        assert_eq!(tier_label(50.0, &params), "26-50%");
        assert_eq!(tier_label(100.0, &params), "76-100%");
        // Out-of-range depths clamp to the edge tiers.
        assert_eq!(tier_label(101.0, &params), "76-100%");
        assert_eq!(tier_label(-3.0, &params), "0-10%");
        assert_eq!(tier_label(f64::NAN, &params), TIER_UNKNOWN);
    }

    #[test]
    fn small_sample_uses_terciles_with_note() {
        let params = AnalysisParams::default();
        let records: Vec<SaleRecord> =
            (0..90).map(|i| record(i, 10.0 + i as f64, 30.0, &params)).collect();
        let result = assign_segments(&records, &params);
        assert!(result.notes.iter().any(|n| n.kind == NoteKind::SmallSampleTerciles));
        assert!(!result.notes.iter().any(|n| n.kind == NoteKind::TailWidened));
        // 90 distinct baselines in terciles: 30 per segment.
        let tails = result.assignments.iter().filter(|a| a.segment == SegmentLabel::Tail).count();
        assert_eq!(tails, 30);
    }

    #[test]
    fn large_sample_splits_40_40_20() {
        let params = AnalysisParams::default();
        let records: Vec<SaleRecord> =
            (0..500).map(|i| record(i, i as f64, 30.0, &params)).collect();
        let result = assign_segments(&records, &params);
        assert!(!result.notes.iter().any(|n| n.kind == NoteKind::SmallSampleTerciles));
        let count = |s: SegmentLabel| result.assignments.iter().filter(|a| a.segment == s).count();
        assert_eq!(count(SegmentLabel::Tail), 200);
        assert_eq!(count(SegmentLabel::Mid), 200);
        assert_eq!(count(SegmentLabel::Head), 100);
    }

    #[test]
    fn tiny_cohort_notes_insufficient_sample() {
        let params = AnalysisParams::default();
        let records: Vec<SaleRecord> =
            (0..9).map(|i| record(i, 10.0 + i as f64, 30.0, &params)).collect();
        let result = assign_segments(&records, &params);
        assert!(result.notes.iter().any(|n| n.kind == NoteKind::TailWidened));
        assert!(result
            .notes
            .iter()
            .any(|n| n.kind == NoteKind::InsufficientSegmentSample));
        assert_eq!(result.assignments.len(), 9);
    }

    #[test]
    fn identical_baselines_never_fail() {
        let params = AnalysisParams::default();
        let records: Vec<SaleRecord> =
            (0..50).map(|i| record(i, 42.0, 30.0, &params)).collect();
        let result = assign_segments(&records, &params);
        assert_eq!(result.assignments.len(), 50);
        // Every episode landed somewhere.
        assert!(result.assignments.iter().all(|a| a.popularity_bucket.is_some()));
    }

    #[test]
    fn collapse_is_segment_local() {
        let params = AnalysisParams::default();
        let mut records = Vec::new();
        // Tail segment (low baselines): plenty of deep-discount episodes.
        for i in 0..30 {
            records.push(record(i, 1.0 + i as f64 * 0.01, 80.0, &params));
        }
        // Head segment (high baselines): 12 shallow + 2 deep; the deep tier
        // is thin so the head collapses its top tiers.
        for i in 100..112 {
            records.push(record(i, 1000.0 + i as f64, 5.0, &params));
        }
        for i in 200..202 {
            records.push(record(i, 2000.0 + i as f64, 80.0, &params));
        }
        let result = assign_segments(&records, &params);

        let tier_of = |id: u64| {
            let key = format!("{id}_2020-01-20");
            result
                .assignments
                .iter()
                .find(|a| a.episode_id == key)
                .unwrap()
                .discount_tier
                .clone()
        };
        // Head's deep episodes merged into the open-ended top tier.
        assert_eq!(tier_of(200), "51%+");
        assert!(result.notes.iter().any(|n| n.kind == NoteKind::TierCollapsed));
    }

    #[test]
    fn assignment_is_idempotent() {
        let params = AnalysisParams::default();
        let records: Vec<SaleRecord> =
            (0..40).map(|i| record(i, (i * 7 % 13) as f64 + 1.0, 30.0, &params)).collect();
        let a = assign_segments(&records, &params);
        let b = assign_segments(&records, &params);
        assert_eq!(a, b);
    }

    fn pre_row(episode_id: &str, k: i32, lift_pct: f64) -> EventWindowRow {
        EventWindowRow {
            episode_id: episode_id.to_string(),
            product_id: 1,
            k,
            date: d("2020-01-20") + chrono::Duration::days(i64::from(k)),
            engagement: Some(100.0),
            baseline_value: 100.0,
            lift_ratio: Some(1.0 + lift_pct / 100.0),
            lift_pct: Some(lift_pct),
            in_episode: false,
        }
    }

    #[test]
    fn bias_flagged_when_pre_period_median_offset() {
        let params = AnalysisParams::default();
        let records: Vec<SaleRecord> =
            (0..30).map(|i| record(i, 100.0 + i as f64, 30.0, &params)).collect();
        let result = assign_segments(&records, &params);

        // Give every episode a consistently inflated pre-period.
        let mut window = Vec::new();
        for r in &records {
            for k in -5..0 {
                window.push(pre_row(&r.episode.episode_id, k, 12.0));
            }
        }
        let (flags, notes) = pre_period_bias_check(&records, &result.assignments, &window, &params);
        assert!(!flags.is_empty());
        assert!(flags.iter().all(|f| (f.median_pre_lift_pct - 12.0).abs() < 1e-9));
        assert!(notes.iter().all(|n| n.kind == NoteKind::PrePeriodBias));
    }

    #[test]
    fn clean_pre_period_yields_no_flags() {
        let params = AnalysisParams::default();
        let records: Vec<SaleRecord> =
            (0..30).map(|i| record(i, 100.0 + i as f64, 30.0, &params)).collect();
        let result = assign_segments(&records, &params);
        let mut window = Vec::new();
        for (i, r) in records.iter().enumerate() {
            // Alternating small offsets; median stays inside the threshold.
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            for k in -5..0 {
                window.push(pre_row(&r.episode.episode_id, k, sign * 2.0));
            }
        }
        let (flags, _) = pre_period_bias_check(&records, &result.assignments, &window, &params);
        assert!(flags.is_empty());
    }
}

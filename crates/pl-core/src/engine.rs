//! Analysis orchestration.
//!
//! `run` takes the materialized panel and parameters through the full
//! pipeline: validate, split per product, detect episodes, baseline, cadence,
//! event window, metrics, segmentation, bias check, playbook. Output ordering
//! is deterministic for identical input: products ascend by id and episodes
//! by start date, and the note list records every adaptive decision in
//! pipeline order.

use pl_common::{
    BiasFlag, Error, EventWindowRow, Note, NoteKind, PanelRow, Result, SaleRecord,
    SegmentAssignment,
};
use pl_config::{validate_params, AnalysisParams, ParamsSnapshot};
use tracing::{debug, info};

use crate::baseline::compute_baseline;
use crate::cadence::{annotate_cadence, apply_mechanism_tags};
use crate::detect::detect_episodes;
use crate::metrics::apply_metrics;
use crate::panel::Panel;
use crate::playbook::{build_playbook, PlaybookRow};
use crate::segment::{assign_segments, pre_period_bias_check, tier_label};
use crate::window::build_event_window;

/// Complete result set of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// Retained episodes with baseline, cadence, tag, and metric fields.
    pub sales: Vec<SaleRecord>,
    /// Expanded event-window rows for every retained episode.
    pub event_window: Vec<EventWindowRow>,
    /// Per-episode segment assignments.
    pub segments: Vec<SegmentAssignment>,
    /// Aggregated (tier, popularity, cadence) summary cells.
    pub playbook: Vec<PlaybookRow>,
    /// (segment, tier) pairs with a contaminated pre-period.
    pub bias_flags: Vec<BiasFlag>,
    /// Ordered notes from every adaptive fallback and exclusion.
    pub notes: Vec<Note>,
    /// Episodes dropped for an insufficient baseline sample.
    pub excluded_low_baseline: usize,
    /// Frozen parameters this run used.
    pub params_snapshot: ParamsSnapshot,
}

/// Run the full analysis over a panel.
pub fn run(rows: Vec<PanelRow>, params: &AnalysisParams) -> Result<AnalysisOutput> {
    validate_params(params).map_err(|e| Error::InvalidParams(e.to_string()))?;
    let snapshot = ParamsSnapshot::new(params);

    let panel = Panel::from_rows(rows)?;
    info!(
        products = panel.product_count(),
        rows = panel.row_count(),
        params = %snapshot.short_id(),
        "panel validated"
    );

    let mut sales: Vec<SaleRecord> = Vec::new();
    let mut event_window: Vec<EventWindowRow> = Vec::new();
    let mut excluded_low_baseline = 0usize;
    let mut detected_total = 0usize;

    for series in panel.products() {
        let detected = detect_episodes(series);
        detected_total += detected.len();

        let mut records: Vec<SaleRecord> = Vec::new();
        for episode in &detected {
            let estimate = compute_baseline(series, episode.start_date, params);
            if !estimate.is_sufficient(params.min_baseline_sample_days) {
                debug!(
                    episode = %episode.episode_id,
                    sample_days = estimate.sample_days,
                    "excluded: insufficient baseline sample"
                );
                excluded_low_baseline += 1;
                continue;
            }
            // is_sufficient guarantees a value.
            let value = estimate.value.unwrap_or_default();
            let mut record = SaleRecord::from_baseline(episode.clone(), value, estimate.sample_days);
            record.discount_tier = tier_label(episode.max_discount_pct, params);
            records.push(record);
        }

        annotate_cadence(&mut records, &detected, series, params);
        for record in &records {
            event_window.extend(build_event_window(record, series, params));
        }
        sales.extend(records);
    }
    info!(
        detected = detected_total,
        retained = sales.len(),
        excluded = excluded_low_baseline,
        "episodes detected and baselined"
    );

    apply_mechanism_tags(&mut sales, params);
    apply_metrics(&mut sales, &event_window, &panel, params);

    let mut notes: Vec<Note> = Vec::new();
    if excluded_low_baseline > 0 {
        notes.push(Note::new(
            NoteKind::BaselineExclusions,
            format!(
                "{excluded_low_baseline} episode(s) excluded: fewer than {} observed baseline days",
                params.min_baseline_sample_days
            ),
        ));
    }

    let segmentation = assign_segments(&sales, params);
    notes.extend(segmentation.notes);

    let (bias_flags, bias_notes) =
        pre_period_bias_check(&sales, &segmentation.assignments, &event_window, params);
    notes.extend(bias_notes);

    let playbook = build_playbook(&sales, &segmentation.assignments);
    info!(
        segments = segmentation.assignments.len(),
        playbook_rows = playbook.len(),
        bias_flags = bias_flags.len(),
        notes = notes.len(),
        "analysis complete"
    );

    Ok(AnalysisOutput {
        sales,
        event_window,
        segments: segmentation.assignments,
        playbook,
        bias_flags,
        notes,
        excluded_low_baseline,
        params_snapshot: snapshot,
    })
}

//! Core data records for the sale event analytics engine.
//!
//! The engine consumes a clean daily panel (one row per product and calendar
//! date) and emits episodes, per-episode sale records, event-window rows, and
//! segment assignments. All records serialize with serde so host applications
//! can persist them in whatever table format they use.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tier label used when a discount depth cannot be mapped to any bucket.
///
/// Tier assignment never produces a null label; unusable depths (non-finite
/// values from a pre-validated external sale table) resolve to this bucket.
pub const TIER_UNKNOWN: &str = "Unknown";

/// One observation in the daily panel: a (product, calendar date) cell.
///
/// Invariant (owned by the ingestion collaborator): one row per
/// (product_id, date). The engine treats the panel as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRow {
    pub product_id: u64,
    pub date: NaiveDate,
    /// Daily engagement signal (player count or sales proxy). `None` means
    /// the day was not observed for this product.
    pub engagement: Option<f64>,
    /// Discount percentage, pre-normalized to [0, 100]. `None` is treated as
    /// no discount (never fabricates an episode from missing data).
    pub discount_pct: Option<f64>,
}

/// A contiguous run of discount-active days for one product.
///
/// Episodes for the same product never overlap and are ordered by
/// `start_date`; `duration_days = end_date - start_date + 1 >= 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleEpisode {
    /// Deterministic id: `{product_id}_{start_date}`.
    pub episode_id: String,
    pub product_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: u32,
    /// Deepest discount observed on any day of the episode.
    pub max_discount_pct: f64,
    /// Most frequent discount across the episode's discount days; ties go to
    /// the value first observed in date order.
    pub modal_discount_pct: f64,
}

/// Decay resolution state for one episode, terminal once computed for a
/// given panel snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecayStatus {
    /// No post-episode-end observations exist yet.
    Pending,
    /// Rolling median returned to near-baseline on `day` (days after episode
    /// end), or never did within the decay window (`censored: true`, with
    /// `day` pinned to the window maximum).
    Resolved { day: u32, censored: bool },
}

impl DecayStatus {
    /// Resolved decay day, if any (censored or not).
    pub fn day(&self) -> Option<u32> {
        match self {
            DecayStatus::Pending => None,
            DecayStatus::Resolved { day, .. } => Some(*day),
        }
    }

    /// True when the episode never returned to baseline within the window.
    pub fn is_censored(&self) -> bool {
        matches!(self, DecayStatus::Resolved { censored: true, .. })
    }
}

/// Episode enriched with baseline, cadence, mechanism, and metric fields.
///
/// Built in stages: the baseline calculator sets `baseline_value` and
/// `baseline_sample_days`, the cadence annotator fills recency and tag
/// fields, and the metrics calculator writes (and on refresh overwrites)
/// `peak_lift_pct`, `aul`, and `decay`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    #[serde(flatten)]
    pub episode: SaleEpisode,

    /// Median engagement over the pre-event lookback window.
    pub baseline_value: f64,
    /// Non-null observations inside the baseline window.
    pub baseline_sample_days: usize,

    /// Gap in days from the previous retained episode's end to this start.
    /// `None` for the first retained episode of a product.
    pub days_since_last_sale: Option<i64>,
    /// Detected episodes overlapping the trailing cadence window.
    pub sales_count_last_n: u32,
    /// Individual discount days inside the trailing cadence window.
    pub sale_days_last_n: u32,
    /// `sale_days_last_n / cadence_lookback_days`.
    pub sale_share_last_n: f64,

    /// Depth reaches the wishlist-notification threshold.
    pub wishlist_notify_eligible: bool,
    /// Episode range intersects a recurring seasonal sale window.
    pub seasonal_overlap: bool,

    /// Global (pre-collapse) discount tier label; never null.
    pub discount_tier: String,

    pub peak_lift_pct: Option<f64>,
    /// Area under lift: cumulative non-negative excess engagement.
    pub aul: Option<f64>,
    pub decay: DecayStatus,
}

impl SaleRecord {
    /// A record fresh out of the baseline stage, with cadence, tag, tier,
    /// and metric fields at their pre-annotation defaults.
    pub fn from_baseline(episode: SaleEpisode, baseline_value: f64, sample_days: usize) -> Self {
        SaleRecord {
            episode,
            baseline_value,
            baseline_sample_days: sample_days,
            days_since_last_sale: None,
            sales_count_last_n: 0,
            sale_days_last_n: 0,
            sale_share_last_n: 0.0,
            wishlist_notify_eligible: false,
            seasonal_overlap: false,
            discount_tier: TIER_UNKNOWN.to_string(),
            peak_lift_pct: None,
            aul: None,
            decay: DecayStatus::Pending,
        }
    }
}

/// One row of the expanded event window: a single day offset `k` relative to
/// the episode start.
///
/// Rows exist for every `k` in `[-pre_days, +post_days]` even when the panel
/// has no observation for that date, so missing-data gaps stay visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventWindowRow {
    pub episode_id: String,
    pub product_id: u64,
    /// Day offset relative to episode start (negative = pre-period).
    pub k: i32,
    pub date: NaiveDate,
    pub engagement: Option<f64>,
    pub baseline_value: f64,
    /// `engagement / baseline_value`; `None` when engagement is missing or
    /// the baseline is zero.
    pub lift_ratio: Option<f64>,
    /// `(lift_ratio - 1) * 100`; additionally `None` when the baseline is
    /// below the configured floor.
    pub lift_pct: Option<f64>,
    /// Date falls within `[start_date, end_date]`.
    pub in_episode: bool,
}

/// Ordinal popularity segment by baseline engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentLabel {
    Tail,
    Mid,
    Head,
}

impl SegmentLabel {
    /// Segments in ascending popularity order.
    pub const ORDER: [SegmentLabel; 3] = [SegmentLabel::Tail, SegmentLabel::Mid, SegmentLabel::Head];
}

impl std::fmt::Display for SegmentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentLabel::Tail => write!(f, "tail"),
            SegmentLabel::Mid => write!(f, "mid"),
            SegmentLabel::Head => write!(f, "head"),
        }
    }
}

/// Ordinal sale-cadence bucket by trailing discount-day share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CadenceBucket {
    Low,
    Mid,
    High,
}

impl std::fmt::Display for CadenceBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CadenceBucket::Low => write!(f, "low"),
            CadenceBucket::Mid => write!(f, "mid"),
            CadenceBucket::High => write!(f, "high"),
        }
    }
}

/// Per-episode cohort assignment, recomputed per analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAssignment {
    pub episode_id: String,
    pub segment: SegmentLabel,
    /// Quantile popularity bucket (`Q1..Qn`); `None` when the baseline
    /// distribution is degenerate beyond what rank binning can split.
    pub popularity_bucket: Option<String>,
    pub cadence_bucket: Option<CadenceBucket>,
    /// Discount tier after any segment-local collapsing; never null.
    pub discount_tier: String,
}

/// A (segment, tier) pair whose pre-period median lift exceeds the bias
/// threshold, signalling baseline-contamination risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasFlag {
    pub segment: SegmentLabel,
    pub tier: String,
    pub median_pre_lift_pct: f64,
}

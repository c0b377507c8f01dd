//! Ordered analysis notes and warnings.
//!
//! Every non-fatal condition (small-sample fallback, tail widening, tier
//! collapse, baseline exclusions, pre-period bias) is appended to an ordered
//! note list returned alongside results. Downstream reports render these
//! directly; nothing is silently changed without a recorded note.

use serde::{Deserialize, Serialize};

/// Machine-readable note classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    /// Total eligible episodes below the quantile-split minimum; equal
    /// terciles were used instead of the default split points.
    SmallSampleTerciles,
    /// Smallest segment was under the minimum; the tail split point was
    /// widened and segments recomputed.
    TailWidened,
    /// At least one segment stayed under the minimum even after widening.
    InsufficientSegmentSample,
    /// Top two discount tiers merged within one segment due to low N.
    TierCollapsed,
    /// Pre-period median lift exceeded the bias threshold for a
    /// (segment, tier) pair.
    PrePeriodBias,
    /// Episodes excluded for insufficient baseline sample days.
    BaselineExclusions,
}

impl std::fmt::Display for NoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoteKind::SmallSampleTerciles => write!(f, "small_sample_terciles"),
            NoteKind::TailWidened => write!(f, "tail_widened"),
            NoteKind::InsufficientSegmentSample => write!(f, "insufficient_segment_sample"),
            NoteKind::TierCollapsed => write!(f, "tier_collapsed"),
            NoteKind::PrePeriodBias => write!(f, "pre_period_bias"),
            NoteKind::BaselineExclusions => write!(f, "baseline_exclusions"),
        }
    }
}

/// A single human-readable note with a machine-readable kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub kind: NoteKind,
    pub message: String,
}

impl Note {
    pub fn new(kind: NoteKind, message: impl Into<String>) -> Self {
        Note { kind, message: message.into() }
    }
}

impl std::fmt::Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_display_includes_kind() {
        let note = Note::new(NoteKind::TierCollapsed, "collapsed tiers for segment 'tail'");
        let rendered = note.to_string();
        assert!(rendered.starts_with("[tier_collapsed]"));
        assert!(rendered.contains("tail"));
    }

    #[test]
    fn note_kind_serializes_snake_case() {
        let json = serde_json::to_string(&NoteKind::PrePeriodBias).unwrap();
        assert_eq!(json, r#""pre_period_bias""#);
    }
}

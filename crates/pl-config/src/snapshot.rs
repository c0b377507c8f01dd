//! Parameter snapshots for reproducible analysis runs.
//!
//! A snapshot captures the exact parameter state an analysis ran with,
//! letting downstream reports verify that two result sets are comparable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::params::AnalysisParams;

/// A frozen snapshot of analysis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamsSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the parameter set.
    pub schema_version: String,

    /// SHA-256 hash of the canonical parameter JSON.
    pub params_hash: String,

    /// Key parameter values for quick reference.
    pub summary: ParamsSummary,
}

/// Summary of the parameters most likely to change results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamsSummary {
    pub event_window_pre_days: u32,
    pub event_window_post_days: u32,
    pub baseline_pre_days: u32,
    pub decay_tolerance: f64,
    pub min_segment_n: usize,
    pub min_tier_n: usize,
    pub discount_tier_count: usize,
}

impl ParamsSnapshot {
    /// Create a snapshot of the given parameters.
    pub fn new(params: &AnalysisParams) -> Self {
        let canonical = serde_json::to_string(params).unwrap_or_default();
        ParamsSnapshot {
            timestamp: Utc::now(),
            schema_version: crate::PARAMS_SCHEMA_VERSION.to_string(),
            params_hash: hash_content(&canonical),
            summary: ParamsSummary {
                event_window_pre_days: params.event_window_pre_days,
                event_window_post_days: params.event_window_post_days,
                baseline_pre_days: params.baseline_pre_days,
                decay_tolerance: params.decay_tolerance,
                min_segment_n: params.min_segment_n,
                min_tier_n: params.min_tier_n,
                discount_tier_count: params.discount_tier_cuts.len() + 1,
            },
        }
    }

    /// Check if this snapshot was taken from the same parameters as another.
    pub fn matches(&self, other: &ParamsSnapshot) -> bool {
        self.params_hash == other.params_hash
    }

    /// Short identifier (first 12 hash characters).
    pub fn short_id(&self) -> &str {
        &self.params_hash[..12.min(self.params_hash.len())]
    }
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

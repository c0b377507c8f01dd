//! Two-step binning: quantile cut with a percentile-rank fallback.
//!
//! The primary method cuts values at quantile breakpoints, with a documented
//! precondition: the breakpoints must be strictly increasing. When the
//! distribution is degenerate (duplicate boundary values, all-identical
//! inputs) the fallback ranks values to percentiles and cuts those against
//! the same quantile fractions, so binning never fails.

use serde::{Deserialize, Serialize};

use crate::robust::percentile_sorted;

/// Which of the two binning methods produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinMethod {
    /// Quantile breakpoints on the raw values.
    Quantile,
    /// Percentile ranks cut against the quantile fractions.
    PercentileRank,
}

/// Bin assignments plus the method that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct BinningOutcome {
    /// Bin index per input value (`0..qs.len()-1`); `None` for missing inputs.
    pub bins: Vec<Option<usize>>,
    pub method: BinMethod,
}

/// Assign `value` to a bin delimited by `breaks` (ascending).
///
/// Bin `i` covers `(breaks[i], breaks[i+1]]`; the lowest break itself belongs
/// to bin 0. Returns `None` for non-finite or out-of-range values.
pub fn bin_value(value: f64, breaks: &[f64]) -> Option<usize> {
    if !value.is_finite() || breaks.len() < 2 {
        return None;
    }
    if value == breaks[0] {
        return Some(0);
    }
    for i in 0..breaks.len() - 1 {
        if value > breaks[i] && value <= breaks[i + 1] {
            return Some(i);
        }
    }
    None
}

/// Average-rank percentile (0, 1] per value; `None` for missing inputs.
///
/// Ties share the mean of the ranks they occupy, so identical values always
/// land in the same bin.
pub fn rank_pct(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut indexed: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|x| x.is_finite()).map(|x| (i, x)))
        .collect();
    let n = indexed.len();
    let mut out = vec![None; values.len()];
    if n == 0 {
        return out;
    }
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut pos = 0;
    while pos < n {
        let mut end = pos + 1;
        while end < n && indexed[end].1 == indexed[pos].1 {
            end += 1;
        }
        // Ranks are 1-based; tied values share the average rank.
        let avg_rank = ((pos + 1) + end) as f64 / 2.0;
        for item in &indexed[pos..end] {
            out[item.0] = Some(avg_rank / n as f64);
        }
        pos = end;
    }
    out
}

fn quantile_breaks(values: &[f64], qs: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    qs.iter().map(|q| percentile_sorted(&sorted, *q)).collect()
}

fn strictly_increasing(breaks: &[f64]) -> bool {
    breaks.windows(2).all(|w| w[0] < w[1])
}

/// Bin values at the quantile fractions `qs` (e.g. `[0.0, 0.4, 0.8, 1.0]`).
///
/// Primary: quantile breakpoints on the raw values, taken only when the
/// breakpoints are strictly increasing. Otherwise: percentile-rank fallback.
/// Inputs that are `None` or non-finite stay unassigned; every finite input
/// receives a bin in `0..qs.len()-1`.
pub fn two_step_bin(values: &[Option<f64>], qs: &[f64]) -> BinningOutcome {
    debug_assert!(qs.len() >= 2, "need at least two quantile fractions");
    let finite: Vec<f64> = values
        .iter()
        .filter_map(|v| v.filter(|x| x.is_finite()))
        .collect();

    if finite.is_empty() {
        return BinningOutcome { bins: vec![None; values.len()], method: BinMethod::PercentileRank };
    }

    let breaks = quantile_breaks(&finite, qs);
    if strictly_increasing(&breaks) {
        let bins = values
            .iter()
            .map(|v| v.and_then(|x| bin_value(x, &breaks)))
            .collect();
        return BinningOutcome { bins, method: BinMethod::Quantile };
    }

    // Degenerate boundaries: rank to percentiles, cut against the fractions.
    let pct = rank_pct(values);
    let bins = pct.iter().map(|p| p.and_then(|x| bin_value(x, qs))).collect();
    BinningOutcome { bins, method: BinMethod::PercentileRank }
}

//! Robust summary statistics over sparse daily series.
//!
//! All helpers ignore non-finite inputs so that missing observations
//! (carried as `None` or NaN by callers) never poison a summary.

/// Compute a percentile from a sorted slice (linear interpolation).
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let idx = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = idx - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    finite.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    finite
}

/// Quantile of the finite values in `values`. `None` when no finite value exists.
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    let finite = sorted_finite(values);
    if finite.is_empty() {
        return None;
    }
    Some(percentile_sorted(&finite, p))
}

/// Median of the finite values in `values`.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Interquartile range (p75 - p25) of the finite values in `values`.
pub fn iqr(values: &[f64]) -> Option<f64> {
    let finite = sorted_finite(values);
    if finite.is_empty() {
        return None;
    }
    Some(percentile_sorted(&finite, 0.75) - percentile_sorted(&finite, 0.25))
}

/// Trailing rolling median over an observation series.
///
/// For each position `i` the window covers the `window` most recent
/// positions ending at `i`. Missing observations occupy window slots but are
/// excluded from the median; a window with at least one observed value
/// yields a result (min_periods = 1), an all-missing window yields `None`.
pub fn rolling_median(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        let lo = (i + 1).saturating_sub(window);
        let observed: Vec<f64> = series[lo..=i]
            .iter()
            .filter_map(|v| v.filter(|x| x.is_finite()))
            .collect();
        out.push(median(&observed));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn median_odd_even() {
        assert!(approx_eq(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0, 1e-12));
        assert!(approx_eq(median(&[4.0, 1.0, 2.0, 3.0]).unwrap(), 2.5, 1e-12));
    }

    #[test]
    fn median_ignores_nan() {
        let m = median(&[1.0, f64::NAN, 3.0]).unwrap();
        assert!(approx_eq(m, 2.0, 1e-12));
        assert!(median(&[f64::NAN]).is_none());
        assert!(median(&[]).is_none());
    }

    #[test]
    fn median_resists_single_spike() {
        // One huge outlier day must not drag the summary.
        let m = median(&[100.0, 101.0, 99.0, 100.0, 10_000.0]).unwrap();
        assert!(approx_eq(m, 100.0, 1e-12));
    }

    #[test]
    fn quantile_interpolates() {
        let q = quantile(&[0.0, 10.0], 0.25).unwrap();
        assert!(approx_eq(q, 2.5, 1e-12));
    }

    #[test]
    fn iqr_basic() {
        let spread = iqr(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(approx_eq(spread, 2.0, 1e-12));
    }

    #[test]
    fn rolling_median_min_periods_one() {
        let series = vec![Some(150.0), Some(120.0), Some(105.0), Some(100.0)];
        let rolled = rolling_median(&series, 3);
        assert!(approx_eq(rolled[0].unwrap(), 150.0, 1e-12));
        assert!(approx_eq(rolled[1].unwrap(), 135.0, 1e-12));
        assert!(approx_eq(rolled[2].unwrap(), 120.0, 1e-12));
        assert!(approx_eq(rolled[3].unwrap(), 105.0, 1e-12));
    }

    #[test]
    fn rolling_median_skips_missing() {
        let series = vec![Some(10.0), None, Some(30.0)];
        let rolled = rolling_median(&series, 2);
        assert!(approx_eq(rolled[0].unwrap(), 10.0, 1e-12));
        // Window [10, None] still has one observation.
        assert!(approx_eq(rolled[1].unwrap(), 10.0, 1e-12));
        // Window [None, 30].
        assert!(approx_eq(rolled[2].unwrap(), 30.0, 1e-12));
    }

    #[test]
    fn rolling_median_all_missing_window() {
        let series = vec![None, None];
        let rolled = rolling_median(&series, 2);
        assert_eq!(rolled, vec![None, None]);
    }
}

//! Promolift math utilities.
//!
//! Robust summary statistics (median, percentile, IQR, rolling median) and
//! the two-step quantile/rank binning strategy used by segmentation.

pub mod binning;
pub mod robust;

pub use binning::{bin_value, rank_pct, two_step_bin, BinMethod, BinningOutcome};
pub use robust::{iqr, median, percentile_sorted, quantile, rolling_median};

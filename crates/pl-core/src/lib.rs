//! Promolift Core Engine
//!
//! This library measures how promotional discount events affect a product's
//! daily engagement signal:
//! - Episode detection from a daily panel
//! - Pre-event baseline computation
//! - Event-window expansion with lift ratios
//! - Uplift/decay metrics (peak lift, AUL, decay day with censoring)
//! - Cadence and mechanism annotation
//! - Adaptive segmentation with small-sample guardrails
//!
//! The engine consumes a clean, fully materialized panel and emits structured
//! records; file discovery, tabular reading, and chart rendering are external
//! collaborators.

pub mod baseline;
pub mod cadence;
pub mod detect;
pub mod engine;
pub mod metrics;
pub mod panel;
pub mod playbook;
pub mod segment;
pub mod window;

pub use engine::{run, AnalysisOutput};
pub use panel::{Panel, ProductSeries};
pub use playbook::PlaybookRow;

//! Promolift analysis parameter handling.
//!
//! This crate provides:
//! - Typed analysis parameters with every documented default
//! - Semantic validation
//! - Parameter snapshots for reproducible analysis runs
//!
//! Loading parameters from files is the host application's job; the engine
//! only consumes the typed struct.

pub mod params;
pub mod snapshot;
pub mod validate;

pub use params::{default_seasonal_windows, AnalysisParams, SeasonalWindow};
pub use snapshot::ParamsSnapshot;
pub use validate::{validate_params, ValidationError, ValidationResult};

/// Schema version for serialized parameters and snapshots.
pub const PARAMS_SCHEMA_VERSION: &str = "1.0.0";

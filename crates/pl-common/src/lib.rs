//! Promolift common types, notes, and errors.
//!
//! This crate provides foundational types shared across the engine crates:
//! - Panel, episode, sale-record, and event-window records
//! - Ordered analysis notes returned alongside results
//! - Common error types with stable codes
//! - Required-signal schema contracts for input tables

pub mod error;
pub mod note;
pub mod schema;
pub mod types;

pub use error::{Error, Result};
pub use note::{Note, NoteKind};
pub use schema::{FieldSpec, TableSchema, PANEL_SCHEMA};
pub use types::{
    BiasFlag, CadenceBucket, DecayStatus, EventWindowRow, PanelRow, SaleEpisode, SaleRecord,
    SegmentAssignment, SegmentLabel, TIER_UNKNOWN,
};

//! Required-signal contracts for engine input tables.
//!
//! The engine declares the signals each input table must carry and validates
//! them once at the boundary, rejecting with a structured error instead of
//! failing deep inside a computation. In a typed panel a column is always
//! structurally present, so "missing" means the signal is all-null.

/// A single required signal within a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// The required-signal set for one input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub table: &'static str,
    pub required: &'static [FieldSpec],
}

impl TableSchema {
    /// Look up a required field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.required.iter().find(|f| f.name == name)
    }
}

/// Contract for the daily panel consumed by the engine.
pub const PANEL_SCHEMA: TableSchema = TableSchema {
    table: "panel",
    required: &[
        FieldSpec {
            name: "engagement",
            description: "daily engagement signal (player count or sales proxy)",
        },
        FieldSpec {
            name: "discount_pct",
            description: "daily discount percentage in [0, 100]",
        },
    ],
};

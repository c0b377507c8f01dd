//! Panel container and per-product contexts.
//!
//! The panel is validated once at the boundary against the required-signal
//! contract, then split into immutable per-product series. All downstream
//! stages read these contexts; nothing mutates them, so a host application
//! may process products in parallel without shared state.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use pl_common::{Error, PanelRow, Result, PANEL_SCHEMA};

/// One day of a product's series after boundary normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct DayObservation {
    pub date: NaiveDate,
    pub engagement: Option<f64>,
    pub discount_pct: Option<f64>,
}

impl DayObservation {
    /// A discount day carries a strictly positive discount; a missing
    /// discount value never counts as one.
    pub fn is_discount_day(&self) -> bool {
        self.discount_pct.map(|p| p > 0.0).unwrap_or(false)
    }
}

/// Immutable per-product view over the panel: the date-ordered observation
/// series plus the discount-day subsequence.
#[derive(Debug, Clone)]
pub struct ProductSeries {
    pub product_id: u64,
    rows: Vec<DayObservation>,
    engagement: BTreeMap<NaiveDate, f64>,
    discount_days: Vec<(NaiveDate, f64)>,
}

impl ProductSeries {
    fn new(product_id: u64, rows: Vec<DayObservation>) -> Self {
        let engagement = rows
            .iter()
            .filter_map(|r| r.engagement.map(|e| (r.date, e)))
            .collect();
        let discount_days = rows
            .iter()
            .filter(|r| r.is_discount_day())
            .map(|r| (r.date, r.discount_pct.unwrap_or(0.0)))
            .collect();
        ProductSeries { product_id, rows, engagement, discount_days }
    }

    /// All observations in date order.
    pub fn rows(&self) -> &[DayObservation] {
        &self.rows
    }

    /// Discount days (date, discount_pct) in date order.
    pub fn discount_days(&self) -> &[(NaiveDate, f64)] {
        &self.discount_days
    }

    /// Observed engagement for a calendar date, if any.
    pub fn engagement_on(&self, date: NaiveDate) -> Option<f64> {
        self.engagement.get(&date).copied()
    }

    /// Non-null engagement values within `[from, to]` in date order.
    pub fn engagement_in(&self, from: NaiveDate, to: NaiveDate) -> Vec<f64> {
        if from > to {
            return Vec::new();
        }
        self.engagement.range(from..=to).map(|(_, v)| *v).collect()
    }

    /// Panel rows present within `[from, to]` in date order, whether or not
    /// engagement was observed that day.
    pub fn observations_in(&self, from: NaiveDate, to: NaiveDate) -> &[DayObservation] {
        if from > to {
            return &[];
        }
        let lo = self.rows.partition_point(|r| r.date < from);
        let hi = self.rows.partition_point(|r| r.date <= to);
        &self.rows[lo..hi]
    }

    /// Number of discount days within `[from, to]`.
    pub fn discount_day_count_in(&self, from: NaiveDate, to: NaiveDate) -> usize {
        self.discount_days
            .iter()
            .filter(|(d, _)| *d >= from && *d <= to)
            .count()
    }
}

/// The validated daily panel, split per product.
#[derive(Debug, Clone)]
pub struct Panel {
    products: BTreeMap<u64, ProductSeries>,
    row_count: usize,
}

impl Panel {
    /// Build a panel from raw rows, validating the required-signal contract
    /// once at the boundary.
    ///
    /// A signal that is structurally present but all-null carries no
    /// information, so an all-null engagement or discount column is rejected
    /// as a missing required signal.
    pub fn from_rows(rows: Vec<PanelRow>) -> Result<Panel> {
        if rows.is_empty() {
            return Err(Error::EmptyTable { table: PANEL_SCHEMA.table.to_string() });
        }

        let has_engagement = rows.iter().any(|r| r.engagement.is_some());
        if !has_engagement {
            return Err(Error::MissingColumn {
                table: PANEL_SCHEMA.table.to_string(),
                column: "engagement".to_string(),
            });
        }
        let has_discount = rows.iter().any(|r| r.discount_pct.is_some());
        if !has_discount {
            return Err(Error::MissingColumn {
                table: PANEL_SCHEMA.table.to_string(),
                column: "discount_pct".to_string(),
            });
        }

        let row_count = rows.len();
        let mut grouped: BTreeMap<u64, Vec<DayObservation>> = BTreeMap::new();
        for row in rows {
            grouped.entry(row.product_id).or_default().push(DayObservation {
                date: row.date,
                engagement: row.engagement,
                discount_pct: row.discount_pct,
            });
        }

        let mut products = BTreeMap::new();
        for (product_id, mut obs) in grouped {
            obs.sort_by_key(|o| o.date);
            // One row per (product, date) is the ingestion collaborator's
            // invariant; keep the first row if it is ever violated.
            obs.dedup_by_key(|o| o.date);
            products.insert(product_id, ProductSeries::new(product_id, obs));
        }

        Ok(Panel { products, row_count })
    }

    /// Per-product series in ascending product id order.
    pub fn products(&self) -> impl Iterator<Item = &ProductSeries> {
        self.products.values()
    }

    pub fn product(&self, product_id: u64) -> Option<&ProductSeries> {
        self.products.get(&product_id)
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

//! Period-over-period comparison of aggregation rows.
//!
//! Rows from the current and prior period are outer-joined on their dimension
//! values, so groups that appear in only one period are reported as entrants
//! (`New`) or exits (`Dropped`) instead of being dropped from the comparison.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregator::{AggregationRow, DimensionValue};

// ── Change types ───────────────────────────────────────────────────────────────

/// Percentage change with an explicit undefined case.
///
/// Division by a zero prior never produces an infinity or NaN; it produces
/// `Undefined`, which serializes distinguishably from any numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PctChange {
    Value(f64),
    Undefined,
}

impl PctChange {
    /// `(current - prior) / prior * 100`, or `Undefined` when the prior is
    /// zero or either side is missing.
    pub fn from_values(current: Option<f64>, prior: Option<f64>) -> Self {
        match (current, prior) {
            (Some(cur), Some(prev)) if prev != 0.0 => {
                PctChange::Value((cur - prev) / prev * 100.0)
            }
            _ => PctChange::Undefined,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            PctChange::Value(v) => Some(*v),
            PctChange::Undefined => None,
        }
    }
}

/// Whether a group exists in one period, the other, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrantStatus {
    /// Present in the current period only.
    New,
    /// Present in the prior period only.
    Dropped,
    /// Present in both periods.
    Continuing,
}

/// Absolute and percentage change of one measure between periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasureDelta {
    pub current: Option<f64>,
    pub prior: Option<f64>,
    /// `current - prior`; absent when either side is missing.
    pub change: Option<f64>,
    pub pct_change: PctChange,
}

impl MeasureDelta {
    fn new(current: Option<f64>, prior: Option<f64>) -> Self {
        let change = match (current, prior) {
            (Some(cur), Some(prev)) => Some(cur - prev),
            _ => None,
        };
        Self {
            current,
            prior,
            change,
            pct_change: PctChange::from_values(current, prior),
        }
    }
}

/// One group's period-over-period movement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaRow {
    pub dimensions: Vec<DimensionValue>,
    pub status: EntrantStatus,
    pub count: MeasureDelta,
    pub sum_quantity: MeasureDelta,
    pub avg_price: MeasureDelta,
}

// ── Comparison ─────────────────────────────────────────────────────────────────

/// Outer-join `current` and `prior` aggregation rows on their dimension
/// values and compute per-measure deltas.
///
/// Both inputs must have been grouped by the same dimensions; rows are joined
/// on the full (dimension, value) key. Output order follows the join key.
pub fn compare(current: &[AggregationRow], prior: &[AggregationRow]) -> Vec<DeltaRow> {
    let current_by_key = index_rows(current);
    let prior_by_key = index_rows(prior);

    let mut keys: BTreeMap<Vec<(&str, &str)>, ()> = BTreeMap::new();
    for key in current_by_key.keys().chain(prior_by_key.keys()) {
        keys.insert(key.clone(), ());
    }

    keys.into_keys()
        .map(|key| {
            let cur = current_by_key.get(&key).copied();
            let prev = prior_by_key.get(&key).copied();
            let status = match (cur, prev) {
                (Some(_), Some(_)) => EntrantStatus::Continuing,
                (Some(_), None) => EntrantStatus::New,
                (None, Some(_)) => EntrantStatus::Dropped,
                (None, None) => unreachable!("key came from one of the inputs"),
            };
            // Dimension values are cloned from whichever side has the row.
            let dimensions = cur
                .or(prev)
                .map(|row| row.dimensions.clone())
                .unwrap_or_default();

            DeltaRow {
                dimensions,
                status,
                count: MeasureDelta::new(
                    cur.map(|r| r.measures.count as f64),
                    prev.map(|r| r.measures.count as f64),
                ),
                sum_quantity: MeasureDelta::new(
                    cur.and_then(|r| r.measures.sum_quantity).map(|q| q as f64),
                    prev.and_then(|r| r.measures.sum_quantity).map(|q| q as f64),
                ),
                avg_price: MeasureDelta::new(
                    cur.and_then(|r| r.measures.avg_price),
                    prev.and_then(|r| r.measures.avg_price),
                ),
            }
        })
        .collect()
}

fn index_rows(rows: &[AggregationRow]) -> BTreeMap<Vec<(&str, &str)>, &AggregationRow> {
    rows.iter()
        .map(|row| {
            let key: Vec<(&str, &str)> = row
                .dimensions
                .iter()
                .map(|dv| (dv.dimension.as_str(), dv.value.as_str()))
                .collect();
            (key, row)
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

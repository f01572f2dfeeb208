//! Report model assembly.
//!
//! `assemble` is pure shaping: it takes pre-computed aggregation rows and
//! deltas, sorts them, attaches price-bucket labels, and wraps everything in
//! a `Serialize`-able [`ReportModel`].  No formatting or encoding happens
//! here; external writers render the model to JSON, text, or spreadsheets.

use std::collections::BTreeMap;

use serde::Serialize;

use mercado_core::buckets::PriceBucket;
use mercado_core::models::PeriodKey;

use crate::aggregator::{AggregationRow, GroupDimension, Measures};
use crate::comparator::DeltaRow;
use crate::normalizer::SkippedRecord;

// ── Run summary ────────────────────────────────────────────────────────────────

/// Ingestion accounting for one run.  Always present in the report, even
/// when nothing was skipped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Raw records seen across all batches.
    pub records_seen: u64,
    /// Records that normalized into observations.
    pub records_accepted: u64,
    /// Records rejected with a per-record error.
    pub records_skipped: u64,
    /// Upserts that replaced an existing observation.
    pub replacements: u64,
    /// Skip counts bucketed by machine reason code.
    pub skipped_by_reason: BTreeMap<String, u64>,
}

impl RunSummary {
    /// Tally skip reasons from the skipped-record listing.
    pub fn tally_reasons(&mut self, skipped: &[SkippedRecord]) {
        for record in skipped {
            *self
                .skipped_by_reason
                .entry(record.reason_code.clone())
                .or_insert(0) += 1;
        }
    }
}

// ── Sections ───────────────────────────────────────────────────────────────────

/// A plain section: sorted rows, optionally with period-over-period deltas.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSection {
    pub rows: Vec<AggregationRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deltas: Option<Vec<DeltaRow>>,
}

/// A price-bucket row carrying the human-readable bucket label.
#[derive(Debug, Clone, Serialize)]
pub struct PriceBucketRow {
    pub bucket: String,
    pub label: String,
    pub measures: Measures,
}

/// Market segmentation: body types and price buckets.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentSection {
    pub by_body_type: Vec<AggregationRow>,
    pub by_price_bucket: Vec<PriceBucketRow>,
}

/// The full report, shaped and sorted, ready for any writer.
#[derive(Debug, Clone, Serialize)]
pub struct ReportModel {
    pub period: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_period: Option<String>,
    pub summary: RunSummary,
    /// Totals per source.
    pub overview: ReportSection,
    pub by_brand: ReportSection,
    /// Brand-tier rollup (volume / premium / luxury).
    pub by_brand_tier: ReportSection,
    pub by_segment: SegmentSection,
    /// Geo-scoped rows: tier-1 cities individually, tier-2 collapsed.
    pub by_geography: ReportSection,
    /// Electric and hybrid rows only.
    pub ev_hybrid: ReportSection,
    pub skipped: Vec<SkippedRecord>,
}

/// Aggregation rows per section, computed by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct SectionRows {
    pub by_source: Vec<AggregationRow>,
    pub by_brand: Vec<AggregationRow>,
    pub by_brand_tier: Vec<AggregationRow>,
    pub by_body_type: Vec<AggregationRow>,
    pub by_price_bucket: Vec<AggregationRow>,
    pub by_geography: Vec<AggregationRow>,
    pub by_fuel: Vec<AggregationRow>,
}

// ── Assembly ───────────────────────────────────────────────────────────────────

/// Shape aggregation output into the final report model.
pub fn assemble(
    period: PeriodKey,
    prior_period: Option<PeriodKey>,
    mut sections: SectionRows,
    brand_deltas: Option<Vec<DeltaRow>>,
    skipped: Vec<SkippedRecord>,
    mut summary: RunSummary,
) -> ReportModel {
    summary.tally_reasons(&skipped);

    sort_rows(&mut sections.by_source);
    sort_rows(&mut sections.by_brand);
    sort_rows(&mut sections.by_brand_tier);
    sort_rows(&mut sections.by_body_type);
    sort_rows(&mut sections.by_geography);

    let by_price_bucket = bucket_rows(sections.by_price_bucket);

    let ev_hybrid_rows: Vec<AggregationRow> = sections
        .by_fuel
        .into_iter()
        .filter(|row| {
            matches!(
                row.value_of(GroupDimension::FuelType),
                Some("electric") | Some("hybrid")
            )
        })
        .collect();

    ReportModel {
        period: period.to_string(),
        prior_period: prior_period.map(|p| p.to_string()),
        summary,
        overview: ReportSection {
            rows: sections.by_source,
            deltas: None,
        },
        by_brand: ReportSection {
            rows: sections.by_brand,
            deltas: brand_deltas,
        },
        by_brand_tier: ReportSection {
            rows: sections.by_brand_tier,
            deltas: None,
        },
        by_segment: SegmentSection {
            by_body_type: sections.by_body_type,
            by_price_bucket,
        },
        by_geography: ReportSection {
            rows: sections.by_geography,
            deltas: None,
        },
        ev_hybrid: ReportSection {
            rows: ev_hybrid_rows,
            deltas: None,
        },
        skipped,
    }
}

/// Stable sort: descending count, then the first dimension value ascending.
fn sort_rows(rows: &mut [AggregationRow]) {
    rows.sort_by(|a, b| {
        b.measures
            .count
            .cmp(&a.measures.count)
            .then_with(|| first_value(a).cmp(first_value(b)))
    });
}

fn first_value(row: &AggregationRow) -> &str {
    row.dimensions.first().map(|dv| dv.value.as_str()).unwrap_or("")
}

/// Price-bucket rows in ascending bucket order, labelled; any unpriced group
/// sorts last.
fn bucket_rows(rows: Vec<AggregationRow>) -> Vec<PriceBucketRow> {
    let mut labelled: Vec<PriceBucketRow> = rows
        .into_iter()
        .map(|row| {
            let bucket = row
                .value_of(GroupDimension::PriceBucket)
                .unwrap_or("")
                .to_string();
            let label = PriceBucket::ALL
                .iter()
                .find(|b| b.as_str() == bucket)
                .map(|b| b.label().to_string())
                .unwrap_or_else(|| "Unpriced".to_string());
            PriceBucketRow {
                bucket,
                label,
                measures: row.measures,
            }
        })
        .collect();
    labelled.sort_by_key(|row| {
        PriceBucket::ALL
            .iter()
            .position(|b| b.as_str() == row.bucket)
            .unwrap_or(PriceBucket::ALL.len())
    });
    labelled
}

// ── Tests ──────────────────────────────────────────────────────────────────────

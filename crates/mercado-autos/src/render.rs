//! Plain-text rendering of the report model for the run summary printed to
//! stdout.  This is deliberately thin: the `ReportModel` stays the single
//! source of truth and richer writers consume its JSON form.

use std::fmt::Write;

use mercado_data::aggregator::AggregationRow;
use mercado_data::comparator::PctChange;
use mercado_data::report::ReportModel;

const RULE: &str = "============================================================";

/// Render the operator-facing run summary.
pub fn render_summary(report: &ReportModel) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "MEXICAN AUTO MARKET REPORT - {}", report.period);
    if let Some(prior) = &report.prior_period {
        let _ = writeln!(out, "Compared against: {prior}");
    }
    let _ = writeln!(out, "{RULE}");

    let s = &report.summary;
    let _ = writeln!(out, "\nRECORDS");
    let _ = writeln!(
        out,
        "  seen: {}  accepted: {}  skipped: {}  replaced: {}",
        s.records_seen, s.records_accepted, s.records_skipped, s.replacements
    );
    for (reason, count) in &s.skipped_by_reason {
        let _ = writeln!(out, "    {reason}: {count}");
    }

    if !report.overview.rows.is_empty() {
        let _ = writeln!(out, "\nBY SOURCE");
        for row in &report.overview.rows {
            let _ = writeln!(out, "  {}", row_line(row));
        }
    }

    if !report.by_brand.rows.is_empty() {
        let _ = writeln!(out, "\nTOP BRANDS");
        for row in report.by_brand.rows.iter().take(10) {
            let _ = writeln!(out, "  {}", row_line(row));
        }
    }

    if let Some(deltas) = &report.by_brand.deltas {
        let _ = writeln!(out, "\nBRAND MOVEMENT");
        for delta in deltas.iter().take(10) {
            let name = delta
                .dimensions
                .first()
                .map(|dv| dv.value.as_str())
                .unwrap_or("?");
            let pct = match delta.count.pct_change {
                PctChange::Value(v) => format!("{v:+.1}%"),
                PctChange::Undefined => "n/a".to_string(),
            };
            let _ = writeln!(out, "  {name}: count {pct} ({:?})", delta.status);
        }
    }

    if !report.by_segment.by_price_bucket.is_empty() {
        let _ = writeln!(out, "\nPRICE SEGMENTS");
        for row in &report.by_segment.by_price_bucket {
            let _ = writeln!(out, "  {}: {}", row.label, row.measures.count);
        }
    }

    if !report.ev_hybrid.rows.is_empty() {
        let _ = writeln!(out, "\nELECTRIFIED");
        for row in &report.ev_hybrid.rows {
            let _ = writeln!(out, "  {}", row_line(row));
        }
    }

    if !report.by_geography.rows.is_empty() {
        let _ = writeln!(out, "\nGEOGRAPHY");
        for row in &report.by_geography.rows {
            let _ = writeln!(out, "  {}", row_line(row));
        }
    }

    let _ = writeln!(out, "\n{RULE}");
    out
}

fn row_line(row: &AggregationRow) -> String {
    let name = row
        .dimensions
        .first()
        .map(|dv| dv.value.as_str())
        .unwrap_or("?");
    let m = &row.measures;
    let mut line = format!("{name}: {} records", m.count);
    if let Some(avg) = m.avg_price {
        let _ = write!(line, ", avg ${avg:.0} MXN");
    }
    if let Some(qty) = m.sum_quantity {
        let _ = write!(line, ", {qty} units");
    }
    line
}

// ── Tests ──────────────────────────────────────────────────────────────────────

//! Top-level run orchestration: normalize, store, aggregate, compare,
//! assemble.
//!
//! Fatal configuration problems (empty canonicalization tables, bad bucket
//! boundaries) abort before any aggregation; per-record problems accumulate
//! into the skipped-records listing and never abort a batch unless the run
//! is strict.

use std::str::FromStr;

use tracing::{debug, info, warn};

use mercado_core::canon::CanonicalTables;
use mercado_core::error::{MarketError, Result};
use mercado_core::models::{PeriodKey, VehicleObservation};
use mercado_core::settings::RunConfig;

use crate::aggregator::{aggregate, AggregateContext, GroupDimension};
use crate::comparator::{compare, DeltaRow};
use crate::normalizer::{normalize_batch, RawRecord};
use crate::report::{assemble, ReportModel, RunSummary, SectionRows};
use crate::store::{FactStore, ObservationFilter};

// ── Options ────────────────────────────────────────────────────────────────────

/// How the prior period for comparisons is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareMode {
    /// Compare against the immediately preceding month.
    #[default]
    MonthOverMonth,
    /// Compare against the same month one year earlier.
    YearOverYear,
    /// No comparison.
    None,
}

impl FromStr for CompareMode {
    type Err = MarketError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "mom" => Ok(CompareMode::MonthOverMonth),
            "yoy" => Ok(CompareMode::YearOverYear),
            "none" => Ok(CompareMode::None),
            other => Err(MarketError::Config(format!(
                "unknown compare mode: {other}"
            ))),
        }
    }
}

/// Per-run pipeline options, resolved from CLI settings by the binary.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// The reporting period; records without their own period default to it.
    pub period: PeriodKey,
    pub compare: CompareMode,
    /// Explicit prior period, overriding the one `compare` implies.
    pub prior_override: Option<PeriodKey>,
    /// Abort on the first per-record error instead of skipping.
    pub strict: bool,
    /// Include estimated (distributed) rows in aggregate metrics.
    pub include_estimated: bool,
}

impl PipelineOptions {
    pub fn new(period: PeriodKey) -> Self {
        Self {
            period,
            compare: CompareMode::default(),
            prior_override: None,
            strict: false,
            include_estimated: false,
        }
    }

    /// The prior period this run compares against, if any.
    pub fn prior_period(&self) -> Option<PeriodKey> {
        if let Some(prior) = self.prior_override {
            return Some(prior);
        }
        match self.compare {
            CompareMode::MonthOverMonth => Some(self.period.pred_month()),
            CompareMode::YearOverYear => Some(self.period.pred_year()),
            CompareMode::None => None,
        }
    }
}

/// Everything a run produces.
#[derive(Debug)]
pub struct PipelineOutput {
    pub report: ReportModel,
    /// The populated fact store, for snapshot persistence by the caller.
    pub store: FactStore,
}

// ── Run ────────────────────────────────────────────────────────────────────────

/// Run the full standardization-and-aggregation pipeline over `records`.
///
/// `prior_store` supplies observations for the comparison period when the
/// current batch does not contain them (typically loaded from a snapshot).
pub fn run(
    records: &[RawRecord],
    prior_store: Option<&FactStore>,
    tables: &CanonicalTables,
    config: &RunConfig,
    options: &PipelineOptions,
) -> Result<PipelineOutput> {
    // Fatal checks first: aggregating against broken reference data would
    // corrupt every downstream number.
    tables.validate()?;
    let buckets = config.price_buckets()?;

    info!(period = %options.period, records = records.len(), "starting pipeline run");

    let outcome = normalize_batch(records, tables, options.period, options.strict)?;
    if !outcome.skipped.is_empty() {
        warn!(
            skipped = outcome.skipped.len(),
            seen = outcome.seen,
            "records skipped during normalization"
        );
    }

    let accepted = outcome.observations.len();
    let store = FactStore::from_observations(outcome.observations);

    let summary = RunSummary {
        records_seen: outcome.seen as u64,
        records_accepted: accepted as u64,
        records_skipped: outcome.skipped.len() as u64,
        replacements: store.replacements(),
        skipped_by_reason: Default::default(),
    };

    let current = store.query(&ObservationFilter::for_period(options.period));
    debug!(observations = current.len(), "aggregating current period");

    let ctx = AggregateContext {
        buckets: &buckets,
        config,
        include_estimated: options.include_estimated,
    };

    let sections = SectionRows {
        by_source: aggregate(&current, &[GroupDimension::Source], &ctx),
        by_brand: aggregate(&current, &[GroupDimension::Brand], &ctx),
        by_brand_tier: aggregate(&current, &[GroupDimension::BrandTier], &ctx),
        by_body_type: aggregate(&current, &[GroupDimension::BodyType], &ctx),
        by_price_bucket: aggregate(&current, &[GroupDimension::PriceBucket], &ctx),
        by_geography: aggregate(&current, &[GroupDimension::GeoScope], &ctx),
        by_fuel: aggregate(&current, &[GroupDimension::FuelType], &ctx),
    };

    let prior_period = options.prior_period();
    let brand_deltas = prior_period
        .map(|prior| compute_brand_deltas(&store, prior_store, prior, &sections.by_brand, &ctx))
        .filter(|deltas| !deltas.is_empty());

    let report = assemble(
        options.period,
        prior_period,
        sections,
        brand_deltas,
        outcome.skipped,
        summary,
    );

    info!(
        accepted = report.summary.records_accepted,
        skipped = report.summary.records_skipped,
        "pipeline run complete"
    );

    Ok(PipelineOutput { report, store })
}

/// Brand-level deltas against the prior period.
///
/// Prior observations come from the dedicated prior store when one was
/// loaded, falling back to the current batch (which may carry both periods).
fn compute_brand_deltas(
    store: &FactStore,
    prior_store: Option<&FactStore>,
    prior_period: PeriodKey,
    current_rows: &[crate::aggregator::AggregationRow],
    ctx: &AggregateContext<'_>,
) -> Vec<DeltaRow> {
    let filter = ObservationFilter::for_period(prior_period);
    let prior_obs: Vec<&VehicleObservation> = match prior_store {
        Some(prior) => prior.query(&filter),
        None => store.query(&filter),
    };
    if prior_obs.is_empty() {
        debug!(period = %prior_period, "no prior observations, skipping comparison");
        return Vec::new();
    }
    let prior_rows = aggregate(&prior_obs, &[GroupDimension::Brand], ctx);
    compare(current_rows, &prior_rows)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

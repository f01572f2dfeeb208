mod bootstrap;
mod render;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Parser;

use mercado_core::canon::{CanonicalTables, TableOverrides};
use mercado_core::models::PeriodKey;
use mercado_core::settings::{RunConfig, Settings};
use mercado_data::pipeline::{self, PipelineOptions};
use mercado_data::reader::read_raw_dir;
use mercado_data::store::FactStore;

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::ensure_directories(&settings)?;
    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("mercado-autos v{} starting", env!("CARGO_PKG_VERSION"));

    let period = settings.period.unwrap_or_else(current_period);

    // Canonicalization tables: built-in defaults, optionally merged with a
    // per-deployment overrides file.
    let tables = match &settings.tables {
        Some(path) => {
            let overrides = TableOverrides::load_from(path)
                .with_context(|| format!("loading table overrides from {}", path.display()))?;
            CanonicalTables::with_overrides(overrides)
        }
        None => CanonicalTables::default(),
    };

    let config_path = settings.config.clone().or_else(bootstrap::discover_config_path);
    let config = match &config_path {
        Some(path) => RunConfig::load_from(path)
            .with_context(|| format!("loading run config from {}", path.display()))?,
        None => RunConfig::default(),
    };

    let raw = read_raw_dir(&settings.data_dir)
        .with_context(|| format!("reading raw records from {}", settings.data_dir.display()))?;
    tracing::info!(
        files = raw.files_read,
        skipped_files = raw.files_skipped,
        records = raw.records.len(),
        "raw records loaded"
    );

    let options = PipelineOptions {
        period,
        compare: settings.compare.parse()?,
        prior_override: settings.prior,
        strict: settings.strict,
        include_estimated: settings.include_estimated,
    };

    // A prior-period snapshot, when one exists, supplies the comparison
    // baseline.  A schema mismatch here is fatal by design.
    let prior_store = match options.prior_period() {
        Some(prior) => {
            let path = settings.snapshot_dir.join(format!("snapshot_{prior}.json"));
            if path.exists() {
                Some(FactStore::load_snapshot(&path).with_context(|| {
                    format!("loading prior snapshot from {}", path.display())
                })?)
            } else {
                tracing::debug!(path = %path.display(), "no prior snapshot found");
                None
            }
        }
        None => None,
    };

    let output = pipeline::run(
        &raw.records,
        prior_store.as_ref(),
        &tables,
        &config,
        &options,
    )?;

    let report_path = settings.output_dir.join(format!("report_{period}.json"));
    let json = serde_json::to_string_pretty(&output.report)?;
    std::fs::write(&report_path, json)
        .with_context(|| format!("writing report to {}", report_path.display()))?;
    tracing::info!(path = %report_path.display(), "report written");

    let snapshot_path = settings.snapshot_dir.join(format!("snapshot_{period}.json"));
    output
        .store
        .save_snapshot(&snapshot_path)
        .with_context(|| format!("saving snapshot to {}", snapshot_path.display()))?;

    print!("{}", render::render_summary(&output.report));

    Ok(())
}

/// The current calendar month, used when no `--period` is given.
fn current_period() -> PeriodKey {
    let now = chrono::Local::now();
    PeriodKey::new(now.year(), now.month())
}

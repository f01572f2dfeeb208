use std::path::PathBuf;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mercado_core::settings::Settings;

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the run's working directories exist.
///
/// Creates (including missing parents):
/// - the raw data directory
/// - the snapshot directory
/// - the report output directory
pub fn ensure_directories(settings: &Settings) -> anyhow::Result<()> {
    std::fs::create_dir_all(&settings.data_dir)?;
    std::fs::create_dir_all(&settings.snapshot_dir)?;
    std::fs::create_dir_all(&settings.output_dir)?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Config discovery ───────────────────────────────────────────────────────────

/// Locate a run configuration file when none was given on the command line.
///
/// Checks `~/.mercado-autos/config.json` and returns it when present.
pub fn discover_config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    let candidate = home.join(".mercado-autos").join("config.json");
    candidate.exists().then_some(candidate)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

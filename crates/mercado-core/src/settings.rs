use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::buckets::{PriceBuckets, DEFAULT_BOUNDARIES};
use crate::error::{MarketError, Result};
use crate::models::{brand_tier, BrandTier, PeriodKey};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Market standardization and reporting for the Mexican auto market
#[derive(Parser, Debug, Clone)]
#[command(
    name = "mercado-autos",
    about = "Standardize raw auto-market records and build segment reports",
    version
)]
pub struct Settings {
    /// Reporting period (YYYY-MM); defaults to the current month
    #[arg(long, value_parser = parse_period)]
    pub period: Option<PeriodKey>,

    /// Prior period to compare against (YYYY-MM); defaults per --compare
    #[arg(long, value_parser = parse_period)]
    pub prior: Option<PeriodKey>,

    /// Period comparison mode
    #[arg(long, default_value = "mom", value_parser = ["mom", "yoy", "none"])]
    pub compare: String,

    /// Directory containing raw record files
    #[arg(long, default_value = "data/raw")]
    pub data_dir: PathBuf,

    /// Directory for fact-store snapshots
    #[arg(long, default_value = "data/processed")]
    pub snapshot_dir: PathBuf,

    /// Directory for report output
    #[arg(long, default_value = "data/outputs")]
    pub output_dir: PathBuf,

    /// Run configuration file (JSON); defaults are used when absent
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Canonicalization table overrides file (JSON)
    #[arg(long)]
    pub tables: Option<PathBuf>,

    /// Abort the batch on the first per-record error instead of skipping
    #[arg(long)]
    pub strict: bool,

    /// Include estimated (distributed) rows in aggregate metrics
    #[arg(long)]
    pub include_estimated: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,
}

fn parse_period(s: &str) -> std::result::Result<PeriodKey, String> {
    PeriodKey::from_str(s).map_err(|e| e.to_string())
}

// ── RunConfig ──────────────────────────────────────────────────────────────────

/// Per-run configuration: price-bucket boundaries, tier-1/tier-2 city lists
/// and brand tier overrides.  All values default to the documented defaults;
/// a JSON file can override any subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Inner price-bucket boundaries in MXN (5 values, strictly increasing).
    pub bucket_boundaries: Vec<f64>,
    /// Cities reported individually in the geography section.
    pub tier1_cities: Vec<String>,
    /// Cities collapsed into a single tier-2 group.
    pub tier2_cities: Vec<String>,
    /// Brand → tier overrides applied over the built-in classification.
    pub brand_tier_overrides: HashMap<String, BrandTier>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            bucket_boundaries: DEFAULT_BOUNDARIES.to_vec(),
            tier1_cities: [
                "Ciudad de México",
                "Guadalajara",
                "Monterrey",
                "Puebla",
                "Querétaro",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            tier2_cities: [
                "León",
                "Mérida",
                "Tijuana",
                "Aguascalientes",
                "Cancún",
                "Toluca",
                "Chihuahua",
                "Hermosillo",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            brand_tier_overrides: HashMap::new(),
        }
    }
}

impl RunConfig {
    /// Load configuration from a JSON file, falling back to defaults for any
    /// absent field.  Validation failures (bad bucket boundaries) are fatal.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| MarketError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RunConfig = serde_json::from_str(&content)?;
        config.price_buckets()?;
        tracing::debug!("loaded run config from {}", path.display());
        Ok(config)
    }

    /// Validated bucket boundaries for this run.
    pub fn price_buckets(&self) -> Result<PriceBuckets> {
        PriceBuckets::new(&self.bucket_boundaries)
    }

    /// Brand tier with config overrides applied over the built-in sets.
    pub fn brand_tier(&self, brand: &str) -> BrandTier {
        if let Some(tier) = self.brand_tier_overrides.get(brand) {
            return *tier;
        }
        brand_tier(brand)
    }

    /// Market-size tier of a canonical city: 1, 2, or `None` when unscoped.
    pub fn city_tier(&self, city: &str) -> Option<u8> {
        if self.tier1_cities.iter().any(|c| c == city) {
            Some(1)
        } else if self.tier2_cities.iter().any(|c| c == city) {
            Some(2)
        } else {
            None
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Settings defaults ─────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["mercado-autos"]);
        assert!(settings.period.is_none());
        assert!(settings.prior.is_none());
        assert_eq!(settings.compare, "mom");
        assert_eq!(settings.data_dir, PathBuf::from("data/raw"));
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.strict);
        assert!(!settings.include_estimated);
    }

    #[test]
    fn test_settings_period_parsing() {
        let settings = Settings::parse_from(["mercado-autos", "--period", "2025-03"]);
        assert_eq!(settings.period, Some(PeriodKey::new(2025, 3)));
    }

    #[test]
    fn test_settings_rejects_bad_period() {
        let result = Settings::try_parse_from(["mercado-autos", "--period", "march-2025"]);
        assert!(result.is_err());
    }

    // ── RunConfig ─────────────────────────────────────────────────────────────

    #[test]
    fn test_run_config_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.bucket_boundaries, DEFAULT_BOUNDARIES.to_vec());
        assert!(config.tier1_cities.contains(&"Guadalajara".to_string()));
        assert!(config.price_buckets().is_ok());
    }

    #[test]
    fn test_run_config_city_tier() {
        let config = RunConfig::default();
        assert_eq!(config.city_tier("Monterrey"), Some(1));
        assert_eq!(config.city_tier("Mérida"), Some(2));
        assert_eq!(config.city_tier("Springfield"), None);
    }

    #[test]
    fn test_run_config_brand_tier_override() {
        let mut config = RunConfig::default();
        config
            .brand_tier_overrides
            .insert("Tesla".to_string(), BrandTier::Premium);
        assert_eq!(config.brand_tier("Tesla"), BrandTier::Premium);
        // Non-overridden brands keep the built-in classification.
        assert_eq!(config.brand_tier("Porsche"), BrandTier::Luxury);
    }

    #[test]
    fn test_run_config_load_partial_file() {
        use std::io::Write;
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("config.json");
        let mut f = std::fs::File::create(&path).expect("create");
        f.write_all(br#"{"tier1_cities": ["Monterrey"]}"#).expect("write");

        let config = RunConfig::load_from(&path).expect("load");
        assert_eq!(config.tier1_cities, vec!["Monterrey".to_string()]);
        // Unspecified fields keep their defaults.
        assert_eq!(config.bucket_boundaries, DEFAULT_BOUNDARIES.to_vec());
    }

    #[test]
    fn test_run_config_load_rejects_bad_buckets() {
        use std::io::Write;
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("config.json");
        let mut f = std::fs::File::create(&path).expect("create");
        f.write_all(br#"{"bucket_boundaries": [3.0, 2.0, 1.0]}"#).expect("write");

        let err = RunConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, MarketError::InvalidBuckets(_)));
    }
}

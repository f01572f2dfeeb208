use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MarketError;

// ── Source kinds ───────────────────────────────────────────────────────────────

/// Which upstream collaborator produced a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Scraped retail new-car catalog (per-listing MSRP rows).
    Catalog,
    /// Government statistical bulletin (aggregate volumes, no pricing).
    GovernmentBulletin,
    /// Internal inventory / sales feed.
    InternalFeed,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Catalog => "catalog",
            SourceKind::GovernmentBulletin => "government_bulletin",
            SourceKind::InternalFeed => "internal_feed",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Dimension enums ────────────────────────────────────────────────────────────

/// Body-type taxonomy shared by all sources.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BodyType {
    Sedan,
    SuvCompact,
    SuvMid,
    SuvFull,
    Pickup,
    Hatchback,
    Van,
    Coupe,
    #[default]
    Unknown,
}

impl BodyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::Sedan => "sedan",
            BodyType::SuvCompact => "suv_compact",
            BodyType::SuvMid => "suv_mid",
            BodyType::SuvFull => "suv_full",
            BodyType::Pickup => "pickup",
            BodyType::Hatchback => "hatchback",
            BodyType::Van => "van",
            BodyType::Coupe => "coupe",
            BodyType::Unknown => "unknown",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Transmission {
    Automatic,
    Manual,
    #[default]
    Unknown,
}

impl Transmission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Automatic => "automatic",
            Transmission::Manual => "manual",
            Transmission::Unknown => "unknown",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Gasoline,
    Diesel,
    Hybrid,
    Electric,
    #[default]
    Unknown,
}

impl FuelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Gasoline => "gasoline",
            FuelType::Diesel => "diesel",
            FuelType::Hybrid => "hybrid",
            FuelType::Electric => "electric",
            FuelType::Unknown => "unknown",
        }
    }
}

// ── Brand tiers ────────────────────────────────────────────────────────────────

/// Market-position classification of a brand.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BrandTier {
    #[default]
    Volume,
    Premium,
    Luxury,
}

impl BrandTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrandTier::Volume => "volume",
            BrandTier::Premium => "premium",
            BrandTier::Luxury => "luxury",
        }
    }
}

const LUXURY_BRANDS: &[&str] = &[
    "PORSCHE",
    "LAND ROVER",
    "LEXUS",
    "JAGUAR",
    "MASERATI",
    "FERRARI",
    "LAMBORGHINI",
    "BENTLEY",
    "ASTON MARTIN",
    "ROLLS-ROYCE",
];

const PREMIUM_BRANDS: &[&str] = &[
    "BMW",
    "MERCEDES-BENZ",
    "MERCEDES",
    "AUDI",
    "VOLVO",
    "MINI",
    "ACURA",
    "INFINITI",
    "LINCOLN",
    "CADILLAC",
    "GENESIS",
];

/// Classify a canonical brand name into its default tier.
///
/// Run configuration may override individual brands; see
/// [`crate::settings::RunConfig::brand_tier`].
pub fn brand_tier(brand: &str) -> BrandTier {
    let upper = brand.to_uppercase();
    if LUXURY_BRANDS.contains(&upper.as_str()) {
        BrandTier::Luxury
    } else if PREMIUM_BRANDS.contains(&upper.as_str()) {
        BrandTier::Premium
    } else {
        BrandTier::Volume
    }
}

// ── Period keys ────────────────────────────────────────────────────────────────

/// A monthly reporting period (`YYYY-MM`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PeriodKey {
    pub year: i32,
    /// 1-based calendar month.
    pub month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month), "month out of range: {month}");
        Self { year, month }
    }

    /// The immediately preceding month (for month-over-month comparisons).
    pub fn pred_month(&self) -> PeriodKey {
        if self.month == 1 {
            PeriodKey::new(self.year - 1, 12)
        } else {
            PeriodKey::new(self.year, self.month - 1)
        }
    }

    /// The same month one year earlier (for year-over-year comparisons).
    pub fn pred_year(&self) -> PeriodKey {
        PeriodKey::new(self.year - 1, self.month)
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = MarketError;

    /// Parse a `"YYYY-MM"` string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MarketError::Config(format!("invalid period (expected YYYY-MM): {s}"));
        let (y, m) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) || !(1900..=2100).contains(&year) {
            return Err(invalid());
        }
        Ok(PeriodKey { year, month })
    }
}

// ── Geography ──────────────────────────────────────────────────────────────────

/// Canonical city/state pair.  Absent on observations whose source only
/// reports nationally (government bulletins).  State-level rows (e.g.
/// distributed EV estimates) carry a state but no city.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Geography {
    #[serde(default)]
    pub city: Option<String>,
    pub state: String,
}

impl Geography {
    /// City-level geography.
    pub fn city(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            state: state.into(),
        }
    }

    /// State-level geography with no city resolution.
    pub fn state_only(state: impl Into<String>) -> Self {
        Self {
            city: None,
            state: state.into(),
        }
    }
}

// ── VehicleObservation ─────────────────────────────────────────────────────────

/// One normalized market fact, post alias-resolution and classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleObservation {
    /// Which collaborator produced the underlying raw record.
    pub source: SourceKind,
    /// Canonical brand name.
    pub brand: String,
    /// Canonical model name.
    pub model: String,
    /// Model year, 1900–2100.
    pub year: i32,
    #[serde(default)]
    pub body_type: BodyType,
    #[serde(default)]
    pub transmission: Transmission,
    #[serde(default)]
    pub fuel_type: FuelType,
    /// Price in MXN.  Absent for sources with no pricing.
    #[serde(default)]
    pub price_mxn: Option<f64>,
    /// Canonical geography; `None` for nationally-scoped records.
    #[serde(default)]
    pub geography: Option<Geography>,
    /// Reporting period this fact belongs to.
    pub observed_at: PeriodKey,
    /// Units produced/sold for aggregate bulletins; absent for per-listing rows.
    #[serde(default)]
    pub quantity: Option<u64>,
    /// Provenance flag: `true` for rows derived by distributing national
    /// totals across states, rather than directly observed.
    #[serde(default)]
    pub estimated: bool,
}

/// The attribute tuple that uniquely identifies a fact for deduplication.
///
/// A later ingestion of the same key replaces the earlier observation
/// (last-write-wins per period).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NaturalKey {
    pub source: SourceKind,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub geography: Option<Geography>,
    pub observed_at: PeriodKey,
}

impl VehicleObservation {
    /// The natural key used for deduplication and replacement.
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            source: self.source,
            brand: self.brand.clone(),
            model: self.model.clone(),
            year: self.year,
            geography: self.geography.clone(),
            observed_at: self.observed_at,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

//! Record normalization: raw source records → canonical [`VehicleObservation`]s.
//!
//! Each source kind has its own field-extraction rule, but all converge on
//! the same observation shape.  Per-record failures never abort a batch:
//! records that fail on a required dimension (brand, year, price where the
//! source carries pricing) are collected into the skipped-records report,
//! while non-critical dimensions degrade to `unknown` and the record is
//! still emitted.  This module performs no I/O.

use serde::{Deserialize, Serialize};
use tracing::debug;

use mercado_core::canon::{CanonicalTables, Dimension};
use mercado_core::classify::{classify_body_type, classify_fuel, classify_transmission};
use mercado_core::error::{MarketError, Result};
use mercado_core::models::{Geography, PeriodKey, SourceKind, VehicleObservation};

/// Canonical model label for bulletin rows reported without a model split.
pub const ALL_MODELS: &str = "(all)";

// ── Raw record shapes ──────────────────────────────────────────────────────────

/// A price as it arrives from upstream: either already numeric or a display
/// string like `"$ 389,900 MXN"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceField {
    Number(f64),
    Text(String),
}

/// One scraped retail-catalog listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCatalogRecord {
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default, alias = "base_price_mxn")]
    pub price_mxn: Option<PriceField>,
    #[serde(default)]
    pub city: Option<String>,
    /// `YYYY-MM`; the run period is used when absent.
    #[serde(default)]
    pub period: Option<String>,
}

/// One government-bulletin row: aggregate volumes, national scope, no
/// pricing.  State-level rows distributed from national totals carry a
/// `state` and `estimated: true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBulletinRecord {
    pub period: String,
    pub brand: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Units for this row (domestic sales in the standard bulletin layout).
    #[serde(alias = "units", alias = "quantity")]
    pub domestic_sales_units: u64,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub estimated: bool,
}

/// One internal inventory/sales feed row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFeedRecord {
    #[serde(default)]
    pub internal_id: Option<String>,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default, alias = "price_mxn")]
    pub list_price_mxn: Option<PriceField>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
}

/// A raw record tagged by its source kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum RawRecord {
    Catalog(RawCatalogRecord),
    GovernmentBulletin(RawBulletinRecord),
    InternalFeed(RawFeedRecord),
}

impl RawRecord {
    pub fn source_kind(&self) -> SourceKind {
        match self {
            RawRecord::Catalog(_) => SourceKind::Catalog,
            RawRecord::GovernmentBulletin(_) => SourceKind::GovernmentBulletin,
            RawRecord::InternalFeed(_) => SourceKind::InternalFeed,
        }
    }

    /// Best-effort human identifier used in the skipped-records report.
    pub fn display_key(&self) -> String {
        match self {
            RawRecord::Catalog(r) => format!("{} {}", r.brand, r.model),
            RawRecord::GovernmentBulletin(r) => {
                format!("{} {} {}", r.period, r.brand, r.model.as_deref().unwrap_or(ALL_MODELS))
            }
            RawRecord::InternalFeed(r) => format!("{} {}", r.brand, r.model),
        }
    }
}

// ── Skipped records ────────────────────────────────────────────────────────────

/// One rejected record, reported for operator review instead of silently
/// dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub source: SourceKind,
    /// Best-effort record identifier (brand/model/period).
    pub key: String,
    /// Truncated JSON snippet of the raw record.
    pub snippet: String,
    /// Human-readable rejection reason.
    pub reason: String,
    /// Machine-friendly reason code for bucketing.
    pub reason_code: String,
}

/// Result of normalizing one batch.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    pub observations: Vec<VehicleObservation>,
    pub skipped: Vec<SkippedRecord>,
    /// Total records seen, accepted or not.
    pub seen: usize,
}

// ── Price parsing ──────────────────────────────────────────────────────────────

/// Parse a price field, stripping currency symbols, thousands separators and
/// an optional `MXN` suffix.  Negative and non-numeric values are rejected,
/// never coerced.
pub fn parse_price(field: &PriceField) -> Result<f64> {
    let value = match field {
        PriceField::Number(n) => *n,
        PriceField::Text(text) => {
            let cleaned = text
                .to_lowercase()
                .replace("mxn", "")
                .replace(['$', ',', ' ', '\u{a0}'], "");
            cleaned
                .parse::<f64>()
                .map_err(|_| MarketError::MalformedPrice(text.clone()))?
        }
    };
    if !value.is_finite() || value < 0.0 {
        return Err(MarketError::MalformedPrice(format!("{field:?}")));
    }
    Ok(value)
}

// ── Field helpers ──────────────────────────────────────────────────────────────

fn required_brand(raw: &str, tables: &CanonicalTables) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(MarketError::MissingRequiredField {
            field: "brand".to_string(),
        });
    }
    tables.resolve(Dimension::Brand, raw)
}

fn required_year(year: Option<i32>) -> Result<i32> {
    let year = year.ok_or_else(|| MarketError::MissingRequiredField {
        field: "year".to_string(),
    })?;
    if !(1900..=2100).contains(&year) {
        return Err(MarketError::UnknownDimensionValue {
            dimension: "year".to_string(),
            value: year.to_string(),
        });
    }
    Ok(year)
}

fn required_price(field: Option<&PriceField>) -> Result<f64> {
    let field = field.ok_or_else(|| MarketError::MissingRequiredField {
        field: "price_mxn".to_string(),
    })?;
    parse_price(field)
}

fn parse_record_period(raw: Option<&str>, default: PeriodKey) -> Result<PeriodKey> {
    match raw {
        None => Ok(default),
        Some(s) => s.parse::<PeriodKey>().map_err(|_| MarketError::UnknownDimensionValue {
            dimension: "period".to_string(),
            value: s.to_string(),
        }),
    }
}

/// Resolve an optional raw city/state pair into canonical geography.
///
/// Geography is non-critical: an unmappable city degrades to the state alone
/// (when present) or to `None`, it never rejects the record.
fn resolve_geography(
    city: Option<&str>,
    state: Option<&str>,
    tables: &CanonicalTables,
) -> Option<Geography> {
    if let Some(raw_city) = city.filter(|c| !c.trim().is_empty()) {
        match tables.resolve(Dimension::City, raw_city) {
            Ok(canonical_city) => {
                let state = tables
                    .state_for_city(&canonical_city)
                    .map(str::to_string)
                    .or_else(|| state.map(|s| tables.resolve_state(s)));
                if let Some(state) = state {
                    return Some(Geography::city(canonical_city, state));
                }
                // Known city without a state mapping: keep the city label.
                return Some(Geography::city(canonical_city.clone(), canonical_city));
            }
            Err(err) => {
                debug!("degrading unmappable city: {err}");
            }
        }
    }
    state
        .filter(|s| !s.trim().is_empty())
        .map(|s| Some(Geography::state_only(tables.resolve_state(s))))
        .unwrap_or(None)
}

// ── Per-source normalization ───────────────────────────────────────────────────

fn normalize_catalog(
    raw: &RawCatalogRecord,
    tables: &CanonicalTables,
    default_period: PeriodKey,
) -> Result<VehicleObservation> {
    let brand = required_brand(&raw.brand, tables)?;
    let model = required_model(&raw.model)?;
    let year = required_year(raw.year)?;
    let price = required_price(raw.price_mxn.as_ref())?;
    let observed_at = parse_record_period(raw.period.as_deref(), default_period)?;

    Ok(VehicleObservation {
        source: SourceKind::Catalog,
        brand,
        model,
        year,
        body_type: classify_body_type(&raw.model, raw.body_type.as_deref(), tables),
        transmission: classify_transmission(raw.transmission.as_deref()),
        fuel_type: classify_fuel(&raw.model, raw.fuel_type.as_deref()),
        price_mxn: Some(price),
        geography: resolve_geography(raw.city.as_deref(), None, tables),
        observed_at,
        quantity: None,
        estimated: false,
    })
}

fn normalize_bulletin(
    raw: &RawBulletinRecord,
    tables: &CanonicalTables,
) -> Result<VehicleObservation> {
    let brand = required_brand(&raw.brand, tables)?;
    let observed_at: PeriodKey =
        raw.period
            .parse()
            .map_err(|_| MarketError::UnknownDimensionValue {
                dimension: "period".to_string(),
                value: raw.period.clone(),
            })?;
    let model = match raw.model.as_deref() {
        Some(m) if !m.trim().is_empty() => m.trim().to_string(),
        _ => ALL_MODELS.to_string(),
    };

    let geography = raw
        .state
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| Geography::state_only(tables.resolve_state(s)));

    Ok(VehicleObservation {
        source: SourceKind::GovernmentBulletin,
        brand,
        model: model.clone(),
        // Bulletins report by calendar period, not model year.
        year: observed_at.year,
        body_type: classify_body_type(&model, None, tables),
        transmission: Default::default(),
        fuel_type: classify_fuel(&model, raw.fuel_type.as_deref()),
        price_mxn: None,
        geography,
        observed_at,
        quantity: Some(raw.domestic_sales_units),
        estimated: raw.estimated,
    })
}

fn normalize_feed(
    raw: &RawFeedRecord,
    tables: &CanonicalTables,
    default_period: PeriodKey,
) -> Result<VehicleObservation> {
    let brand = required_brand(&raw.brand, tables)?;
    let model = required_model(&raw.model)?;
    let year = required_year(raw.year)?;
    let price = required_price(raw.list_price_mxn.as_ref())?;
    let observed_at = parse_record_period(raw.period.as_deref(), default_period)?;

    Ok(VehicleObservation {
        source: SourceKind::InternalFeed,
        brand,
        model,
        year,
        body_type: classify_body_type(&raw.model, raw.body_type.as_deref(), tables),
        transmission: classify_transmission(raw.transmission.as_deref()),
        fuel_type: classify_fuel(&raw.model, raw.fuel_type.as_deref()),
        price_mxn: Some(price),
        geography: resolve_geography(raw.city.as_deref(), raw.state.as_deref(), tables),
        observed_at,
        quantity: None,
        estimated: false,
    })
}

fn required_model(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MarketError::MissingRequiredField {
            field: "model".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

// ── Public API ─────────────────────────────────────────────────────────────────

/// Normalize a single raw record of any source kind.
pub fn normalize(
    raw: &RawRecord,
    tables: &CanonicalTables,
    default_period: PeriodKey,
) -> Result<VehicleObservation> {
    match raw {
        RawRecord::Catalog(r) => normalize_catalog(r, tables, default_period),
        RawRecord::GovernmentBulletin(r) => normalize_bulletin(r, tables),
        RawRecord::InternalFeed(r) => normalize_feed(r, tables, default_period),
    }
}

/// Normalize a whole batch, collecting per-record failures into the
/// skipped-records report.  With `strict`, the first per-record error aborts
/// the batch instead.
pub fn normalize_batch(
    records: &[RawRecord],
    tables: &CanonicalTables,
    default_period: PeriodKey,
    strict: bool,
) -> Result<NormalizeOutcome> {
    let mut outcome = NormalizeOutcome {
        seen: records.len(),
        ..Default::default()
    };

    for record in records {
        match normalize(record, tables, default_period) {
            Ok(obs) => outcome.observations.push(obs),
            Err(err) if err.is_per_record() && !strict => {
                debug!("skipping record {}: {err}", record.display_key());
                outcome.skipped.push(SkippedRecord {
                    source: record.source_kind(),
                    key: record.display_key(),
                    snippet: snippet_of(record),
                    reason: err.to_string(),
                    reason_code: err.reason_code().to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(outcome)
}

/// Truncated JSON rendering of a raw record for the skipped report.
fn snippet_of(record: &RawRecord) -> String {
    const MAX: usize = 160;
    let json = serde_json::to_string(record).unwrap_or_else(|_| "<unserializable>".to_string());
    if json.chars().count() <= MAX {
        json
    } else {
        let truncated: String = json.chars().take(MAX).collect();
        format!("{truncated}…")
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mercado_core::models::{BodyType, FuelType, Transmission};

    fn tables() -> CanonicalTables {
        CanonicalTables::default()
    }

    fn period() -> PeriodKey {
        PeriodKey::new(2025, 1)
    }

    fn make_catalog(brand: &str, model: &str) -> RawCatalogRecord {
        RawCatalogRecord {
            brand: brand.to_string(),
            model: model.to_string(),
            year: Some(2025),
            body_type: None,
            transmission: None,
            fuel_type: None,
            price_mxn: Some(PriceField::Number(389_900.0)),
            city: None,
            period: None,
        }
    }

    // ── parse_price ───────────────────────────────────────────────────────────

    #[test]
    fn test_parse_price_numeric() {
        assert_eq!(parse_price(&PriceField::Number(250_000.0)).unwrap(), 250_000.0);
    }

    #[test]
    fn test_parse_price_strips_formatting() {
        let price = parse_price(&PriceField::Text("$ 389,900 MXN".to_string())).unwrap();
        assert_eq!(price, 389_900.0);
    }

    #[test]
    fn test_parse_price_rejects_negative() {
        assert!(matches!(
            parse_price(&PriceField::Number(-1.0)),
            Err(MarketError::MalformedPrice(_))
        ));
        assert!(matches!(
            parse_price(&PriceField::Text("-250000".to_string())),
            Err(MarketError::MalformedPrice(_))
        ));
    }

    #[test]
    fn test_parse_price_rejects_non_numeric() {
        assert!(matches!(
            parse_price(&PriceField::Text("consultar precio".to_string())),
            Err(MarketError::MalformedPrice(_))
        ));
    }

    // ── Catalog round-trip ────────────────────────────────────────────────────

    #[test]
    fn test_catalog_round_trip_canonical_fields() {
        let raw = RawCatalogRecord {
            brand: "vw".to_string(),
            model: "Taos".to_string(),
            year: Some(2025),
            body_type: Some("SUV Compacta".to_string()),
            transmission: Some("Automática".to_string()),
            fuel_type: Some("Gasolina".to_string()),
            price_mxn: Some(PriceField::Text("$489,990".to_string())),
            city: Some("guadalajara".to_string()),
            period: Some("2025-02".to_string()),
        };
        let obs = normalize(&RawRecord::Catalog(raw), &tables(), period()).unwrap();

        assert_eq!(obs.source, SourceKind::Catalog);
        assert_eq!(obs.brand, "Volkswagen");
        assert_eq!(obs.model, "Taos");
        assert_eq!(obs.body_type, BodyType::SuvCompact);
        assert_eq!(obs.transmission, Transmission::Automatic);
        assert_eq!(obs.fuel_type, FuelType::Gasoline);
        assert_eq!(obs.price_mxn, Some(489_990.0));
        let geo = obs.geography.unwrap();
        assert_eq!(geo.city.as_deref(), Some("Guadalajara"));
        assert_eq!(geo.state, "Jalisco");
        assert_eq!(obs.observed_at, PeriodKey::new(2025, 2));
        assert!(obs.quantity.is_none());
        assert!(!obs.estimated);
    }

    #[test]
    fn test_catalog_missing_price_is_rejected() {
        let mut raw = make_catalog("Toyota", "Corolla");
        raw.price_mxn = None;
        let err = normalize(&RawRecord::Catalog(raw), &tables(), period()).unwrap_err();
        assert!(matches!(err, MarketError::MissingRequiredField { .. }));
    }

    #[test]
    fn test_catalog_missing_brand_is_rejected() {
        let mut raw = make_catalog(" ", "Corolla");
        raw.brand = "  ".to_string();
        let err = normalize(&RawRecord::Catalog(raw), &tables(), period()).unwrap_err();
        assert!(matches!(err, MarketError::MissingRequiredField { field } if field == "brand"));
    }

    #[test]
    fn test_catalog_year_out_of_range_rejected() {
        let mut raw = make_catalog("Toyota", "Corolla");
        raw.year = Some(1850);
        let err = normalize(&RawRecord::Catalog(raw), &tables(), period()).unwrap_err();
        assert!(matches!(err, MarketError::UnknownDimensionValue { .. }));
    }

    #[test]
    fn test_catalog_unknown_city_degrades_to_no_geography() {
        let mut raw = make_catalog("Toyota", "Corolla");
        raw.city = Some("Villaperdida".to_string());
        let obs = normalize(&RawRecord::Catalog(raw), &tables(), period()).unwrap();
        assert!(obs.geography.is_none());
    }

    #[test]
    fn test_catalog_misspelled_city_resolves_via_alias() {
        let mut raw = make_catalog("Toyota", "Corolla");
        raw.city = Some("Guadalaxara".to_string());
        let obs = normalize(&RawRecord::Catalog(raw), &tables(), period()).unwrap();
        let geo = obs.geography.unwrap();
        assert_eq!(geo.city.as_deref(), Some("Guadalajara"));
    }

    #[test]
    fn test_catalog_unknown_body_type_degrades() {
        let mut raw = make_catalog("Toyota", "Modelo Q");
        raw.body_type = Some("aerodeslizador".to_string());
        let obs = normalize(&RawRecord::Catalog(raw), &tables(), period()).unwrap();
        assert_eq!(obs.body_type, BodyType::Unknown);
    }

    #[test]
    fn test_catalog_concatenated_brand_repair() {
        let raw = make_catalog("Toyotacorolla", "Corolla");
        let obs = normalize(&RawRecord::Catalog(raw), &tables(), period()).unwrap();
        assert_eq!(obs.brand, "Toyota");
    }

    // ── Bulletin ──────────────────────────────────────────────────────────────

    #[test]
    fn test_bulletin_normalization() {
        let raw = RawBulletinRecord {
            period: "2025-01".to_string(),
            brand: "nissan".to_string(),
            model: None,
            domestic_sales_units: 50_000,
            fuel_type: None,
            state: None,
            estimated: false,
        };
        let obs = normalize(&RawRecord::GovernmentBulletin(raw), &tables(), period()).unwrap();

        assert_eq!(obs.source, SourceKind::GovernmentBulletin);
        assert_eq!(obs.brand, "Nissan");
        assert_eq!(obs.model, ALL_MODELS);
        assert_eq!(obs.quantity, Some(50_000));
        assert!(obs.price_mxn.is_none());
        assert!(obs.geography.is_none());
        assert_eq!(obs.observed_at, PeriodKey::new(2025, 1));
        assert_eq!(obs.year, 2025);
    }

    #[test]
    fn test_bulletin_estimated_state_row() {
        let raw = RawBulletinRecord {
            period: "2025-01".to_string(),
            brand: "BYD".to_string(),
            model: None,
            domestic_sales_units: 1_200,
            fuel_type: Some("electric".to_string()),
            state: Some("nuevo leon".to_string()),
            estimated: true,
        };
        let obs = normalize(&RawRecord::GovernmentBulletin(raw), &tables(), period()).unwrap();

        assert!(obs.estimated);
        assert_eq!(obs.fuel_type, FuelType::Electric);
        let geo = obs.geography.unwrap();
        assert!(geo.city.is_none());
        assert_eq!(geo.state, "Nuevo León");
    }

    #[test]
    fn test_bulletin_bad_period_rejected() {
        let raw = RawBulletinRecord {
            period: "enero".to_string(),
            brand: "Nissan".to_string(),
            model: None,
            domestic_sales_units: 10,
            fuel_type: None,
            state: None,
            estimated: false,
        };
        let err = normalize(&RawRecord::GovernmentBulletin(raw), &tables(), period()).unwrap_err();
        assert!(matches!(err, MarketError::UnknownDimensionValue { .. }));
    }

    // ── Feed ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_feed_normalization() {
        let raw = RawFeedRecord {
            internal_id: Some("K-1042".to_string()),
            brand: "mazda".to_string(),
            model: "CX-5".to_string(),
            year: Some(2022),
            body_type: None,
            transmission: Some("automatica".to_string()),
            fuel_type: None,
            list_price_mxn: Some(PriceField::Number(415_000.0)),
            city: Some("monterrey".to_string()),
            state: None,
            period: None,
        };
        let obs = normalize(&RawRecord::InternalFeed(raw), &tables(), period()).unwrap();

        assert_eq!(obs.source, SourceKind::InternalFeed);
        assert_eq!(obs.brand, "Mazda");
        assert_eq!(obs.body_type, BodyType::SuvMid);
        assert_eq!(obs.geography.unwrap().state, "Nuevo León");
        // No period on the record: falls back to the run period.
        assert_eq!(obs.observed_at, period());
    }

    #[test]
    fn test_feed_unknown_city_keeps_state() {
        let raw = RawFeedRecord {
            internal_id: None,
            brand: "Kia".to_string(),
            model: "Rio".to_string(),
            year: Some(2023),
            body_type: None,
            transmission: None,
            fuel_type: None,
            list_price_mxn: Some(PriceField::Number(280_000.0)),
            city: Some("Villaperdida".to_string()),
            state: Some("qroo".to_string()),
            period: None,
        };
        let obs = normalize(&RawRecord::InternalFeed(raw), &tables(), period()).unwrap();
        let geo = obs.geography.unwrap();
        assert!(geo.city.is_none());
        assert_eq!(geo.state, "Quintana Roo");
    }

    // ── Batch behavior ────────────────────────────────────────────────────────

    #[test]
    fn test_batch_collects_skipped_and_continues() {
        let mut bad = make_catalog("Honda", "Civic");
        bad.price_mxn = Some(PriceField::Text("no disponible".to_string()));
        let records = vec![
            RawRecord::Catalog(make_catalog("Toyota", "Corolla")),
            RawRecord::Catalog(bad),
            RawRecord::Catalog(make_catalog("Nissan", "Versa")),
        ];

        let outcome = normalize_batch(&records, &tables(), period(), false).unwrap();
        assert_eq!(outcome.seen, 3);
        assert_eq!(outcome.observations.len(), 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].reason_code, "malformed_price");
        assert!(outcome.skipped[0].key.contains("Civic"));
        assert!(!outcome.skipped[0].snippet.is_empty());
    }

    #[test]
    fn test_batch_strict_aborts_on_first_error() {
        let mut bad = make_catalog("Honda", "Civic");
        bad.price_mxn = None;
        let records = vec![
            RawRecord::Catalog(make_catalog("Toyota", "Corolla")),
            RawRecord::Catalog(bad),
        ];

        let err = normalize_batch(&records, &tables(), period(), true).unwrap_err();
        assert!(matches!(err, MarketError::MissingRequiredField { .. }));
    }

    #[test]
    fn test_batch_empty() {
        let outcome = normalize_batch(&[], &tables(), period(), false).unwrap();
        assert_eq!(outcome.seen, 0);
        assert!(outcome.observations.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    // ── Tagged serde shape ────────────────────────────────────────────────────

    #[test]
    fn test_raw_record_tagged_deserialization() {
        let json = r#"{
            "source": "government_bulletin",
            "period": "2025-01",
            "brand": "Toyota",
            "quantity": 50000
        }"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        match record {
            RawRecord::GovernmentBulletin(b) => {
                assert_eq!(b.domestic_sales_units, 50_000);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}

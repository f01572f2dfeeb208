//! Canonicalization tables: raw variant strings → canonical labels.
//!
//! The domain is Mexican Spanish text with inconsistent diacritics and
//! capitalization, so every lookup key is folded (lowercased, accent-stripped,
//! whitespace-collapsed) before consulting a table.  Tables are built once per
//! run from the built-in defaults, optionally merged with a JSON overrides
//! file, and treated as immutable afterwards.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::{MarketError, Result};
use crate::models::BodyType;

// ── Dimension ──────────────────────────────────────────────────────────────────

/// The dimensions that have a canonicalization table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    City,
    Brand,
    BodyType,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::City => "city",
            Dimension::Brand => "brand",
            Dimension::BodyType => "body_type",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Built-in tables ────────────────────────────────────────────────────────────

/// Folded alias → canonical brand name.
const BRAND_ALIASES: &[(&str, &str)] = &[
    ("mercedes", "Mercedes-Benz"),
    ("mercedes benz", "Mercedes-Benz"),
    ("mercedes-benz", "Mercedes-Benz"),
    ("vw", "Volkswagen"),
    ("chevy", "Chevrolet"),
    ("gm", "Chevrolet"),
    ("land-rover", "Land Rover"),
    ("landrover", "Land Rover"),
    ("land rover", "Land Rover"),
    ("aston-martin", "Aston Martin"),
    ("astonmartin", "Aston Martin"),
    ("alfa-romeo", "Alfa Romeo"),
    ("alfaromeo", "Alfa Romeo"),
    ("rolls-royce", "Rolls-Royce"),
    ("rollsroyce", "Rolls-Royce"),
    ("byd", "BYD"),
    ("gwm", "GWM"),
    ("great wall", "GWM"),
    ("jac", "JAC"),
    ("mg", "MG"),
    ("changan", "Changan"),
    ("chirey", "Chirey"),
    ("geely", "Geely"),
    ("baic", "BAIC"),
    ("faw", "FAW"),
    ("haval", "Haval"),
    ("toyota", "Toyota"),
    ("honda", "Honda"),
    ("nissan", "Nissan"),
    ("mazda", "Mazda"),
    ("mitsubishi", "Mitsubishi"),
    ("subaru", "Subaru"),
    ("suzuki", "Suzuki"),
    ("infiniti", "Infiniti"),
    ("lexus", "Lexus"),
    ("acura", "Acura"),
    ("hyundai", "Hyundai"),
    ("kia", "Kia"),
    ("genesis", "Genesis"),
    ("ford", "Ford"),
    ("chevrolet", "Chevrolet"),
    ("dodge", "Dodge"),
    ("jeep", "Jeep"),
    ("ram", "RAM"),
    ("lincoln", "Lincoln"),
    ("cadillac", "Cadillac"),
    ("gmc", "GMC"),
    ("buick", "Buick"),
    ("chrysler", "Chrysler"),
    ("bmw", "BMW"),
    ("audi", "Audi"),
    ("volkswagen", "Volkswagen"),
    ("porsche", "Porsche"),
    ("volvo", "Volvo"),
    ("mini", "MINI"),
    ("seat", "SEAT"),
    ("cupra", "Cupra"),
    ("skoda", "Skoda"),
    ("peugeot", "Peugeot"),
    ("renault", "Renault"),
    ("citroen", "Citroën"),
    ("fiat", "Fiat"),
    ("ferrari", "Ferrari"),
    ("lamborghini", "Lamborghini"),
    ("maserati", "Maserati"),
    ("jaguar", "Jaguar"),
    ("tesla", "Tesla"),
];

/// Folded city variant → canonical city name.  Includes identity entries for
/// every known city plus common misspellings.
const CITY_ALIASES: &[(&str, &str)] = &[
    ("ciudad de mexico", "Ciudad de México"),
    ("cdmx", "Ciudad de México"),
    ("df", "Ciudad de México"),
    ("mexico city", "Ciudad de México"),
    ("guadalajara", "Guadalajara"),
    ("guadalaxara", "Guadalajara"),
    ("gdl", "Guadalajara"),
    ("monterrey", "Monterrey"),
    ("monterey", "Monterrey"),
    ("mty", "Monterrey"),
    ("puebla", "Puebla"),
    ("queretaro", "Querétaro"),
    ("leon", "León"),
    ("merida", "Mérida"),
    ("tijuana", "Tijuana"),
    ("aguascalientes", "Aguascalientes"),
    ("cancun", "Cancún"),
    ("cuernavaca", "Cuernavaca"),
    ("morelia", "Morelia"),
    ("san luis potosi", "San Luis Potosí"),
    ("toluca", "Toluca"),
    ("chihuahua", "Chihuahua"),
    ("hermosillo", "Hermosillo"),
];

/// Folded canonical city → state name.
const CITY_STATES: &[(&str, &str)] = &[
    ("ciudad de mexico", "Ciudad de México"),
    ("guadalajara", "Jalisco"),
    ("monterrey", "Nuevo León"),
    ("puebla", "Puebla"),
    ("queretaro", "Querétaro"),
    ("leon", "Guanajuato"),
    ("merida", "Yucatán"),
    ("tijuana", "Baja California"),
    ("aguascalientes", "Aguascalientes"),
    ("cancun", "Quintana Roo"),
    ("cuernavaca", "Morelos"),
    ("morelia", "Michoacán"),
    ("san luis potosi", "San Luis Potosí"),
    ("toluca", "Estado de México"),
    ("chihuahua", "Chihuahua"),
    ("hermosillo", "Sonora"),
];

/// Folded state variant → canonical state name.
const STATE_ALIASES: &[(&str, &str)] = &[
    ("cdmx", "Ciudad de México"),
    ("ciudad de mexico", "Ciudad de México"),
    ("df", "Ciudad de México"),
    ("distrito federal", "Ciudad de México"),
    ("edomex", "Estado de México"),
    ("edo. mex.", "Estado de México"),
    ("estado de mexico", "Estado de México"),
    ("nl", "Nuevo León"),
    ("nuevo leon", "Nuevo León"),
    ("bc", "Baja California"),
    ("baja california norte", "Baja California"),
    ("bcs", "Baja California Sur"),
    ("qroo", "Quintana Roo"),
    ("q. roo", "Quintana Roo"),
    ("slp", "San Luis Potosí"),
    ("san luis potosi", "San Luis Potosí"),
    ("ags", "Aguascalientes"),
    ("jalisco", "Jalisco"),
    ("queretaro", "Querétaro"),
    ("guanajuato", "Guanajuato"),
    ("yucatan", "Yucatán"),
    ("sonora", "Sonora"),
    ("morelos", "Morelos"),
    ("michoacan", "Michoacán"),
];

/// Folded raw body-type label → canonical body type.
const BODY_TYPE_LABELS: &[(&str, BodyType)] = &[
    ("sedan", BodyType::Sedan),
    ("berlina", BodyType::Sedan),
    ("suv compacta", BodyType::SuvCompact),
    ("suv compacto", BodyType::SuvCompact),
    ("compact suv", BodyType::SuvCompact),
    ("crossover", BodyType::SuvCompact),
    ("suv mediana", BodyType::SuvMid),
    ("suv mediano", BodyType::SuvMid),
    ("mid suv", BodyType::SuvMid),
    ("midsize suv", BodyType::SuvMid),
    ("suv grande", BodyType::SuvFull),
    ("full suv", BodyType::SuvFull),
    ("full-size suv", BodyType::SuvFull),
    ("pickup", BodyType::Pickup),
    ("pick-up", BodyType::Pickup),
    ("pick up", BodyType::Pickup),
    ("camioneta", BodyType::Pickup),
    ("hatchback", BodyType::Hatchback),
    ("hatch", BodyType::Hatchback),
    ("van", BodyType::Van),
    ("minivan", BodyType::Van),
    ("coupe", BodyType::Coupe),
    ("deportivo", BodyType::Coupe),
    ("convertible", BodyType::Coupe),
];

// ── Overrides file ─────────────────────────────────────────────────────────────

/// JSON shape of a mapping-overrides file.  Every map is raw variant →
/// canonical label; entries are merged over the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableOverrides {
    #[serde(default)]
    pub brand_aliases: HashMap<String, String>,
    #[serde(default)]
    pub city_aliases: HashMap<String, String>,
    #[serde(default)]
    pub city_states: HashMap<String, String>,
    #[serde(default)]
    pub state_aliases: HashMap<String, String>,
    #[serde(default)]
    pub body_types: HashMap<String, BodyType>,
}

impl TableOverrides {
    /// Load overrides from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| MarketError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let overrides: TableOverrides = serde_json::from_str(&content)?;
        debug!(
            brands = overrides.brand_aliases.len(),
            cities = overrides.city_aliases.len(),
            "loaded table overrides from {}",
            path.display()
        );
        Ok(overrides)
    }
}

// ── CanonicalTables ────────────────────────────────────────────────────────────

/// The static reference tables consulted by every normalizer variant.
///
/// `resolve` fails with [`MarketError::UnknownDimensionValue`] when no mapping
/// exists and no fallback rule applies; whether that skips the record or
/// degrades the field is the caller's policy, not this module's.
pub struct CanonicalTables {
    brand_aliases: HashMap<String, String>,
    city_aliases: HashMap<String, String>,
    city_states: HashMap<String, String>,
    state_aliases: HashMap<String, String>,
    body_types: HashMap<String, BodyType>,
    strip_re: Regex,
    ws_re: Regex,
}

impl Default for CanonicalTables {
    fn default() -> Self {
        Self::with_overrides(TableOverrides::default())
    }
}

impl CanonicalTables {
    /// Build the default tables merged with `overrides`.
    pub fn with_overrides(overrides: TableOverrides) -> Self {
        let strip_re = Regex::new(r"[^a-z0-9\s\-\.]").expect("regex is valid");
        let ws_re = Regex::new(r"\s+").expect("regex is valid");

        let mut tables = Self {
            brand_aliases: BRAND_ALIASES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            city_aliases: CITY_ALIASES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            city_states: CITY_STATES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            state_aliases: STATE_ALIASES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body_types: BODY_TYPE_LABELS
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            strip_re,
            ws_re,
        };

        // Overrides win over defaults; keys are folded on insertion so that
        // file entries need not match casing/diacritics exactly.
        for (k, v) in overrides.brand_aliases {
            let key = tables.fold(&k);
            tables.brand_aliases.insert(key, v);
        }
        for (k, v) in overrides.city_aliases {
            let key = tables.fold(&k);
            tables.city_aliases.insert(key, v);
        }
        for (k, v) in overrides.city_states {
            let key = tables.fold(&k);
            tables.city_states.insert(key, v);
        }
        for (k, v) in overrides.state_aliases {
            let key = tables.fold(&k);
            tables.state_aliases.insert(key, v);
        }
        for (k, v) in overrides.body_types {
            let key = tables.fold(&k);
            tables.body_types.insert(key, v);
        }

        tables
    }

    /// Fatal check performed once at run start: partial aggregation over an
    /// inconsistent table set is worse than failing fast.
    pub fn validate(&self) -> Result<()> {
        if self.brand_aliases.is_empty() {
            return Err(MarketError::EmptyDimensionTable("brand".to_string()));
        }
        if self.city_aliases.is_empty() {
            return Err(MarketError::EmptyDimensionTable("city".to_string()));
        }
        if self.body_types.is_empty() {
            return Err(MarketError::EmptyDimensionTable("body_type".to_string()));
        }
        Ok(())
    }

    /// Fold a raw value into a lookup key: lowercase, accents stripped,
    /// punctuation removed, whitespace collapsed.
    pub fn fold(&self, raw: &str) -> String {
        let lower = raw.trim().to_lowercase();
        let deaccented = strip_accents(&lower);
        let stripped = self.strip_re.replace_all(&deaccented, "");
        self.ws_re.replace_all(stripped.trim(), " ").into_owned()
    }

    /// Resolve a raw value for `dimension` into its canonical label.
    pub fn resolve(&self, dimension: Dimension, raw: &str) -> Result<String> {
        let unknown = || MarketError::UnknownDimensionValue {
            dimension: dimension.as_str().to_string(),
            value: raw.to_string(),
        };
        let key = self.fold(raw);
        if key.is_empty() {
            return Err(unknown());
        }
        match dimension {
            Dimension::Brand => Ok(self.resolve_brand_key(&key, raw)),
            Dimension::City => self.city_aliases.get(&key).cloned().ok_or_else(unknown),
            Dimension::BodyType => self
                .body_types
                .get(&key)
                .map(|bt| bt.as_str().to_string())
                .ok_or_else(unknown),
        }
    }

    /// Typed body-type resolution used by the classifier.
    pub fn resolve_body_type(&self, raw: &str) -> Option<BodyType> {
        self.body_types.get(&self.fold(raw)).copied()
    }

    /// Canonical state for a canonical city, when known.
    pub fn state_for_city(&self, city: &str) -> Option<&str> {
        self.city_states.get(&self.fold(city)).map(String::as_str)
    }

    /// Normalize a raw state name.  Unmapped states fall back to title case
    /// (states are a non-critical dimension).
    pub fn resolve_state(&self, raw: &str) -> String {
        let key = self.fold(raw);
        self.state_aliases
            .get(&key)
            .cloned()
            .unwrap_or_else(|| title_case(raw.trim()))
    }

    /// Brand resolution with its two fallback rules: a concatenated
    /// brand+model token ("Toyotacorolla") repairs to its brand prefix, and
    /// any other unmapped value falls back to title case.
    fn resolve_brand_key(&self, key: &str, raw: &str) -> String {
        if let Some(canonical) = self.brand_aliases.get(key) {
            return canonical.clone();
        }
        // Longest-prefix repair against the known alias keys.
        let mut best: Option<(usize, &str)> = None;
        for (alias, canonical) in &self.brand_aliases {
            if key.starts_with(alias.as_str())
                && key.len() > alias.len()
                && best.map_or(true, |(len, _)| alias.len() > len)
            {
                best = Some((alias.len(), canonical));
            }
        }
        if let Some((_, canonical)) = best {
            return canonical.to_string();
        }
        title_case(raw.trim())
    }
}

// ── Text helpers ───────────────────────────────────────────────────────────────

/// Replace Spanish accented characters with their ASCII base letters.
fn strip_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Uppercase the first letter of every whitespace-separated word.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Tests ──────────────────────────────────────────────────────────────────────

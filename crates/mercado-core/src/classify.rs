//! Deterministic keyword classification for body type, fuel type and
//! transmission.
//!
//! Precedence is fixed: an exact raw-label match against the canonical
//! tables wins, then keyword heuristics over the raw hint, then keyword
//! heuristics over the model name, then `Unknown`.  Within a rule table the
//! first matching rule in declaration order wins; the declaration order below
//! is therefore part of the contract and must not be reshuffled casually.

use crate::canon::CanonicalTables;
use crate::models::{BodyType, FuelType, Transmission};

// ── Body type rules ────────────────────────────────────────────────────────────

/// Keyword rules in declaration order.  A model name containing tokens from
/// several rules (e.g. an "SUV Coupe" trim) resolves to the earliest rule.
const BODY_TYPE_RULES: &[(BodyType, &[&str])] = &[
    (
        BodyType::Sedan,
        &[
            "sedan", "sedán", "sentra", "versa", "jetta", "civic", "corolla", "mazda3", "mazda 3",
            "aveo", "onix",
        ],
    ),
    (
        BodyType::SuvCompact,
        &[
            "kicks", "hr-v", "hrv", "cx-30", "cx30", "venue", "kona", "seltos", "tracker",
            "t-cross", "tcross", "magnite",
        ],
    ),
    (
        BodyType::SuvMid,
        &[
            "cr-v", "crv", "rav4", "tiguan", "cx-5", "cx5", "tucson", "sportage", "equinox",
            "escape", "x-trail", "xtrail",
        ],
    ),
    (
        BodyType::SuvFull,
        &[
            "pilot", "tahoe", "durango", "expedition", "pathfinder", "palisade", "telluride",
            "4runner", "sequoia",
        ],
    ),
    (
        BodyType::Pickup,
        &[
            "pickup", "pick-up", "pick up", "hilux", "ranger", "colorado", "frontier", "np300",
            "tacoma", "f-150", "f150", "silverado", "ram",
        ],
    ),
    (
        BodyType::Hatchback,
        &[
            "hatchback", "hatch", "fit", "polo", "mazda2", "mazda 2", "rio", "accent", "i10",
            "march", "note",
        ],
    ),
    (
        BodyType::Van,
        &[
            "van", "minivan", "sienna", "odyssey", "pacifica", "carnival", "transit", "urvan",
        ],
    ),
    (
        BodyType::Coupe,
        &[
            "coupe", "coupé", "mustang", "camaro", "86", "supra", "370z", "miata", "mx-5",
        ],
    ),
];

/// Classify the body type from the model name and an optional raw hint.
pub fn classify_body_type(
    model_name: &str,
    hint: Option<&str>,
    tables: &CanonicalTables,
) -> BodyType {
    // 1. Exact raw-label match on the hint.
    if let Some(h) = hint {
        if let Some(bt) = tables.resolve_body_type(h) {
            return bt;
        }
        // 2. Keyword scan over the hint.
        if let Some(bt) = first_body_type_match(&h.to_lowercase()) {
            return bt;
        }
    }
    // 3. Keyword scan over the model name.
    if let Some(bt) = first_body_type_match(&model_name.to_lowercase()) {
        return bt;
    }
    BodyType::Unknown
}

fn first_body_type_match(haystack: &str) -> Option<BodyType> {
    for (body_type, keywords) in BODY_TYPE_RULES {
        for keyword in *keywords {
            if haystack.contains(keyword) {
                return Some(*body_type);
            }
        }
    }
    None
}

// ── Fuel rules ─────────────────────────────────────────────────────────────────

const ELECTRIC_KEYWORDS: &[&str] = &["eléctrico", "electrico", "electric", "e-power", " ev", "ev "];
const HYBRID_KEYWORDS: &[&str] = &["híbrido", "hibrido", "hybrid", "phev", "hev", "mhev"];
const DIESEL_KEYWORDS: &[&str] = &["diesel", "diésel", "tdi", "crdi"];
const GASOLINE_KEYWORDS: &[&str] = &["gasolina", "gasoline", "nafta", "petrol"];

/// Classify fuel type from an optional raw field plus model-name keywords.
///
/// Electric is checked before hybrid so a "PHEV e-power" style name resolves
/// to electric only on an explicit electric token; plug-in hybrids carry
/// "phev" and resolve to hybrid first via the raw field when present.
pub fn classify_fuel(model_name: &str, raw_fuel: Option<&str>) -> FuelType {
    if let Some(raw) = raw_fuel {
        let lower = raw.trim().to_lowercase();
        if !lower.is_empty() {
            if contains_any(&lower, ELECTRIC_KEYWORDS) || lower == "ev" || lower == "bev" {
                return FuelType::Electric;
            }
            if contains_any(&lower, HYBRID_KEYWORDS) {
                return FuelType::Hybrid;
            }
            if contains_any(&lower, DIESEL_KEYWORDS) {
                return FuelType::Diesel;
            }
            if contains_any(&lower, GASOLINE_KEYWORDS) {
                return FuelType::Gasoline;
            }
        }
    }

    let model_lower = format!(" {} ", model_name.to_lowercase());
    if contains_any(&model_lower, ELECTRIC_KEYWORDS) {
        return FuelType::Electric;
    }
    if contains_any(&model_lower, HYBRID_KEYWORDS) {
        return FuelType::Hybrid;
    }
    if contains_any(&model_lower, DIESEL_KEYWORDS) {
        return FuelType::Diesel;
    }
    FuelType::Unknown
}

// ── Transmission rules ─────────────────────────────────────────────────────────

const AUTOMATIC_KEYWORDS: &[&str] = &[
    "automática", "automatica", "automatic", "auto", "cvt", "dsg", "tiptronic", "dct",
];
const MANUAL_KEYWORDS: &[&str] = &["manual", "estándar", "estandar", "std"];

/// Classify transmission from the raw field.  CVT and dual-clutch variants
/// count as automatic.
pub fn classify_transmission(raw: Option<&str>) -> Transmission {
    let Some(raw) = raw else {
        return Transmission::Unknown;
    };
    let lower = raw.trim().to_lowercase();
    if lower.is_empty() {
        return Transmission::Unknown;
    }
    if contains_any(&lower, AUTOMATIC_KEYWORDS) {
        return Transmission::Automatic;
    }
    if contains_any(&lower, MANUAL_KEYWORDS) {
        return Transmission::Manual;
    }
    Transmission::Unknown
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> CanonicalTables {
        CanonicalTables::default()
    }

    // ── Body type ─────────────────────────────────────────────────────────────

    #[test]
    fn test_body_type_exact_hint_wins() {
        let bt = classify_body_type("X5", Some("SUV Compacta"), &tables());
        assert_eq!(bt, BodyType::SuvCompact);
    }

    #[test]
    fn test_body_type_from_model_keyword() {
        assert_eq!(
            classify_body_type("Corolla Cross LE", None, &tables()),
            BodyType::Sedan
        );
        assert_eq!(
            classify_body_type("Hilux Doble Cabina", None, &tables()),
            BodyType::Pickup
        );
        assert_eq!(classify_body_type("CX-5 Signature", None, &tables()), BodyType::SuvMid);
    }

    #[test]
    fn test_body_type_unknown_when_no_rule() {
        assert_eq!(classify_body_type("Model Q", None, &tables()), BodyType::Unknown);
    }

    #[test]
    fn test_body_type_tie_break_declaration_order() {
        // "Versa Coupe" matches the sedan rule ("versa") and the coupe rule
        // ("coupe"); the earlier rule in declaration order wins.
        assert_eq!(
            classify_body_type("Versa Coupe", None, &tables()),
            BodyType::Sedan
        );
    }

    #[test]
    fn test_body_type_hint_keywords_beat_model_keywords() {
        // Hint says pickup; model name contains a sedan keyword.
        assert_eq!(
            classify_body_type("Sentra edición", Some("pick up doble"), &tables()),
            BodyType::Pickup
        );
    }

    // ── Fuel ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_fuel_from_raw_field() {
        assert_eq!(classify_fuel("Corolla", Some("Gasolina")), FuelType::Gasoline);
        assert_eq!(classify_fuel("Corolla", Some("Híbrido")), FuelType::Hybrid);
        assert_eq!(classify_fuel("Leaf", Some("Eléctrico")), FuelType::Electric);
        assert_eq!(classify_fuel("Ranger", Some("Diesel")), FuelType::Diesel);
    }

    #[test]
    fn test_fuel_from_model_keywords() {
        assert_eq!(classify_fuel("Kicks e-Power", None), FuelType::Electric);
        assert_eq!(classify_fuel("RAV4 Hybrid", None), FuelType::Hybrid);
        assert_eq!(classify_fuel("Sprinter TDI", None), FuelType::Diesel);
    }

    #[test]
    fn test_fuel_unknown_without_signal() {
        assert_eq!(classify_fuel("Aveo LT", None), FuelType::Unknown);
    }

    #[test]
    fn test_fuel_raw_field_beats_model_name() {
        // The raw field is authoritative over name heuristics.
        assert_eq!(
            classify_fuel("Niro Hybrid", Some("eléctrico")),
            FuelType::Electric
        );
    }

    // ── Transmission ──────────────────────────────────────────────────────────

    #[test]
    fn test_transmission_variants() {
        assert_eq!(
            classify_transmission(Some("Automática")),
            Transmission::Automatic
        );
        assert_eq!(classify_transmission(Some("CVT")), Transmission::Automatic);
        assert_eq!(classify_transmission(Some("DSG")), Transmission::Automatic);
        assert_eq!(
            classify_transmission(Some("Estándar")),
            Transmission::Manual
        );
        assert_eq!(classify_transmission(Some("manual 6 vel")), Transmission::Manual);
    }

    #[test]
    fn test_transmission_unknown() {
        assert_eq!(classify_transmission(None), Transmission::Unknown);
        assert_eq!(classify_transmission(Some("")), Transmission::Unknown);
        assert_eq!(classify_transmission(Some("triciclo")), Transmission::Unknown);
    }
}

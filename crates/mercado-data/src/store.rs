//! The fact store: a deduplicated, natural-key-indexed collection of
//! normalized observations.
//!
//! Upserts are last-write-wins per natural key; replacements are counted for
//! audit of re-ingestion.  The store is owned by a single pipeline run and
//! never mutated concurrently.  Snapshots persist the store between runs as
//! a schema-versioned JSON document so month-over-month comparisons can load
//! a prior period.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use mercado_core::error::{MarketError, Result};
use mercado_core::models::{
    BodyType, FuelType, NaturalKey, PeriodKey, SourceKind, VehicleObservation,
};

/// Version of the persisted snapshot layout.  Bump on any change to
/// [`VehicleObservation`]'s serialized shape.
pub const SCHEMA_VERSION: u32 = 2;

// ── ObservationFilter ──────────────────────────────────────────────────────────

/// A conjunctive filter over any subset of dimensions plus a period range.
/// Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ObservationFilter {
    pub source: Option<SourceKind>,
    pub brand: Option<String>,
    pub body_type: Option<BodyType>,
    pub fuel_type: Option<FuelType>,
    pub city: Option<String>,
    pub state: Option<String>,
    /// `None` matches both observed and estimated rows.
    pub estimated: Option<bool>,
    /// Inclusive lower period bound.
    pub period_from: Option<PeriodKey>,
    /// Inclusive upper period bound.
    pub period_to: Option<PeriodKey>,
}

impl ObservationFilter {
    /// Filter for exactly one reporting period.
    pub fn for_period(period: PeriodKey) -> Self {
        Self {
            period_from: Some(period),
            period_to: Some(period),
            ..Default::default()
        }
    }

    /// Whether `obs` passes every set predicate.
    pub fn matches(&self, obs: &VehicleObservation) -> bool {
        if self.source.is_some_and(|s| s != obs.source) {
            return false;
        }
        if self.brand.as_deref().is_some_and(|b| b != obs.brand) {
            return false;
        }
        if self.body_type.is_some_and(|bt| bt != obs.body_type) {
            return false;
        }
        if self.fuel_type.is_some_and(|ft| ft != obs.fuel_type) {
            return false;
        }
        if let Some(city) = self.city.as_deref() {
            let obs_city = obs
                .geography
                .as_ref()
                .and_then(|g| g.city.as_deref());
            if obs_city != Some(city) {
                return false;
            }
        }
        if let Some(state) = self.state.as_deref() {
            let obs_state = obs.geography.as_ref().map(|g| g.state.as_str());
            if obs_state != Some(state) {
                return false;
            }
        }
        if self.estimated.is_some_and(|e| e != obs.estimated) {
            return false;
        }
        if self.period_from.is_some_and(|p| obs.observed_at < p) {
            return false;
        }
        if self.period_to.is_some_and(|p| obs.observed_at > p) {
            return false;
        }
        true
    }
}

// ── FactStore ──────────────────────────────────────────────────────────────────

/// In-memory collection of observations indexed by natural key.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    facts: BTreeMap<NaturalKey, VehicleObservation>,
    replacements: u64,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a batch of observations, applying last-write-wins
    /// in iteration order.
    pub fn from_observations(observations: impl IntoIterator<Item = VehicleObservation>) -> Self {
        let mut store = Self::new();
        for obs in observations {
            store.upsert(obs);
        }
        store
    }

    /// Insert or replace the observation for its natural key.
    ///
    /// Returns `true` when an existing observation was replaced; the
    /// replacement is also counted for audit of re-ingestion.
    pub fn upsert(&mut self, obs: VehicleObservation) -> bool {
        let key = obs.natural_key();
        let replaced = self.facts.insert(key, obs).is_some();
        if replaced {
            self.replacements += 1;
        }
        replaced
    }

    /// How many upserts replaced an existing observation.
    pub fn replacements(&self) -> u64 {
        self.replacements
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// All observations in natural-key order.
    pub fn observations(&self) -> impl Iterator<Item = &VehicleObservation> {
        self.facts.values()
    }

    /// Observations matching `filter`, in natural-key order.
    ///
    /// The returned vector can be iterated any number of times; querying has
    /// no side effects on the store.
    pub fn query(&self, filter: &ObservationFilter) -> Vec<&VehicleObservation> {
        self.facts
            .values()
            .filter(|obs| filter.matches(obs))
            .collect()
    }

    // ── Snapshot persistence ──────────────────────────────────────────────────

    /// Persist the store as a schema-versioned JSON snapshot.
    ///
    /// Writes to a temp file then renames for atomicity.
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let snapshot = StoreSnapshot {
            schema_version: SCHEMA_VERSION,
            observations: self.facts.values().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;
        debug!("saved {} observations to {}", snapshot.observations.len(), path.display());
        Ok(())
    }

    /// Load a snapshot, rejecting any written by an incompatible schema.
    ///
    /// A version mismatch is fatal: aggregating over a misread snapshot is
    /// worse than failing fast.
    pub fn load_snapshot(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| MarketError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        // Probe the version before deserializing observation payloads so a
        // layout change surfaces as a version error, not a parse error.
        let probe: VersionProbe = serde_json::from_str(&content)?;
        if probe.schema_version != SCHEMA_VERSION {
            return Err(MarketError::SchemaVersionMismatch {
                expected: SCHEMA_VERSION,
                found: probe.schema_version,
            });
        }

        let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
        Ok(Self::from_observations(snapshot.observations))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreSnapshot {
    schema_version: u32,
    observations: Vec<VehicleObservation>,
}

#[derive(Debug, Deserialize)]
struct VersionProbe {
    schema_version: u32,
}

// ── Tests ──────────────────────────────────────────────────────────────────────

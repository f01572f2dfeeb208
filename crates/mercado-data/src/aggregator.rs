//! Grouped metric computation over normalized observations.
//!
//! Aggregation is deterministic: observations are bucketed into a `BTreeMap`
//! keyed by their dimension values, so input order never changes the output.
//! Unpriced observations still count toward group sizes; price statistics are
//! computed over priced observations only.

use std::collections::BTreeMap;

use serde::Serialize;

use mercado_core::buckets::PriceBuckets;
use mercado_core::models::{FuelType, VehicleObservation};
use mercado_core::settings::RunConfig;

// ── Group dimensions ───────────────────────────────────────────────────────────

/// The dimensions an aggregation can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupDimension {
    Brand,
    BodyType,
    City,
    PriceBucket,
    Period,
    BrandTier,
    FuelType,
    Source,
    /// Configured geographic scope: tier-1 cities individually, tier-2
    /// collapsed, everything else under [`OTHER`].
    GeoScope,
}

impl GroupDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupDimension::Brand => "brand",
            GroupDimension::BodyType => "body_type",
            GroupDimension::City => "city",
            GroupDimension::PriceBucket => "price_bucket",
            GroupDimension::Period => "period",
            GroupDimension::BrandTier => "brand_tier",
            GroupDimension::FuelType => "fuel_type",
            GroupDimension::Source => "source",
            GroupDimension::GeoScope => "geo_scope",
        }
    }
}

/// Group value for observations with no geography at all.
pub const NATIONAL: &str = "national";
/// Group value for dimensions the observation could not be classified on.
pub const UNKNOWN: &str = "unknown";
/// Collapsed group for tier-2 cities in the geo-scope dimension.
pub const TIER2_GROUP: &str = "tier_2";
/// Geo-scope group for cities outside both configured tiers.
pub const OTHER: &str = "other";

// ── Rows and measures ──────────────────────────────────────────────────────────

/// One resolved (dimension, value) pair of a group key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionValue {
    pub dimension: GroupDimension,
    pub value: String,
}

/// Metrics computed for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measures {
    /// Observations in the group, priced or not.
    pub count: u64,
    /// Sum of reported unit quantities; `None` when no observation in the
    /// group carried a quantity.
    pub sum_quantity: Option<u64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub avg_price: Option<f64>,
    pub median_price: Option<f64>,
    /// Fraction of the group's observations that are electric.
    pub ev_share: f64,
    /// Fraction of the group's observations that are hybrid.
    pub hybrid_share: f64,
}

/// One group of the aggregation output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationRow {
    pub dimensions: Vec<DimensionValue>,
    pub measures: Measures,
}

impl AggregationRow {
    /// The value this row carries for `dimension`, when grouped by it.
    pub fn value_of(&self, dimension: GroupDimension) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|dv| dv.dimension == dimension)
            .map(|dv| dv.value.as_str())
    }
}

// ── Context ────────────────────────────────────────────────────────────────────

/// Run-scoped inputs the aggregator needs beyond the observations themselves.
#[derive(Debug, Clone)]
pub struct AggregateContext<'a> {
    pub buckets: &'a PriceBuckets,
    pub config: &'a RunConfig,
    /// When false (the default), rows flagged `estimated` are left out of
    /// every group.
    pub include_estimated: bool,
}

impl<'a> AggregateContext<'a> {
    pub fn new(buckets: &'a PriceBuckets, config: &'a RunConfig) -> Self {
        Self {
            buckets,
            config,
            include_estimated: false,
        }
    }
}

// ── Aggregation ────────────────────────────────────────────────────────────────

/// Group `observations` by `dimensions` and compute measures per group.
///
/// Missing geography groups under [`NATIONAL`]; state-level rows group under
/// their state name; unclassified enum dimensions group under [`UNKNOWN`].
/// No observation is ever silently excluded on dimension grounds.
pub fn aggregate(
    observations: &[&VehicleObservation],
    dimensions: &[GroupDimension],
    ctx: &AggregateContext<'_>,
) -> Vec<AggregationRow> {
    let mut groups: BTreeMap<Vec<String>, Vec<&VehicleObservation>> = BTreeMap::new();

    for &obs in observations {
        if obs.estimated && !ctx.include_estimated {
            continue;
        }
        let key: Vec<String> = dimensions
            .iter()
            .map(|&dim| dimension_value(obs, dim, ctx))
            .collect();
        groups.entry(key).or_default().push(obs);
    }

    groups
        .into_iter()
        .map(|(key, members)| AggregationRow {
            dimensions: dimensions
                .iter()
                .zip(key)
                .map(|(&dimension, value)| DimensionValue { dimension, value })
                .collect(),
            measures: compute_measures(&members),
        })
        .collect()
}

/// The group value of one observation on one dimension.
fn dimension_value(
    obs: &VehicleObservation,
    dimension: GroupDimension,
    ctx: &AggregateContext<'_>,
) -> String {
    match dimension {
        GroupDimension::Brand => obs.brand.clone(),
        GroupDimension::BodyType => obs.body_type.as_str().to_string(),
        GroupDimension::City => match &obs.geography {
            None => NATIONAL.to_string(),
            Some(geo) => geo.city.clone().unwrap_or_else(|| geo.state.clone()),
        },
        GroupDimension::PriceBucket => match obs.price_mxn {
            Some(price) => ctx.buckets.bucket_for(price).as_str().to_string(),
            None => UNKNOWN.to_string(),
        },
        GroupDimension::Period => obs.observed_at.to_string(),
        GroupDimension::BrandTier => ctx.config.brand_tier(&obs.brand).as_str().to_string(),
        GroupDimension::FuelType => obs.fuel_type.as_str().to_string(),
        GroupDimension::Source => obs.source.as_str().to_string(),
        GroupDimension::GeoScope => match &obs.geography {
            None => NATIONAL.to_string(),
            Some(geo) => match geo.city.as_deref() {
                Some(city) => match ctx.config.city_tier(city) {
                    Some(1) => city.to_string(),
                    Some(_) => TIER2_GROUP.to_string(),
                    None => OTHER.to_string(),
                },
                // State-level rows are outside the city tier scheme.
                None => OTHER.to_string(),
            },
        },
    }
}

fn compute_measures(members: &[&VehicleObservation]) -> Measures {
    let count = members.len() as u64;

    let mut sum_quantity: Option<u64> = None;
    for obs in members {
        if let Some(q) = obs.quantity {
            sum_quantity = Some(sum_quantity.unwrap_or(0) + q);
        }
    }

    let mut prices: Vec<f64> = members.iter().filter_map(|o| o.price_mxn).collect();
    prices.sort_by(f64::total_cmp);

    let (min_price, max_price, avg_price, median_price) = if prices.is_empty() {
        (None, None, None, None)
    } else {
        let sum: f64 = prices.iter().sum();
        (
            Some(prices[0]),
            Some(prices[prices.len() - 1]),
            Some(sum / prices.len() as f64),
            Some(median_of_sorted(&prices)),
        )
    };

    let ev = members.iter().filter(|o| o.fuel_type == FuelType::Electric).count();
    let hybrid = members.iter().filter(|o| o.fuel_type == FuelType::Hybrid).count();

    Measures {
        count,
        sum_quantity,
        min_price,
        max_price,
        avg_price,
        median_price,
        ev_share: ev as f64 / count as f64,
        hybrid_share: hybrid as f64 / count as f64,
    }
}

/// Median of a non-empty ascending slice; even-sized groups average the two
/// middle values.
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mercado_core::models::{
        BodyType, Geography, PeriodKey, SourceKind, Transmission,
    };

    fn make_obs(brand: &str, model: &str, price: Option<f64>) -> VehicleObservation {
        VehicleObservation {
            source: SourceKind::Catalog,
            brand: brand.to_string(),
            model: model.to_string(),
            year: 2025,
            body_type: BodyType::Sedan,
            transmission: Transmission::Automatic,
            fuel_type: FuelType::Gasoline,
            price_mxn: price,
            geography: None,
            observed_at: PeriodKey::new(2025, 1),
            quantity: None,
            estimated: false,
        }
    }

    fn ctx_parts() -> (PriceBuckets, RunConfig) {
        (PriceBuckets::default(), RunConfig::default())
    }

    #[test]
    fn test_median_even_group_averages_middle_values() {
        let (buckets, config) = ctx_parts();
        let ctx = AggregateContext::new(&buckets, &config);
        let obs: Vec<VehicleObservation> = [100.0, 200.0, 300.0, 400.0]
            .iter()
            .enumerate()
            .map(|(i, &p)| make_obs("Toyota", &format!("Model{i}"), Some(p)))
            .collect();
        let refs: Vec<&VehicleObservation> = obs.iter().collect();

        let rows = aggregate(&refs, &[GroupDimension::Brand], &ctx);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].measures.median_price, Some(250.0));
    }

    #[test]
    fn test_median_odd_group() {
        let (buckets, config) = ctx_parts();
        let ctx = AggregateContext::new(&buckets, &config);
        let obs: Vec<VehicleObservation> = [300.0, 100.0, 200.0]
            .iter()
            .enumerate()
            .map(|(i, &p)| make_obs("Toyota", &format!("Model{i}"), Some(p)))
            .collect();
        let refs: Vec<&VehicleObservation> = obs.iter().collect();

        let rows = aggregate(&refs, &[GroupDimension::Brand], &ctx);
        assert_eq!(rows[0].measures.median_price, Some(200.0));
    }

    #[test]
    fn test_shuffled_input_gives_identical_output() {
        let (buckets, config) = ctx_parts();
        let ctx = AggregateContext::new(&buckets, &config);
        let mut obs = vec![
            make_obs("Toyota", "Corolla", Some(400_000.0)),
            make_obs("Nissan", "Versa", Some(300_000.0)),
            make_obs("Toyota", "Camry", Some(600_000.0)),
            make_obs("Honda", "Civic", Some(450_000.0)),
        ];
        let forward: Vec<&VehicleObservation> = obs.iter().collect();
        let rows_forward = aggregate(&forward, &[GroupDimension::Brand], &ctx);

        obs.reverse();
        let reversed: Vec<&VehicleObservation> = obs.iter().collect();
        let rows_reversed = aggregate(&reversed, &[GroupDimension::Brand], &ctx);

        assert_eq!(rows_forward, rows_reversed);
    }

    #[test]
    fn test_unpriced_observation_counts_but_no_price_stats() {
        let (buckets, config) = ctx_parts();
        let ctx = AggregateContext::new(&buckets, &config);
        let mut bulletin = make_obs("Nissan", "(all)", None);
        bulletin.source = SourceKind::GovernmentBulletin;
        bulletin.quantity = Some(50_000);
        let priced = make_obs("Nissan", "Versa", Some(300_000.0));
        let obs = [&bulletin, &priced];

        let rows = aggregate(&obs, &[GroupDimension::Brand], &ctx);
        assert_eq!(rows.len(), 1);
        let m = &rows[0].measures;
        assert_eq!(m.count, 2);
        assert_eq!(m.sum_quantity, Some(50_000));
        // Price statistics come from the single priced observation.
        assert_eq!(m.avg_price, Some(300_000.0));
        assert_eq!(m.min_price, Some(300_000.0));
    }

    #[test]
    fn test_sum_quantity_none_when_no_quantities() {
        let (buckets, config) = ctx_parts();
        let ctx = AggregateContext::new(&buckets, &config);
        let obs = make_obs("Toyota", "Corolla", Some(400_000.0));
        let refs = [&obs];
        let rows = aggregate(&refs, &[GroupDimension::Brand], &ctx);
        assert_eq!(rows[0].measures.sum_quantity, None);
    }

    #[test]
    fn test_missing_geography_groups_under_national() {
        let (buckets, config) = ctx_parts();
        let ctx = AggregateContext::new(&buckets, &config);
        let national = make_obs("Toyota", "Corolla", Some(400_000.0));
        let mut gdl = make_obs("Toyota", "Yaris", Some(300_000.0));
        gdl.geography = Some(Geography::city("Guadalajara", "Jalisco"));
        let mut state_level = make_obs("BYD", "Dolphin", None);
        state_level.geography = Some(Geography::state_only("Jalisco"));
        let refs = [&national, &gdl, &state_level];

        let rows = aggregate(&refs, &[GroupDimension::City], &ctx);
        let values: Vec<&str> = rows.iter().filter_map(|r| r.value_of(GroupDimension::City)).collect();
        assert!(values.contains(&NATIONAL));
        assert!(values.contains(&"Guadalajara"));
        // State-level rows group under their state name.
        assert!(values.contains(&"Jalisco"));
    }

    #[test]
    fn test_unpriced_groups_under_unknown_bucket() {
        let (buckets, config) = ctx_parts();
        let ctx = AggregateContext::new(&buckets, &config);
        let unpriced = make_obs("Nissan", "(all)", None);
        let refs = [&unpriced];
        let rows = aggregate(&refs, &[GroupDimension::PriceBucket], &ctx);
        assert_eq!(rows[0].value_of(GroupDimension::PriceBucket), Some(UNKNOWN));
    }

    #[test]
    fn test_estimated_rows_excluded_by_default() {
        let (buckets, config) = ctx_parts();
        let mut ctx = AggregateContext::new(&buckets, &config);
        let observed = make_obs("BYD", "Dolphin", Some(500_000.0));
        let mut estimated = make_obs("BYD", "(all)", None);
        estimated.estimated = true;
        let refs = [&observed, &estimated];

        let rows = aggregate(&refs, &[GroupDimension::Brand], &ctx);
        assert_eq!(rows[0].measures.count, 1);

        ctx.include_estimated = true;
        let rows = aggregate(&refs, &[GroupDimension::Brand], &ctx);
        assert_eq!(rows[0].measures.count, 2);
    }

    #[test]
    fn test_ev_and_hybrid_shares() {
        let (buckets, config) = ctx_parts();
        let ctx = AggregateContext::new(&buckets, &config);
        let mut ev = make_obs("Tesla", "Model 3", Some(900_000.0));
        ev.fuel_type = FuelType::Electric;
        let mut hybrid = make_obs("Toyota", "Prius", Some(500_000.0));
        hybrid.fuel_type = FuelType::Hybrid;
        let gas = make_obs("Nissan", "Versa", Some(300_000.0));
        let gas2 = make_obs("Honda", "Civic", Some(450_000.0));
        let refs = [&ev, &hybrid, &gas, &gas2];

        let rows = aggregate(&refs, &[GroupDimension::Period], &ctx);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].measures.ev_share, 0.25);
        assert_eq!(rows[0].measures.hybrid_share, 0.25);
    }

    #[test]
    fn test_brand_tier_dimension_uses_config_overrides() {
        let buckets = PriceBuckets::default();
        let mut config = RunConfig::default();
        config
            .brand_tier_overrides
            .insert("Tesla".to_string(), mercado_core::models::BrandTier::Premium);
        let ctx = AggregateContext::new(&buckets, &config);

        let tesla = make_obs("Tesla", "Model 3", Some(900_000.0));
        let refs = [&tesla];
        let rows = aggregate(&refs, &[GroupDimension::BrandTier], &ctx);
        assert_eq!(rows[0].value_of(GroupDimension::BrandTier), Some("premium"));
    }

    #[test]
    fn test_geo_scope_tiers() {
        let (buckets, config) = ctx_parts();
        let ctx = AggregateContext::new(&buckets, &config);
        let mut tier1 = make_obs("Toyota", "Corolla", Some(400_000.0));
        tier1.geography = Some(Geography::city("Monterrey", "Nuevo León"));
        let mut tier2a = make_obs("Toyota", "Yaris", Some(300_000.0));
        tier2a.geography = Some(Geography::city("Mérida", "Yucatán"));
        let mut tier2b = make_obs("Nissan", "Versa", Some(310_000.0));
        tier2b.geography = Some(Geography::city("Tijuana", "Baja California"));
        let mut unscoped = make_obs("Honda", "Civic", Some(450_000.0));
        unscoped.geography = Some(Geography::city("Durango", "Durango"));
        let national = make_obs("Nissan", "(all)", None);
        let refs = [&tier1, &tier2a, &tier2b, &unscoped, &national];

        let rows = aggregate(&refs, &[GroupDimension::GeoScope], &ctx);
        let value_counts: Vec<(&str, u64)> = rows
            .iter()
            .map(|r| (r.value_of(GroupDimension::GeoScope).unwrap(), r.measures.count))
            .collect();
        assert!(value_counts.contains(&("Monterrey", 1)));
        assert!(value_counts.contains(&(TIER2_GROUP, 2)));
        assert!(value_counts.contains(&(OTHER, 1)));
        assert!(value_counts.contains(&(NATIONAL, 1)));
    }

    #[test]
    fn test_multi_dimension_grouping() {
        let (buckets, config) = ctx_parts();
        let ctx = AggregateContext::new(&buckets, &config);
        let a = make_obs("Toyota", "Corolla", Some(400_000.0));
        let mut b = make_obs("Toyota", "Hilux", Some(700_000.0));
        b.body_type = BodyType::Pickup;
        let refs = [&a, &b];

        let rows = aggregate(&refs, &[GroupDimension::Brand, GroupDimension::BodyType], &ctx);
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.dimensions.len(), 2);
            assert_eq!(row.measures.count, 1);
        }
    }
}

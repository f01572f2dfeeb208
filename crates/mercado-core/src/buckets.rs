use serde::{Deserialize, Serialize};

use crate::error::{MarketError, Result};

// ── PriceBucket ────────────────────────────────────────────────────────────────

/// Ordered price segments over MXN price space.
///
/// Intervals are half-open and contiguous: `Entry` is `[0, b0)`, each
/// following bucket is `[b(n-1), bn)` and `Ultra` is `[b4, ∞)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PriceBucket {
    Entry,
    Economy,
    MidRange,
    Premium,
    Luxury,
    Ultra,
}

impl PriceBucket {
    /// All buckets in ascending price order.
    pub const ALL: [PriceBucket; 6] = [
        PriceBucket::Entry,
        PriceBucket::Economy,
        PriceBucket::MidRange,
        PriceBucket::Premium,
        PriceBucket::Luxury,
        PriceBucket::Ultra,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceBucket::Entry => "entry",
            PriceBucket::Economy => "economy",
            PriceBucket::MidRange => "mid_range",
            PriceBucket::Premium => "premium",
            PriceBucket::Luxury => "luxury",
            PriceBucket::Ultra => "ultra",
        }
    }

    /// Human-readable report label (documented default boundaries).
    pub fn label(&self) -> &'static str {
        match self {
            PriceBucket::Entry => "Entry Level (<$150k)",
            PriceBucket::Economy => "Economy ($150k-$300k)",
            PriceBucket::MidRange => "Mid-Range ($300k-$500k)",
            PriceBucket::Premium => "Premium ($500k-$800k)",
            PriceBucket::Luxury => "Luxury ($800k-$1.2M)",
            PriceBucket::Ultra => "Ultra Luxury (>$1.2M)",
        }
    }
}

// ── PriceBuckets ───────────────────────────────────────────────────────────────

/// Default inner boundaries: 150k, 300k, 500k, 800k, 1.2M MXN.
pub const DEFAULT_BOUNDARIES: [f64; 5] = [150_000.0, 300_000.0, 500_000.0, 800_000.0, 1_200_000.0];

/// Validated, configurable bucket boundaries.
///
/// The boundaries must be strictly increasing and positive so the six
/// buckets stay contiguous and exhaustive over `[0, ∞)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBuckets {
    boundaries: [f64; 5],
}

impl Default for PriceBuckets {
    fn default() -> Self {
        Self {
            boundaries: DEFAULT_BOUNDARIES,
        }
    }
}

impl PriceBuckets {
    /// Build from explicit boundaries, validating the ordering invariant.
    pub fn new(boundaries: &[f64]) -> Result<Self> {
        if boundaries.len() != 5 {
            return Err(MarketError::InvalidBuckets(format!(
                "expected 5 boundaries, got {}",
                boundaries.len()
            )));
        }
        let mut prev = 0.0;
        for &b in boundaries {
            if !b.is_finite() || b <= prev {
                return Err(MarketError::InvalidBuckets(format!(
                    "boundaries must be strictly increasing and positive: {boundaries:?}"
                )));
            }
            prev = b;
        }
        let mut arr = [0.0; 5];
        arr.copy_from_slice(boundaries);
        Ok(Self { boundaries: arr })
    }

    /// The bucket containing `price_mxn`.  Total over non-negative prices:
    /// exactly one bucket matches any `price >= 0`.
    pub fn bucket_for(&self, price_mxn: f64) -> PriceBucket {
        debug_assert!(price_mxn >= 0.0, "negative price reached bucket lookup");
        for (i, &boundary) in self.boundaries.iter().enumerate() {
            if price_mxn < boundary {
                return PriceBucket::ALL[i];
            }
        }
        PriceBucket::Ultra
    }

    pub fn boundaries(&self) -> &[f64; 5] {
        &self.boundaries
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

//! Data layer for the auto-market standardization engine.
//!
//! Responsible for turning raw source records into canonical vehicle
//! observations, holding them in the deduplicated fact store, computing
//! grouped metrics and period-over-period deltas, and shaping the final
//! report model consumed by external writers.

pub mod aggregator;
pub mod comparator;
pub mod normalizer;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod store;

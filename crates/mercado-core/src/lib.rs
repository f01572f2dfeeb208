//! Domain core for the auto-market standardization engine.
//!
//! Holds the canonical data model (vehicle observations, period keys,
//! dimension enums), the error taxonomy, the canonicalization tables used to
//! resolve raw Spanish-language variants into canonical labels, the keyword
//! classification rules, price buckets and run configuration.
//!
//! Everything in this crate is pure: no network, no disk I/O beyond loading
//! configuration and mapping files at run start.

pub mod buckets;
pub mod canon;
pub mod classify;
pub mod error;
pub mod models;
pub mod settings;

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the standardization-and-aggregation engine.
///
/// The first three variants are per-record and recoverable: the batch
/// continues and the record lands in the skipped-records report.
/// `SchemaVersionMismatch`, `EmptyDimensionTable` and `InvalidBuckets` are
/// fatal and abort the run before any aggregation occurs.
#[derive(Error, Debug)]
pub enum MarketError {
    /// A raw dimension value has no canonical mapping and no fallback rule.
    #[error("Unknown {dimension} value: {value}")]
    UnknownDimensionValue { dimension: String, value: String },

    /// A price field was negative or not numeric after cleanup.
    #[error("Malformed price: {0}")]
    MalformedPrice(String),

    /// A required field (brand, year, or price where the source demands it)
    /// was absent.
    #[error("Missing required field: {field}")]
    MissingRequiredField { field: String },

    /// A persisted fact-store snapshot was written by an incompatible schema.
    #[error("Snapshot schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: u32, found: u32 },

    /// A canonicalization table was loaded empty.
    #[error("Canonicalization table is empty: {0}")]
    EmptyDimensionTable(String),

    /// Price-bucket boundaries are not strictly increasing and positive.
    #[error("Invalid price bucket boundaries: {0}")]
    InvalidBuckets(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MarketError {
    /// Whether this error is recoverable per-record (skip and continue) as
    /// opposed to fatal for the whole run.
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            MarketError::UnknownDimensionValue { .. }
                | MarketError::MalformedPrice(_)
                | MarketError::MissingRequiredField { .. }
        )
    }

    /// Short machine-friendly reason code used to bucket skipped records.
    pub fn reason_code(&self) -> &'static str {
        match self {
            MarketError::UnknownDimensionValue { .. } => "unknown_dimension_value",
            MarketError::MalformedPrice(_) => "malformed_price",
            MarketError::MissingRequiredField { .. } => "missing_required_field",
            MarketError::SchemaVersionMismatch { .. } => "schema_version_mismatch",
            MarketError::EmptyDimensionTable(_) => "empty_dimension_table",
            MarketError::InvalidBuckets(_) => "invalid_buckets",
            MarketError::Config(_) => "config",
            MarketError::FileRead { .. } => "file_read",
            MarketError::JsonParse(_) => "json_parse",
            MarketError::Io(_) => "io",
        }
    }
}

/// Convenience alias used throughout the mercado crates.
pub type Result<T> = std::result::Result<T, MarketError>;

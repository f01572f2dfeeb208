//! Raw-record file discovery and parsing.
//!
//! Source systems drop JSON files into a data directory: `catalog_*.json`,
//! `bulletin_*.json` and `feed_*.json`, each holding an array of records in
//! that source's native shape.  The reader walks the directory tree, parses
//! what it recognizes, and warns-and-skips files that do not parse; a broken
//! drop from one source must not block the others.

use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use mercado_core::error::{MarketError, Result};

use crate::normalizer::{RawBulletinRecord, RawCatalogRecord, RawFeedRecord, RawRecord};

/// Result of scanning one data directory.
#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub records: Vec<RawRecord>,
    /// Files parsed successfully.
    pub files_read: usize,
    /// Recognized files that failed to parse and were skipped.
    pub files_skipped: usize,
}

/// Scan `dir` recursively for raw record files and parse them.
///
/// Files are visited in path order so repeated runs see identical input
/// order.  A missing directory yields an empty outcome; the caller decides
/// whether that is an error.
pub fn read_raw_dir(dir: &Path) -> Result<ReadOutcome> {
    let mut outcome = ReadOutcome::default();
    if !dir.exists() {
        warn!(dir = %dir.display(), "data directory does not exist");
        return Ok(outcome);
    }

    let walker = WalkDir::new(dir).sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| {
            MarketError::Config(format!("failed to walk {}: {e}", dir.display()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(".json") {
            continue;
        }

        let parsed = if name.starts_with("catalog_") {
            parse_file::<RawCatalogRecord>(path).map(|records| {
                records
                    .into_iter()
                    .map(RawRecord::Catalog)
                    .collect::<Vec<_>>()
            })
        } else if name.starts_with("bulletin_") {
            parse_file::<RawBulletinRecord>(path).map(|records| {
                records
                    .into_iter()
                    .map(RawRecord::GovernmentBulletin)
                    .collect()
            })
        } else if name.starts_with("feed_") {
            parse_file::<RawFeedRecord>(path).map(|records| {
                records.into_iter().map(RawRecord::InternalFeed).collect()
            })
        } else {
            debug!(file = %path.display(), "ignoring unrecognized file");
            continue;
        };

        match parsed {
            Ok(mut records) => {
                debug!(file = %path.display(), records = records.len(), "parsed raw file");
                outcome.records.append(&mut records);
                outcome.files_read += 1;
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping unparseable file");
                outcome.files_skipped += 1;
            }
        }
    }

    Ok(outcome)
}

fn parse_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path).map_err(|source| MarketError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

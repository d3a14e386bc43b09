//! Catalog files accepted by the `seed` binary.
//!
//! JSON: an object mapping each target word to its three hint images.
//! CSV: one row per hint, with a header row. The target word sits in the
//! `target` column and the image payload in the fourth column; a target's
//! hints are taken in row order.

use std::collections::BTreeMap;

use quiz_core::model::{CatalogError, HintCatalog};
use thiserror::Error;

/// Zero-based position of the image payload in a CSV row.
pub const CSV_IMAGE_COLUMN: usize = 3;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("csv header has no `{0}` column")]
    MissingHeader(&'static str),

    #[error("csv row {row} has no column {column}")]
    ShortRow { row: usize, column: usize },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// File layout, chosen from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Csv,
}

impl CatalogFormat {
    #[must_use]
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

/// Parse a catalog file in the given format.
///
/// # Errors
///
/// Returns `ImportError` if the file is malformed or any target does not have
/// exactly three hints.
pub fn parse_catalog(raw: &str, format: CatalogFormat) -> Result<HintCatalog, ImportError> {
    match format {
        CatalogFormat::Json => parse_json(raw),
        CatalogFormat::Csv => parse_csv(raw),
    }
}

fn parse_json(raw: &str) -> Result<HintCatalog, ImportError> {
    let groups: BTreeMap<String, Vec<String>> = serde_json::from_str(raw)?;
    Ok(HintCatalog::from_groups(groups)?)
}

fn parse_csv(raw: &str) -> Result<HintCatalog, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let target_column = reader
        .headers()?
        .iter()
        .position(|name| name.trim() == "target")
        .ok_or(ImportError::MissingHeader("target"))?;

    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (n, record) in reader.records().enumerate() {
        let record = record?;
        // Header is row 1.
        let row = n + 2;
        let field = |column: usize| {
            record
                .get(column)
                .ok_or(ImportError::ShortRow { row, column })
        };
        let target = field(target_column)?.to_string();
        let image = field(CSV_IMAGE_COLUMN)?.to_string();
        groups.entry(target).or_default().push(image);
    }

    Ok(HintCatalog::from_groups(groups)?)
}

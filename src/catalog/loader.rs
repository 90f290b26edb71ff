//! Fail-soft CSV loading for the scheme and job datasets

use crate::catalog::row::{CatalogKind, CatalogRow};
use crate::error::Result;
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// One loaded dataset: normalized header plus derived rows
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<CatalogRow>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Lower-case and trim a header, dropping any byte-order mark
pub fn normalize_column(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Parse CSV from any reader. Short rows leave the missing columns out.
pub fn read_dataset<R: Read>(reader: R, kind: CatalogKind) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader.headers()?.iter().map(normalize_column).collect();

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let fields: BTreeMap<String, String> = columns
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.clone(), value.to_string()))
            .collect();
        rows.push(CatalogRow::from_fields(kind, index, fields));
    }

    Ok(Dataset { columns, rows })
}

/// Load a dataset file. A missing or malformed file yields an empty dataset.
pub fn load_dataset(path: &Path, kind: CatalogKind) -> Dataset {
    if !path.exists() {
        warn!("{} dataset not found at {}; treating as empty", kind, path.display());
        return Dataset::default();
    }

    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!("Failed to open {} dataset {}: {}", kind, path.display(), e);
            return Dataset::default();
        }
    };

    match read_dataset(file, kind) {
        Ok(dataset) => {
            info!("Loaded {} {} rows from {}", dataset.len(), kind, path.display());
            dataset
        }
        Err(e) => {
            warn!("Malformed {} dataset {}: {}; treating as empty", kind, path.display(), e);
            Dataset::default()
        }
    }
}

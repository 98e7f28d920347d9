//! Fixture catalog store.
//!
//! Loads the fixture table from CSV once at process start and holds it as
//! an immutable, shared, read-only resource for the lifetime of the
//! process. A schema mismatch at load time is a fatal startup error;
//! nothing downstream ever mutates the store.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use luxrec_model::FixtureRecord;

/// Columns the catalog CSV must provide, matching `FixtureRecord` fields.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "brand",
    "series",
    "fixture_type",
    "wattage_w",
    "luminous_flux_lm",
    "price",
    "cct_k",
    "cri",
    "ip_rating",
    "lifetime_h",
    "beam_angle_deg",
];

/// Errors from catalog loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("malformed catalog: {0}")]
    Malformed(#[from] csv::Error),

    #[error("catalog row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: csv::Error,
    },
}

/// Immutable in-memory fixture table.
#[derive(Debug, Clone)]
pub struct Catalog {
    fixtures: Vec<FixtureRecord>,
}

impl Catalog {
    /// Load the catalog from a CSV file at `path`.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path.as_ref())?;
        let catalog = Self::from_reader(file)?;
        tracing::info!(
            fixtures = catalog.len(),
            path = %path.as_ref().display(),
            "loaded fixture catalog"
        );
        Ok(catalog)
    }

    /// Load the catalog from any CSV reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == *column) {
                return Err(CatalogError::MissingColumn(column));
            }
        }

        let mut fixtures = Vec::new();
        for (index, record) in csv_reader.deserialize::<FixtureRecord>().enumerate() {
            let fixture = record.map_err(|source| CatalogError::Row {
                // +2: one for the header line, one for 1-based numbering
                row: index + 2,
                source,
            })?;
            fixtures.push(fixture);
        }

        Ok(Self { fixtures })
    }

    /// Build a catalog from records already in memory (tests, embedding).
    pub fn from_records(fixtures: Vec<FixtureRecord>) -> Self {
        Self { fixtures }
    }

    /// All fixtures in original catalog order.
    pub fn fixtures(&self) -> &[FixtureRecord] {
        &self.fixtures
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

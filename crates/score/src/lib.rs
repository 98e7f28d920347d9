//! Scoring function boundary.
//!
//! Provides the `ScoreModel` trait and its linear-regression implementation.
//! The engine treats a model as a pure black-box row-to-score mapping; the
//! only contract between them is schema compatibility, so the feature table
//! must expose exactly the columns the model's companion preprocessing was
//! fitted on. Mismatches are reported, never silently coerced.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use luxrec_model::{FixtureRecord, RoomParameters};

/// Feature columns, in order, as consumed by the preprocessing transform.
/// The first three are categorical; the rest are numeric.
pub const FEATURE_COLUMNS: &[&str] = &[
    "room_type",
    "fixture_type",
    "brand",
    "area_m2",
    "ceiling_height_m",
    "target_illuminance_lux",
    "budget",
    "min_cri",
    "cct_preference_k",
    "min_ip_rating",
    "wattage_w",
    "luminous_flux_lm",
    "efficacy_lm_per_w",
    "price",
    "cct_k",
    "cri",
    "ip_rating",
    "lifetime_h",
    "beam_angle_deg",
    "fixture_count",
];

/// Errors from the scoring boundary.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("model returned {got} scores for {expected} rows")]
    RowCount { expected: usize, got: usize },

    #[error("model produced a non-finite score at row {0}")]
    NonFinite(usize),

    #[error("failed to load model artifact: {0}")]
    Artifact(String),

    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
}

/// One feature cell: categorical text or a numeric value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Text(String),
    Number(f64),
}

/// A column-schema-carrying table of feature rows, one row per candidate.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<Vec<FeatureValue>>,
}

impl FeatureTable {
    /// An empty table with the canonical `FEATURE_COLUMNS` schema.
    pub fn new() -> Self {
        Self::with_columns(FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect())
    }

    /// An empty table with an explicit column schema.
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Append a row; its width must match the table schema.
    pub fn push_row(&mut self, row: Vec<FeatureValue>) -> Result<(), ScoreError> {
        if row.len() != self.columns.len() {
            return Err(ScoreError::SchemaMismatch(format!(
                "row has {} values for {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn rows(&self) -> &[Vec<FeatureValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for FeatureTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Build one feature row in `FEATURE_COLUMNS` order from a room joined
/// with a fixture and its computed installation count.
pub fn feature_row(
    params: &RoomParameters,
    fixture: &FixtureRecord,
    fixture_count: u32,
) -> Vec<FeatureValue> {
    vec![
        FeatureValue::Text(params.room_type.clone()),
        FeatureValue::Text(fixture.fixture_type.clone()),
        FeatureValue::Text(fixture.brand.clone()),
        FeatureValue::Number(params.area_m2),
        FeatureValue::Number(params.ceiling_height_m),
        FeatureValue::Number(f64::from(params.target_illuminance_lux)),
        FeatureValue::Number(params.budget as f64),
        FeatureValue::Number(f64::from(params.min_cri)),
        FeatureValue::Number(f64::from(params.cct_preference_k)),
        FeatureValue::Number(f64::from(params.min_ip_rating)),
        FeatureValue::Number(fixture.wattage_w),
        FeatureValue::Number(fixture.luminous_flux_lm),
        FeatureValue::Number(fixture.efficacy_lm_per_w()),
        FeatureValue::Number(fixture.price),
        FeatureValue::Number(f64::from(fixture.cct_k)),
        FeatureValue::Number(f64::from(fixture.cri)),
        FeatureValue::Number(f64::from(fixture.ip_rating)),
        FeatureValue::Number(f64::from(fixture.lifetime_h)),
        FeatureValue::Number(fixture.beam_angle_deg),
        FeatureValue::Number(f64::from(fixture_count)),
    ]
}

/// Trait for scoring models.
///
/// A model maps each feature row to one desirability score, preserving row
/// order. Implementations are loaded once at process start and shared
/// immutably.
pub trait ScoreModel: Send + Sync {
    /// Score every row of the table, one f64 per row, same order.
    fn score(&self, table: &FeatureTable) -> Result<Vec<f64>, ScoreError>;

    /// Get the model name for logging.
    fn name(&self) -> &'static str;
}

/// One-hot vocabulary for a categorical column, as fitted at training time.
#[derive(Debug, Clone, Deserialize)]
struct OneHotEncoder {
    column: String,
    categories: Vec<String>,
}

/// Mean/std standardization for a numeric column.
#[derive(Debug, Clone, Deserialize)]
struct Standardizer {
    column: String,
    mean: f64,
    std: f64,
}

/// Serialized form of a fitted preprocessing transform plus regression
/// weights: one coefficient per one-hot dimension, then one per numeric
/// column, plus an intercept.
#[derive(Debug, Clone, Deserialize)]
struct ModelArtifact {
    columns: Vec<String>,
    categorical: Vec<OneHotEncoder>,
    numeric: Vec<Standardizer>,
    coefficients: Vec<f64>,
    intercept: f64,
}

/// Linear regression over one-hot encoded categoricals and standardized
/// numerics, deserialized from a JSON artifact produced at training time.
pub struct LinearModel {
    artifact: ModelArtifact,
    categorical_indices: Vec<usize>,
    numeric_indices: Vec<usize>,
}

impl LinearModel {
    /// Load and validate a model artifact from a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ScoreError> {
        let text = fs::read_to_string(path.as_ref())?;
        let model = Self::from_json_str(&text)?;
        tracing::info!(
            path = %path.as_ref().display(),
            features = model.artifact.columns.len(),
            "loaded scoring model"
        );
        Ok(model)
    }

    /// Load and validate a model artifact from a JSON string.
    pub fn from_json_str(text: &str) -> Result<Self, ScoreError> {
        let artifact: ModelArtifact =
            serde_json::from_str(text).map_err(|e| ScoreError::Artifact(e.to_string()))?;

        if artifact.columns != FEATURE_COLUMNS {
            return Err(ScoreError::Artifact(format!(
                "artifact was fitted on a different feature schema ({} columns)",
                artifact.columns.len()
            )));
        }

        let column_index = |name: &str| {
            artifact
                .columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| {
                    ScoreError::Artifact(format!("encoder references unknown column '{name}'"))
                })
        };

        let categorical_indices = artifact
            .categorical
            .iter()
            .map(|enc| column_index(&enc.column))
            .collect::<Result<Vec<_>, _>>()?;
        let numeric_indices = artifact
            .numeric
            .iter()
            .map(|sc| column_index(&sc.column))
            .collect::<Result<Vec<_>, _>>()?;

        let one_hot_dims: usize = artifact.categorical.iter().map(|e| e.categories.len()).sum();
        let expected = one_hot_dims + artifact.numeric.len();
        if artifact.coefficients.len() != expected {
            return Err(ScoreError::Artifact(format!(
                "artifact has {} coefficients for {} feature dimensions",
                artifact.coefficients.len(),
                expected
            )));
        }

        Ok(Self {
            artifact,
            categorical_indices,
            numeric_indices,
        })
    }

    fn score_row(&self, row: &[FeatureValue]) -> Result<f64, ScoreError> {
        let mut score = self.artifact.intercept;
        let mut coef = self.artifact.coefficients.iter();

        for (encoder, &index) in self.artifact.categorical.iter().zip(&self.categorical_indices) {
            let value = match &row[index] {
                FeatureValue::Text(text) => text,
                FeatureValue::Number(_) => {
                    return Err(ScoreError::SchemaMismatch(format!(
                        "column '{}' expected a categorical value",
                        encoder.column
                    )))
                }
            };
            // Unknown categories one-hot to all zeros, matching the
            // training transform's handle_unknown behavior.
            for category in &encoder.categories {
                let weight = coef.next().expect("coefficient count validated at load");
                if category == value {
                    score += weight;
                }
            }
        }

        for (scaler, &index) in self.artifact.numeric.iter().zip(&self.numeric_indices) {
            let value = match &row[index] {
                FeatureValue::Number(v) => *v,
                FeatureValue::Text(_) => {
                    return Err(ScoreError::SchemaMismatch(format!(
                        "column '{}' expected a numeric value",
                        scaler.column
                    )))
                }
            };
            let spread = if scaler.std > 0.0 { scaler.std } else { 1.0 };
            let weight = coef.next().expect("coefficient count validated at load");
            score += weight * (value - scaler.mean) / spread;
        }

        Ok(score)
    }
}

impl ScoreModel for LinearModel {
    fn score(&self, table: &FeatureTable) -> Result<Vec<f64>, ScoreError> {
        if table.columns() != self.artifact.columns.as_slice() {
            return Err(ScoreError::SchemaMismatch(format!(
                "table has {} columns, model was fitted on {}",
                table.columns().len(),
                self.artifact.columns.len()
            )));
        }

        let scores = table
            .rows()
            .iter()
            .map(|row| self.score_row(row))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(rows = scores.len(), model = self.name(), "scored feature table");
        Ok(scores)
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

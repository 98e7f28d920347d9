//! Fixture scoring engine.
//!
//! Expands a room across the fixture catalog, computes the derived
//! engineering quantities per candidate, classifies lighting adequacy,
//! scores every candidate through the externally supplied model and
//! returns a ranked shortlist.
//!
//! The whole pipeline is a pure synchronous computation over immutable
//! inputs; every derived quantity lives in request-local structures, so
//! concurrent requests share nothing mutable.

use std::cmp::Ordering;

use thiserror::Error;

use luxrec_model::{CandidateConfiguration, FixtureRecord, IlluminationLevel, RoomParameters};
use luxrec_score::{feature_row, FeatureTable, ScoreError, ScoreModel};

/// Tunable constants of the engine. The defaults are the domain values;
/// deployments may override.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Light-loss coefficient between emitted flux and work-plane
    /// illuminance
    pub utilization_factor: f64,
    /// Achieved/target ratio above which a candidate is over-lit
    /// (strict inequality)
    pub over_lit_band: f64,
    /// Achieved/target ratio below which a candidate is under-lit
    /// (strict inequality)
    pub under_lit_band: f64,
    /// Number of candidates to keep after ranking
    pub top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            utilization_factor: 0.6,
            over_lit_band: 1.2,
            under_lit_band: 0.8,
            top_n: 3,
        }
    }
}

/// Errors from a recommendation run, one variant per failure stage.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid room parameters: {0}")]
    InvalidRoomParameters(String),

    #[error("fixture catalog is empty")]
    EmptyCatalog,

    #[error("scoring failed: {0}")]
    ScoringFailure(#[from] ScoreError),

    #[error("no fixtures satisfy the room constraints")]
    NoCandidates,
}

/// A ranked shortlist plus the one-line-per-candidate summary.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub ranked: Vec<CandidateConfiguration>,
    pub summary: String,
}

/// Produce a ranked fixture shortlist for a room.
///
/// Fails with a structured `EngineError` naming the responsible stage;
/// never returns a silently empty success.
pub fn recommend(
    params: &RoomParameters,
    fixtures: &[FixtureRecord],
    model: &dyn ScoreModel,
    config: &EngineConfig,
) -> Result<Recommendation, EngineError> {
    validate(params)?;

    if fixtures.is_empty() {
        return Err(EngineError::EmptyCatalog);
    }

    // Hard constraints: a fixture below the room's CRI or IP floor can
    // never be installed, whatever the model thinks of it. Zero-flux rows
    // are excluded here too so the count math below cannot divide by zero.
    let eligible: Vec<&FixtureRecord> = fixtures
        .iter()
        .filter(|f| {
            f.cri >= params.min_cri
                && f.ip_rating >= params.min_ip_rating
                && f.luminous_flux_lm > 0.0
        })
        .collect();

    if eligible.is_empty() {
        return Err(EngineError::NoCandidates);
    }

    tracing::debug!(
        catalog = fixtures.len(),
        eligible = eligible.len(),
        "expanding candidates"
    );

    let mut candidates = Vec::with_capacity(eligible.len());
    let mut table = FeatureTable::new();

    for fixture in eligible {
        let count = required_fixture_count(params, fixture, config);
        let achieved = fixture.luminous_flux_lm * f64::from(count) * config.utilization_factor
            / params.area_m2;
        let total_cost = fixture.price * f64::from(count);

        table.push_row(feature_row(params, fixture, count))?;
        candidates.push(CandidateConfiguration {
            fixture: fixture.clone(),
            required_fixture_count: count,
            total_power_w: fixture.wattage_w * f64::from(count),
            total_cost,
            achieved_illuminance_lux: achieved,
            illumination_level: classify(achieved, params.target_illuminance_lux, config),
            budget_fraction_pct: total_cost / params.budget as f64 * 100.0,
            predicted_score: 0.0,
        });
    }

    let scores = model.score(&table)?;
    if scores.len() != candidates.len() {
        return Err(ScoreError::RowCount {
            expected: candidates.len(),
            got: scores.len(),
        }
        .into());
    }
    for (index, (candidate, score)) in candidates.iter_mut().zip(&scores).enumerate() {
        if !score.is_finite() {
            return Err(ScoreError::NonFinite(index).into());
        }
        candidate.predicted_score = *score;
    }

    // Stable sort: equal scores keep original catalog order.
    candidates.sort_by(|a, b| {
        b.predicted_score
            .partial_cmp(&a.predicted_score)
            .unwrap_or(Ordering::Equal)
    });
    candidates.truncate(config.top_n);

    if candidates.is_empty() {
        return Err(EngineError::NoCandidates);
    }

    let summary = luxrec_explain::summarize(&candidates);

    tracing::info!(ranked = candidates.len(), "recommendation complete");
    Ok(Recommendation {
        ranked: candidates,
        summary,
    })
}

/// Reject non-positive area or budget before any division happens.
fn validate(params: &RoomParameters) -> Result<(), EngineError> {
    if !params.area_m2.is_finite() || params.area_m2 <= 0.0 {
        return Err(EngineError::InvalidRoomParameters(format!(
            "area_m2 must be positive, got {}",
            params.area_m2
        )));
    }
    if params.budget == 0 {
        return Err(EngineError::InvalidRoomParameters(
            "budget must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Fixtures needed to reach the target illuminance:
/// `ceil(E * S / (F * utilization))`, clamped to at least one.
fn required_fixture_count(
    params: &RoomParameters,
    fixture: &FixtureRecord,
    config: &EngineConfig,
) -> u32 {
    let needed = f64::from(params.target_illuminance_lux) * params.area_m2
        / (fixture.luminous_flux_lm * config.utilization_factor);
    let count = needed.ceil();
    if count < 1.0 {
        1
    } else {
        count as u32
    }
}

/// Classify achieved illuminance against the target band. Both band edges
/// use strict inequalities, so a value exactly on the edge is nominal.
fn classify(achieved_lux: f64, target_lux: u32, config: &EngineConfig) -> IlluminationLevel {
    let target = f64::from(target_lux);
    if achieved_lux > target * config.over_lit_band {
        IlluminationLevel::OverLit
    } else if achieved_lux < target * config.under_lit_band {
        IlluminationLevel::UnderLit
    } else {
        IlluminationLevel::Nominal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Deterministic stand-in for a trained model: score = wattage weight.
    struct WattageModel;

    impl ScoreModel for WattageModel {
        fn score(&self, table: &FeatureTable) -> Result<Vec<f64>, ScoreError> {
            let wattage_index = table
                .columns()
                .iter()
                .position(|c| c == "wattage_w")
                .unwrap();
            Ok(table
                .rows()
                .iter()
                .map(|row| match &row[wattage_index] {
                    luxrec_score::FeatureValue::Number(w) => *w,
                    _ => 0.0,
                })
                .collect())
        }

        fn name(&self) -> &'static str {
            "wattage-stub"
        }
    }

    /// Model that scores every row the same.
    struct ConstantModel(f64);

    impl ScoreModel for ConstantModel {
        fn score(&self, table: &FeatureTable) -> Result<Vec<f64>, ScoreError> {
            Ok(vec![self.0; table.len()])
        }

        fn name(&self) -> &'static str {
            "constant-stub"
        }
    }

    /// Model that violates the row-count contract.
    struct TruncatingModel;

    impl ScoreModel for TruncatingModel {
        fn score(&self, _table: &FeatureTable) -> Result<Vec<f64>, ScoreError> {
            Ok(vec![1.0])
        }

        fn name(&self) -> &'static str {
            "truncating-stub"
        }
    }

    fn fixture(brand: &str, flux: f64, wattage: f64) -> FixtureRecord {
        FixtureRecord {
            luminous_flux_lm: flux,
            wattage_w: wattage,
            ..FixtureRecord::new(brand, "panel")
        }
    }

    #[test]
    fn test_required_count_formula() {
        // ceil(400 * 45 / (3600 * 0.6)) = ceil(8.33) = 9
        let params = RoomParameters::default().with_area(45.0);
        let count =
            required_fixture_count(&params, &fixture("A", 3600.0, 36.0), &EngineConfig::default());
        assert_eq!(count, 9);
    }

    #[test]
    fn test_required_count_clamped_to_one() {
        // A single oversized fixture already exceeds the target.
        let params = RoomParameters::default().with_area(1.0);
        let count = required_fixture_count(
            &params,
            &fixture("A", 100_000.0, 500.0),
            &EngineConfig::default(),
        );
        assert_eq!(count, 1);
    }

    #[test]
    fn test_classification_band_edges_are_nominal() {
        let config = EngineConfig::default();
        assert_eq!(classify(480.0, 400, &config), IlluminationLevel::Nominal);
        assert_eq!(classify(320.0, 400, &config), IlluminationLevel::Nominal);
        assert_eq!(classify(480.1, 400, &config), IlluminationLevel::OverLit);
        assert_eq!(classify(319.9, 400, &config), IlluminationLevel::UnderLit);
    }

    #[test]
    fn test_ranking_by_score_descending() {
        let params = RoomParameters::default();
        let fixtures = vec![
            fixture("Low", 3600.0, 20.0),
            fixture("High", 3600.0, 80.0),
            fixture("Mid", 3600.0, 50.0),
        ];
        let result =
            recommend(&params, &fixtures, &WattageModel, &EngineConfig::default()).unwrap();
        let brands: Vec<&str> = result
            .ranked
            .iter()
            .map(|c| c.fixture.brand.as_str())
            .collect();
        assert_eq!(brands, vec!["High", "Mid", "Low"]);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let params = RoomParameters::default();
        let fixtures = vec![
            fixture("First", 3600.0, 36.0),
            fixture("Second", 3600.0, 36.0),
            fixture("Third", 3600.0, 36.0),
        ];
        let result =
            recommend(&params, &fixtures, &ConstantModel(0.5), &EngineConfig::default()).unwrap();
        let brands: Vec<&str> = result
            .ranked
            .iter()
            .map(|c| c.fixture.brand.as_str())
            .collect();
        assert_eq!(brands, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_top_n_truncation() {
        let params = RoomParameters::default();
        let fixtures: Vec<FixtureRecord> =
            (0..10).map(|i| fixture(&format!("B{i}"), 3600.0, 36.0)).collect();
        let result =
            recommend(&params, &fixtures, &ConstantModel(1.0), &EngineConfig::default()).unwrap();
        assert_eq!(result.ranked.len(), 3);
    }

    #[test]
    fn test_engineering_quantities() {
        let params = RoomParameters::default()
            .with_area(45.0)
            .with_budget(20_000);
        let fixtures = vec![FixtureRecord {
            price: 1000.0,
            ..fixture("A", 3600.0, 36.0)
        }];
        let result =
            recommend(&params, &fixtures, &ConstantModel(1.0), &EngineConfig::default()).unwrap();
        let candidate = &result.ranked[0];

        assert_eq!(candidate.required_fixture_count, 9);
        assert_eq!(candidate.total_power_w, 324.0);
        assert_eq!(candidate.total_cost, 9000.0);
        assert_eq!(candidate.achieved_illuminance_lux, 3600.0 * 9.0 * 0.6 / 45.0);
        assert_eq!(candidate.budget_fraction_pct, 45.0);
    }

    #[test]
    fn test_empty_catalog_reported() {
        let result = recommend(
            &RoomParameters::default(),
            &[],
            &ConstantModel(1.0),
            &EngineConfig::default(),
        );
        assert!(matches!(result, Err(EngineError::EmptyCatalog)));
    }

    #[test]
    fn test_zero_area_rejected_before_division() {
        let params = RoomParameters {
            area_m2: 0.0,
            ..RoomParameters::default()
        };
        let result = recommend(
            &params,
            &[fixture("A", 3600.0, 36.0)],
            &ConstantModel(1.0),
            &EngineConfig::default(),
        );
        assert!(matches!(result, Err(EngineError::InvalidRoomParameters(_))));
    }

    #[test]
    fn test_constraint_filter_yields_no_candidates() {
        let params = RoomParameters {
            min_cri: 95,
            ..RoomParameters::default()
        };
        // Catalog fixture CRI is 80, below the floor.
        let result = recommend(
            &params,
            &[fixture("A", 3600.0, 36.0)],
            &ConstantModel(1.0),
            &EngineConfig::default(),
        );
        assert!(matches!(result, Err(EngineError::NoCandidates)));
    }

    #[test]
    fn test_row_count_contract_enforced() {
        let fixtures = vec![fixture("A", 3600.0, 36.0), fixture("B", 3600.0, 36.0)];
        let result = recommend(
            &RoomParameters::default(),
            &fixtures,
            &TruncatingModel,
            &EngineConfig::default(),
        );
        assert!(matches!(
            result,
            Err(EngineError::ScoringFailure(ScoreError::RowCount {
                expected: 2,
                got: 1
            }))
        ));
    }

    #[test]
    fn test_non_finite_score_reported() {
        let result = recommend(
            &RoomParameters::default(),
            &[fixture("A", 3600.0, 36.0)],
            &ConstantModel(f64::NAN),
            &EngineConfig::default(),
        );
        assert!(matches!(
            result,
            Err(EngineError::ScoringFailure(ScoreError::NonFinite(0)))
        ));
    }

    #[test]
    fn test_idempotent_output() {
        let params = RoomParameters::default().with_area(45.0);
        let fixtures = vec![fixture("A", 3600.0, 36.0), fixture("B", 5000.0, 50.0)];
        let config = EngineConfig::default();

        let first = recommend(&params, &fixtures, &WattageModel, &config).unwrap();
        let second = recommend(&params, &fixtures, &WattageModel, &config).unwrap();

        assert_eq!(
            serde_json::to_string(&first.ranked).unwrap(),
            serde_json::to_string(&second.ranked).unwrap()
        );
        assert_eq!(first.summary, second.summary);
    }
}

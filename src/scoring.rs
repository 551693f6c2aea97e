//! Score engine.
//!
//! Two strategies map the four applicant attributes to a score in
//! [`MIN_SCORE`, `MAX_SCORE`]:
//!
//! - **Formula**: hand-weighted sub-scores (employment 40%, cash flow 30%,
//!   punctuality 30%) rescaled from 0-100 onto the product range.
//! - **LearnedModel**: a linear regression trained offline by the
//!   `train_model` binary.
//!
//! The strategy is picked once at startup. When the learned model cannot be
//! loaded the service scores everybody with [`DEFAULT_SCORE`] instead of
//! failing.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::features::FeatureRanges;
use crate::model::{ModelArtifact, ModelError};
use crate::models::ApplicantFeatures;

pub const MIN_SCORE: f64 = 300.0;
pub const MAX_SCORE: f64 = 800.0;

/// Score handed out while the learned model is unavailable.
pub const DEFAULT_SCORE: f64 = MIN_SCORE;

const EMPLOYMENT_WEIGHT: f64 = 0.4;
const CASHFLOW_WEIGHT: f64 = 0.3;
const PUNCTUALITY_WEIGHT: f64 = 0.3;

const MAX_EMPLOYMENT_MONTHS: f64 = 120.0;
const CASHFLOW_SCALE: f64 = 5000.0;
const MAX_ON_TIME_PAYMENTS: f64 = 24.0;

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Normalized sub-scores of the weighted formula, each on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub employment_score: f64,
    pub cashflow_score: f64,
    pub punctuality_score: f64,
    /// Weighted sum of the three sub-scores, 0-100.
    pub weighted_sum: f64,
}

impl ScoreBreakdown {
    pub fn from_features(features: &ApplicantFeatures) -> Self {
        let employment_score =
            f64::from(features.employment_months) / MAX_EMPLOYMENT_MONTHS * 100.0;
        let cashflow_score =
            ((features.incoming_cash - features.outgoing_cash) / CASHFLOW_SCALE * 100.0).max(0.0);
        let punctuality_score =
            f64::from(features.on_time_payments) / MAX_ON_TIME_PAYMENTS * 100.0;

        let weighted_sum = employment_score * EMPLOYMENT_WEIGHT
            + cashflow_score * CASHFLOW_WEIGHT
            + punctuality_score * PUNCTUALITY_WEIGHT;

        Self {
            employment_score,
            cashflow_score,
            punctuality_score,
            weighted_sum,
        }
    }

    /// Weighted sum rescaled onto [`MIN_SCORE`, `MAX_SCORE`].
    pub fn scaled_score(&self) -> f64 {
        MIN_SCORE + self.weighted_sum / 100.0 * (MAX_SCORE - MIN_SCORE)
    }
}

/// Weighted-formula score, rounded to two decimals.
pub fn formula_score(features: &ApplicantFeatures) -> f64 {
    round2(ScoreBreakdown::from_features(features).scaled_score())
}

/// Which strategy the configuration asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    Formula,
    Model,
}

#[derive(Debug, Clone)]
pub enum ScoringStrategy {
    Formula,
    LearnedModel(Arc<ModelArtifact>),
    /// The learned model was requested but could not be loaded.
    Fallback { reason: String },
}

impl ScoringStrategy {
    /// Resolve the configured mode into a ready strategy.
    ///
    /// A model that fails to load is not an error: the returned strategy is
    /// [`ScoringStrategy::Fallback`] and the failure is logged.
    pub fn resolve(mode: ScoringMode, model_path: &Path) -> Self {
        match mode {
            ScoringMode::Formula => {
                tracing::info!("Scoring strategy: weighted formula");
                ScoringStrategy::Formula
            }
            ScoringMode::Model => match ModelArtifact::load(model_path) {
                Ok(artifact) => {
                    tracing::info!(
                        "✓ Scoring strategy: learned model from {} ({} training rows)",
                        model_path.display(),
                        artifact.trained_rows
                    );
                    ScoringStrategy::LearnedModel(Arc::new(artifact))
                }
                Err(e) => Self::fallback(model_path, e),
            },
        }
    }

    fn fallback(model_path: &Path, error: ModelError) -> Self {
        tracing::warn!(
            "Scoring model unavailable at {}: {}. Falling back to default score {}",
            model_path.display(),
            error,
            DEFAULT_SCORE
        );
        ScoringStrategy::Fallback {
            reason: error.to_string(),
        }
    }

    pub fn score(&self, features: &ApplicantFeatures) -> f64 {
        match self {
            ScoringStrategy::Formula => formula_score(features),
            ScoringStrategy::LearnedModel(artifact) => {
                let prediction = artifact.model().predict(features);
                round2(prediction.clamp(MIN_SCORE, MAX_SCORE))
            }
            ScoringStrategy::Fallback { reason } => {
                tracing::warn!(
                    "Scoring model unavailable ({}), using default score {}",
                    reason,
                    DEFAULT_SCORE
                );
                DEFAULT_SCORE
            }
        }
    }

    /// Ranges new applicants are sampled from.
    pub fn feature_ranges(&self) -> FeatureRanges {
        match self {
            ScoringStrategy::LearnedModel(artifact) => artifact.feature_ranges,
            _ => FeatureRanges::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScoringStrategy::Formula => "formula",
            ScoringStrategy::LearnedModel(_) => "learned_model",
            ScoringStrategy::Fallback { .. } => "fallback",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinearModel;

    fn features(employment: i32, incoming: f64, outgoing: f64, on_time: i32) -> ApplicantFeatures {
        ApplicantFeatures {
            employment_months: employment,
            incoming_cash: incoming,
            outgoing_cash: outgoing,
            on_time_payments: on_time,
        }
    }

    #[test]
    fn test_best_applicant_breakdown() {
        let breakdown = ScoreBreakdown::from_features(&features(120, 5000.0, 100.0, 24));

        assert!((breakdown.employment_score - 100.0).abs() < 1e-9);
        assert!((breakdown.cashflow_score - 98.0).abs() < 1e-9);
        assert!((breakdown.punctuality_score - 100.0).abs() < 1e-9);
        assert!((breakdown.weighted_sum - 99.4).abs() < 1e-9);
        assert_eq!(formula_score(&features(120, 5000.0, 100.0, 24)), 797.0);
    }

    #[test]
    fn test_negative_cashflow_floors_at_zero() {
        let breakdown = ScoreBreakdown::from_features(&features(0, 500.0, 4000.0, 0));

        assert_eq!(breakdown.cashflow_score, 0.0);
        assert_eq!(breakdown.weighted_sum, 0.0);
        assert_eq!(formula_score(&features(0, 500.0, 4000.0, 0)), MIN_SCORE);
    }

    #[test]
    fn test_midrange_applicant() {
        // 60/120 -> 50, (3000-1000)/5000 -> 40, 12/24 -> 50
        // 0.4*50 + 0.3*40 + 0.3*50 = 47 -> 300 + 235
        assert_eq!(formula_score(&features(60, 3000.0, 1000.0, 12)), 535.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(8.932203), 8.93);
        assert_eq!(round2(27.2349), 27.23);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_learned_model_prediction_is_clamped() {
        let low = ModelArtifact::new(
            LinearModel {
                coefficients: [0.0; 4],
                intercept: 120.0,
            },
            FeatureRanges::default(),
            10,
        );
        let high = ModelArtifact::new(
            LinearModel {
                coefficients: [0.0; 4],
                intercept: 1200.0,
            },
            FeatureRanges::default(),
            10,
        );
        let f = features(10, 1000.0, 900.0, 3);

        assert_eq!(ScoringStrategy::LearnedModel(Arc::new(low)).score(&f), MIN_SCORE);
        assert_eq!(ScoringStrategy::LearnedModel(Arc::new(high)).score(&f), MAX_SCORE);
    }

    #[test]
    fn test_missing_model_falls_back() {
        let strategy = ScoringStrategy::resolve(
            ScoringMode::Model,
            Path::new("/nonexistent/credit_score_model.json"),
        );

        assert_eq!(strategy.name(), "fallback");
        assert_eq!(strategy.score(&features(120, 5000.0, 100.0, 24)), DEFAULT_SCORE);
        assert_eq!(strategy.feature_ranges(), FeatureRanges::default());
    }

    #[test]
    fn test_formula_mode_ignores_model_path() {
        let strategy = ScoringStrategy::resolve(ScoringMode::Formula, Path::new("missing.json"));
        assert_eq!(strategy.name(), "formula");
    }
}

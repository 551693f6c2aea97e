//! Offline fit of the learned scoring model.
//!
//! Ordinary least squares over `[1, employment_months, incoming_cash,
//! outgoing_cash, on_time_payments]`, solved with SVD so a rank-deficient
//! design (e.g. every applicant with the same tenure) still yields the
//! minimum-norm solution instead of failing. A linear fit is used in place
//! of a tree ensemble so the artifact stays a handful of checksummed numbers.

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::features::FeatureRanges;
use crate::model::{LinearModel, ModelError};
use crate::models::ApplicantFeatures;

pub const MIN_TRAINING_ROWS: usize = 5;
pub const TEST_FRACTION: f64 = 0.2;
pub const SPLIT_SEED: u64 = 42;

pub type TrainingRow = (ApplicantFeatures, f64);

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub model: LinearModel,
    /// Ranges observed across all rows, used to sample new applicants.
    pub feature_ranges: FeatureRanges,
    /// Rows the model was fitted on (the held-out rows excluded).
    pub train_rows: usize,
    pub test_rows: usize,
    pub train_rmse: f64,
    pub test_rmse: f64,
}

/// Shuffle with a fixed seed and hold out `test_fraction` of the rows.
///
/// At least one row is held out whenever there are two or more rows.
pub fn train_test_split<T: Clone>(rows: &[T], test_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut shuffled = rows.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(seed));

    let test_len = if rows.len() < 2 {
        0
    } else {
        ((rows.len() as f64 * test_fraction).ceil() as usize).clamp(1, rows.len() - 1)
    };
    let test = shuffled.split_off(rows.len() - test_len);
    (shuffled, test)
}

pub fn fit_linear_model(rows: &[TrainingRow]) -> Result<LinearModel, ModelError> {
    if rows.is_empty() {
        return Err(ModelError::InvalidParameters(
            "no rows to fit".to_string(),
        ));
    }

    let n = rows.len();
    let x = DMatrix::from_fn(n, 5, |i, j| {
        if j == 0 {
            1.0
        } else {
            rows[i].0.as_array()[j - 1]
        }
    });
    let y = DVector::from_iterator(n, rows.iter().map(|(_, score)| *score));

    let svd = x.svd(true, true);
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(&y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Ok(LinearModel {
                    intercept: beta[0],
                    coefficients: [beta[1], beta[2], beta[3], beta[4]],
                });
            }
        }
    }

    Err(ModelError::InvalidParameters(
        "least squares solve did not converge".to_string(),
    ))
}

/// Root mean squared error of `model` on `rows`; 0 for no rows.
pub fn rmse(model: &LinearModel, rows: &[TrainingRow]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let sum: f64 = rows
        .iter()
        .map(|(features, score)| (model.predict(features) - score).powi(2))
        .sum();
    (sum / rows.len() as f64).sqrt()
}

/// Split, fit on the training part and report errors on both parts.
pub fn train(rows: &[TrainingRow], seed: u64) -> Result<TrainingReport, ModelError> {
    if rows.len() < MIN_TRAINING_ROWS {
        return Err(ModelError::InvalidParameters(format!(
            "need at least {} applicants to train, found {}",
            MIN_TRAINING_ROWS,
            rows.len()
        )));
    }

    let feature_ranges = FeatureRanges::observed(rows.iter().map(|(f, _)| f)).unwrap_or_default();
    let (train_set, test_set) = train_test_split(rows, TEST_FRACTION, seed);
    let model = fit_linear_model(&train_set)?;

    Ok(TrainingReport {
        feature_ranges,
        train_rmse: rmse(&model, &train_set),
        test_rmse: rmse(&model, &test_set),
        train_rows: train_set.len(),
        test_rows: test_set.len(),
        model,
    })
}

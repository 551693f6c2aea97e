use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

use crate::features::FeatureRanges;
use crate::models::ApplicantFeatures;

/// Input schema of the learned model, in coefficient order.
pub const FEATURE_NAMES: [&str; 4] = [
    "employment_months",
    "incoming_cash",
    "outgoing_cash",
    "on_time_payments",
];

pub const ARTIFACT_VERSION: u32 = 1;

/// Why a model artifact could not be used.
#[derive(Debug)]
pub enum ModelError {
    /// Artifact file could not be read or written.
    Io(std::io::Error),
    /// Artifact file is not valid JSON for this schema.
    Parse(serde_json::Error),
    /// Feature names, version or ranges do not match what the service expects.
    SchemaMismatch(String),
    /// Stored checksum does not match the model parameters.
    ChecksumMismatch,
    /// Non-finite parameters, or not enough data to fit.
    InvalidParameters(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Io(e) => write!(f, "Model artifact I/O error: {}", e),
            ModelError::Parse(e) => write!(f, "Model artifact parse error: {}", e),
            ModelError::SchemaMismatch(msg) => write!(f, "Model schema mismatch: {}", msg),
            ModelError::ChecksumMismatch => write!(f, "Model artifact checksum mismatch"),
            ModelError::InvalidParameters(msg) => write!(f, "Invalid model parameters: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        ModelError::Io(err)
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Parse(err)
    }
}

/// `score = intercept + Σ coefficients[i] * features[i]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: [f64; 4],
    pub intercept: f64,
}

impl LinearModel {
    pub fn predict(&self, features: &ApplicantFeatures) -> f64 {
        self.coefficients
            .iter()
            .zip(features.as_array())
            .fold(self.intercept, |acc, (coef, value)| acc + coef * value)
    }

    fn is_finite(&self) -> bool {
        self.intercept.is_finite() && self.coefficients.iter().all(|c| c.is_finite())
    }
}

/// Serialized learned model, as written by the `train_model` binary.
///
/// The checksum is a SHA-256 over the parameters and schema so a hand-edited
/// or truncated artifact is rejected instead of silently mispricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: u32,
    pub feature_names: Vec<String>,
    pub feature_ranges: FeatureRanges,
    pub coefficients: [f64; 4],
    pub intercept: f64,
    pub trained_rows: usize,
    pub trained_at: DateTime<Utc>,
    pub checksum: String,
}

impl ModelArtifact {
    pub fn new(model: LinearModel, feature_ranges: FeatureRanges, trained_rows: usize) -> Self {
        let mut artifact = Self {
            version: ARTIFACT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            feature_ranges,
            coefficients: model.coefficients,
            intercept: model.intercept,
            trained_rows,
            trained_at: Utc::now(),
            checksum: String::new(),
        };
        artifact.checksum = artifact.compute_checksum();
        artifact
    }

    pub fn model(&self) -> LinearModel {
        LinearModel {
            coefficients: self.coefficients,
            intercept: self.intercept,
        }
    }

    /// Read and validate an artifact.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&raw)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.version != ARTIFACT_VERSION {
            return Err(ModelError::SchemaMismatch(format!(
                "unsupported artifact version {} (expected {})",
                self.version, ARTIFACT_VERSION
            )));
        }
        if self.feature_names != FEATURE_NAMES {
            return Err(ModelError::SchemaMismatch(format!(
                "expected features {:?}, found {:?}",
                FEATURE_NAMES, self.feature_names
            )));
        }
        if !self.feature_ranges.is_within_defaults() {
            return Err(ModelError::SchemaMismatch(format!(
                "feature ranges {:?} exceed the supported domain",
                self.feature_ranges
            )));
        }
        if !self.model().is_finite() {
            return Err(ModelError::InvalidParameters(
                "coefficients and intercept must be finite".to_string(),
            ));
        }
        if self.compute_checksum() != self.checksum {
            tracing::warn!(
                "Model checksum mismatch. Stored: {}, trained rows: {}",
                self.checksum,
                self.trained_rows
            );
            return Err(ModelError::ChecksumMismatch);
        }
        Ok(())
    }

    fn compute_checksum(&self) -> String {
        let canonical = serde_json::to_string(&(
            self.version,
            &self.feature_names,
            &self.feature_ranges,
            &self.coefficients,
            self.intercept,
        ))
        .unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hex::encode(hasher.finalize())
    }
}

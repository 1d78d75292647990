use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;
use crate::models::HealthRating;

/// Scaler entries below this are treated as constant features and zeroed
/// after standardization.
const MIN_SCALE: f64 = 1e-6;

/// A pre-trained standardized linear model, stored as an opaque versioned
/// JSON artifact.
///
/// Inference standardizes the feature vector with the stored scaler
/// (`(x - mean) / scale`), then computes `intercept + coef · x`. Categorical
/// inputs (species, health) are encoded through the index maps the training
/// run exported; unknown codes map to a neutral default rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearArtifact {
    #[serde(default)]
    pub version: String,
    pub coef: Vec<f64>,
    pub intercept: f64,
    pub scaler_mean: Vec<f64>,
    pub scaler_scale: Vec<f64>,
    #[serde(default)]
    pub species_index: BTreeMap<String, f64>,
    #[serde(default)]
    pub health_index: BTreeMap<String, f64>,
}

impl LinearArtifact {
    /// Load an artifact from a JSON file and check its dimensions against
    /// the feature layout the caller will feed it.
    pub fn from_path(
        path: impl AsRef<Path>,
        expected_features: usize,
    ) -> Result<Self, ForecastError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            ForecastError::ModelUnavailable(format!("{}: {e}", path.display()))
        })?;
        let artifact: LinearArtifact = serde_json::from_slice(&bytes).map_err(|e| {
            ForecastError::ModelUnavailable(format!("{}: {e}", path.display()))
        })?;
        artifact.validate(expected_features)?;
        Ok(artifact)
    }

    /// Check coefficient/scaler dimensions and finiteness.
    pub fn validate(&self, expected_features: usize) -> Result<(), ForecastError> {
        let n = self.coef.len();
        if n == 0 {
            return Err(ForecastError::ModelUnavailable(
                "artifact has no coefficients".to_string(),
            ));
        }
        if n != expected_features {
            return Err(ForecastError::ModelUnavailable(format!(
                "artifact expects {n} features, engine supplies {expected_features}"
            )));
        }
        if self.scaler_mean.len() != n || self.scaler_scale.len() != n {
            return Err(ForecastError::ModelUnavailable(format!(
                "scaler dimensions ({}, {}) do not match {n} coefficients",
                self.scaler_mean.len(),
                self.scaler_scale.len()
            )));
        }
        let all = self
            .coef
            .iter()
            .chain(&self.scaler_mean)
            .chain(&self.scaler_scale)
            .chain(std::iter::once(&self.intercept));
        for v in all {
            if !v.is_finite() {
                return Err(ForecastError::ModelUnavailable(
                    "artifact contains non-finite parameters".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Linear prediction over a raw (unscaled) feature vector.
    ///
    /// The vector length must match the validated dimensions; this is an
    /// internal invariant, not a user input.
    pub fn predict(&self, features: &[f64]) -> f64 {
        debug_assert_eq!(features.len(), self.coef.len());
        let mut prediction = self.intercept;
        for i in 0..self.coef.len() {
            let normalized = if self.scaler_scale[i] > MIN_SCALE {
                (features[i] - self.scaler_mean[i]) / self.scaler_scale[i]
            } else {
                0.0
            };
            prediction += self.coef[i] * normalized;
        }
        prediction
    }

    /// Encode a species code; unknown or absent codes get the neutral 0.
    pub fn encode_species(&self, code: Option<&str>) -> f64 {
        code.and_then(|c| self.species_index.get(c).copied())
            .unwrap_or(0.0)
    }

    /// Encode a health rating; ratings the artifact never saw fall back to
    /// the Fair encoding, then to 0.
    pub fn encode_health(&self, health: HealthRating) -> f64 {
        self.health_index
            .get(&health.to_string())
            .or_else(|| self.health_index.get("Fair"))
            .copied()
            .unwrap_or(0.0)
    }
}

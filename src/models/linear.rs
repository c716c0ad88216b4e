//! Linear regression model restored from its JSON export

use crate::error::ArtifactError;
use crate::feature_extractor::{ScaledFeatureVector, FEATURE_COUNT};
use crate::models::{check_arity, check_feature_names, Regressor};
use serde::Deserialize;
use std::path::Path;

/// On-disk layout of a fitted linear regressor
#[derive(Debug, Clone, Deserialize)]
pub struct LinearArtifact {
    /// Present when the model was fitted on a named frame
    #[serde(default)]
    pub feature_names_in: Option<Vec<String>>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// `intercept + Σ coefficient_i * x_i` over the scaled features
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegressor {
    pub fn from_artifact(artifact: LinearArtifact, path: &Path) -> Result<Self, ArtifactError> {
        if let Some(names) = &artifact.feature_names_in {
            check_feature_names(path, names)?;
        }
        if artifact.coefficients.len() != FEATURE_COUNT {
            return Err(ArtifactError::Incompatible {
                path: path.to_path_buf(),
                reason: format!(
                    "expected {} coefficients, got {}",
                    FEATURE_COUNT,
                    artifact.coefficients.len()
                ),
            });
        }
        if !artifact.intercept.is_finite() || artifact.coefficients.iter().any(|c| !c.is_finite())
        {
            return Err(ArtifactError::Incompatible {
                path: path.to_path_buf(),
                reason: "coefficients and intercept must be finite".to_string(),
            });
        }

        Ok(Self {
            coefficients: artifact.coefficients,
            intercept: artifact.intercept,
        })
    }
}

impl Regressor for LinearRegressor {
    fn name(&self) -> &str {
        "linear"
    }

    fn predict(&self, features: &ScaledFeatureVector) -> Result<f64, ArtifactError> {
        check_arity("model", self.coefficients.len(), features.len())?;

        let prediction = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.values())
                .map(|(c, x)| c * x)
                .sum::<f64>();

        if prediction.is_finite() {
            Ok(prediction)
        } else {
            Err(ArtifactError::NonFiniteOutput { artifact: "model" })
        }
    }
}

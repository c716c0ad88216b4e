//! Standard scaler restored from its JSON export

use crate::error::ArtifactError;
use crate::feature_extractor::{FeatureVector, ScaledFeatureVector, FEATURE_COUNT};
use crate::models::{check_arity, check_feature_names, FeatureScaler};
use serde::Deserialize;
use std::path::Path;

/// On-disk layout of a fitted standard scaler
#[derive(Debug, Clone, Deserialize)]
pub struct ScalerArtifact {
    pub feature_names_in: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Standardization `(x - mean) / scale` with statistics frozen at fit time
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Check an exported scaler against the fitted schema
    pub fn from_artifact(artifact: ScalerArtifact, path: &Path) -> Result<Self, ArtifactError> {
        check_feature_names(path, &artifact.feature_names_in)?;

        let incompatible = |reason: String| ArtifactError::Incompatible {
            path: path.to_path_buf(),
            reason,
        };

        if artifact.mean.len() != FEATURE_COUNT || artifact.scale.len() != FEATURE_COUNT {
            return Err(incompatible(format!(
                "expected {} means and scales, got {} and {}",
                FEATURE_COUNT,
                artifact.mean.len(),
                artifact.scale.len()
            )));
        }
        if artifact.mean.iter().any(|m| !m.is_finite()) {
            return Err(incompatible("mean contains non-finite values".to_string()));
        }
        if artifact.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(incompatible(
                "scale must be finite and non-zero".to_string(),
            ));
        }

        Ok(Self {
            mean: artifact.mean,
            scale: artifact.scale,
        })
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }
}

impl FeatureScaler for StandardScaler {
    fn transform(&self, features: &FeatureVector) -> Result<ScaledFeatureVector, ArtifactError> {
        let values = features.values();
        check_arity("scaler", self.mean.len(), values.len())?;

        Ok(ScaledFeatureVector::new(
            values
                .iter()
                .zip(self.mean.iter().zip(&self.scale))
                .map(|(x, (mean, scale))| (x - mean) / scale)
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_extractor::{FeatureExtractor, FEATURE_SCHEMA};
    use crate::types::PredictionRequest;

    fn artifact(mean: Vec<f64>, scale: Vec<f64>) -> ScalerArtifact {
        ScalerArtifact {
            feature_names_in: FEATURE_SCHEMA.iter().map(|c| c.name.to_string()).collect(),
            mean,
            scale,
        }
    }

    fn features(h: f64, r: f64, f: f64) -> FeatureVector {
        FeatureExtractor::new().extract(&PredictionRequest::new(h, r, f).unwrap())
    }

    #[test]
    fn test_standardizes_each_column() {
        let scaler = StandardScaler::from_artifact(
            artifact(vec![50.0, 20.0, 10.0], vec![10.0, 5.0, 2.0]),
            Path::new("scaler.json"),
        )
        .unwrap();

        let scaled = scaler.transform(&features(60.0, 15.0, 10.0)).unwrap();
        assert_eq!(scaled.values(), &[1.0, -1.0, 0.0]);
    }

    #[test]
    fn test_rejects_zero_scale() {
        let result = StandardScaler::from_artifact(
            artifact(vec![0.0; 3], vec![1.0, 0.0, 1.0]),
            Path::new("scaler.json"),
        );
        assert!(matches!(result, Err(ArtifactError::Incompatible { .. })));
    }

    #[test]
    fn test_rejects_wrong_arity() {
        let result = StandardScaler::from_artifact(
            artifact(vec![0.0; 2], vec![1.0; 2]),
            Path::new("scaler.json"),
        );
        assert!(matches!(result, Err(ArtifactError::Incompatible { .. })));
    }

    #[test]
    fn test_deserializes_export() {
        let json = r#"{
            "feature_names_in": [
                "Household estimate (kg/capita/year)",
                "Retail estimate (kg/capita/year)",
                "Food service estimate (kg/capita/year)"
            ],
            "mean": [80.1, 15.9, 25.7],
            "scale": [24.3, 9.8, 10.2]
        }"#;
        let artifact: ScalerArtifact = serde_json::from_str(json).unwrap();
        let scaler = StandardScaler::from_artifact(artifact, Path::new("scaler.json")).unwrap();
        assert_eq!(scaler.mean(), &[80.1, 15.9, 25.7]);
        assert_eq!(scaler.scale(), &[24.3, 9.8, 10.2]);
    }
}

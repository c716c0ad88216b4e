//! Process-wide handle to the loaded artifacts

use crate::config::ArtifactsConfig;
use crate::error::ArtifactError;
use crate::feature_extractor::{FeatureVector, ScaledFeatureVector};
use crate::models::loader::ArtifactLoader;
use crate::models::{FeatureScaler, Regressor};
use tracing::info;

/// The fitted scaler and model, loaded once and shared read-only.
///
/// Neither operation checks input bounds; callers hand in validated features.
pub struct ArtifactStore {
    scaler: Box<dyn FeatureScaler>,
    model: Box<dyn Regressor>,
}

impl ArtifactStore {
    /// Load both artifacts. Any failure here means the service cannot serve.
    pub fn load(config: &ArtifactsConfig) -> Result<Self, ArtifactError> {
        let loader = ArtifactLoader::with_threads(config.onnx_threads);

        let scaler = loader.load_scaler(config.scaler_path())?;
        let model = loader.load_model(config.model_path(), config.model_format)?;

        info!(
            artifacts_dir = %config.artifacts_dir,
            model = %model.name(),
            "Artifact store initialized"
        );

        Ok(Self::from_parts(Box::new(scaler), model))
    }

    /// Assemble a store from already-built artifacts
    pub fn from_parts(scaler: Box<dyn FeatureScaler>, model: Box<dyn Regressor>) -> Self {
        Self { scaler, model }
    }

    pub fn transform(
        &self,
        features: &FeatureVector,
    ) -> Result<ScaledFeatureVector, ArtifactError> {
        self.scaler.transform(features)
    }

    pub fn predict(&self, scaled: &ScaledFeatureVector) -> Result<f64, ArtifactError> {
        self.model.predict(scaled)
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelFormat;
    use crate::feature_extractor::FeatureExtractor;
    use crate::types::PredictionRequest;
    use std::fs;
    use std::path::Path;

    fn write_artifacts(dir: &Path) {
        fs::write(
            dir.join("scaler.json"),
            r#"{
                "feature_names_in": [
                    "Household estimate (kg/capita/year)",
                    "Retail estimate (kg/capita/year)",
                    "Food service estimate (kg/capita/year)"
                ],
                "mean": [50.0, 20.0, 10.0],
                "scale": [10.0, 5.0, 2.0]
            }"#,
        )
        .unwrap();
        fs::write(
            dir.join("model.json"),
            r#"{"coefficients": [3.0, 2.0, 1.0], "intercept": 100.0}"#,
        )
        .unwrap();
    }

    fn config(dir: &Path) -> ArtifactsConfig {
        ArtifactsConfig {
            artifacts_dir: dir.display().to_string(),
            scaler_file: "scaler.json".to_string(),
            model_file: "model.json".to_string(),
            model_format: ModelFormat::Linear,
            onnx_threads: 1,
        }
    }

    #[test]
    fn test_load_and_run() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());

        let store = ArtifactStore::load(&config(dir.path())).unwrap();
        let features =
            FeatureExtractor::new().extract(&PredictionRequest::new(60.0, 25.0, 12.0).unwrap());

        let scaled = store.transform(&features).unwrap();
        assert_eq!(scaled.values(), &[1.0, 1.0, 1.0]);
        assert_eq!(store.predict(&scaled).unwrap(), 106.0);
        assert_eq!(store.model_name(), "linear");
    }

    #[test]
    fn test_missing_model_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        fs::remove_file(dir.path().join("model.json")).unwrap();

        let result = ArtifactStore::load(&config(dir.path()));
        assert!(matches!(result, Err(ArtifactError::Missing { .. })));
    }
}

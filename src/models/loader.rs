//! Artifact loader for the scaler and model files

use crate::config::ModelFormat;
use crate::error::ArtifactError;
use crate::models::inference::OnnxRegressor;
use crate::models::linear::{LinearArtifact, LinearRegressor};
use crate::models::scaler::{ScalerArtifact, StandardScaler};
use crate::models::Regressor;
use ort::session::{builder::GraphOptimizationLevel, Session};
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

/// Loader for trained artifacts
pub struct ArtifactLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ArtifactLoader {
    /// Create a new loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a new loader with specified number of ONNX threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Load the standard scaler export
    pub fn load_scaler<P: AsRef<Path>>(&self, path: P) -> Result<StandardScaler, ArtifactError> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading scaler");

        let artifact: ScalerArtifact = read_json(path)?;
        let scaler = StandardScaler::from_artifact(artifact, path)?;

        info!(
            path = %path.display(),
            mean = ?scaler.mean(),
            scale = ?scaler.scale(),
            "Scaler loaded successfully"
        );
        Ok(scaler)
    }

    /// Load the regression model in the configured format
    pub fn load_model<P: AsRef<Path>>(
        &self,
        path: P,
        format: ModelFormat,
    ) -> Result<Box<dyn Regressor>, ArtifactError> {
        let path = path.as_ref();
        info!(path = %path.display(), format = ?format, "Loading model");

        let model: Box<dyn Regressor> = match format {
            ModelFormat::Onnx => Box::new(self.load_onnx(path)?),
            ModelFormat::Linear => {
                let artifact: LinearArtifact = read_json(path)?;
                Box::new(LinearRegressor::from_artifact(artifact, path)?)
            }
        };

        info!(model = %model.name(), "Model loaded successfully");
        Ok(model)
    }

    /// Load an ONNX regression graph
    pub fn load_onnx<P: AsRef<Path>>(&self, path: P) -> Result<OnnxRegressor, ArtifactError> {
        let path = path.as_ref();
        ensure_exists(path)?;

        info!(path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()
            .map_err(corrupt(path))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(corrupt(path))?
            .with_intra_threads(self.onnx_threads)
            .map_err(corrupt(path))?
            .commit_from_file(path)
            .map_err(corrupt(path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| ArtifactError::Incompatible {
                path: path.to_path_buf(),
                reason: "model declares no inputs".to_string(),
            })?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ArtifactError::Incompatible {
                path: path.to_path_buf(),
                reason: "model declares no outputs".to_string(),
            })?;

        info!(
            input = %input_name,
            output = %output_name,
            "ONNX session ready"
        );

        Ok(OnnxRegressor::new(session, input_name, output_name))
    }
}

impl Default for ArtifactLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_exists(path: &Path) -> Result<(), ArtifactError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ArtifactError::Missing {
            path: path.to_path_buf(),
        })
    }
}

fn corrupt<E: std::fmt::Display>(path: &Path) -> impl Fn(E) -> ArtifactError + '_ {
    move |e| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ArtifactError::Missing {
            path: path.to_path_buf(),
        },
        _ => ArtifactError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    serde_json::from_slice(&bytes).map_err(|e| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SCALER: &str = r#"{
        "feature_names_in": [
            "Household estimate (kg/capita/year)",
            "Retail estimate (kg/capita/year)",
            "Food service estimate (kg/capita/year)"
        ],
        "mean": [50.0, 20.0, 10.0],
        "scale": [10.0, 5.0, 2.0]
    }"#;

    #[test]
    fn test_load_scaler() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        fs::write(&path, SCALER).unwrap();

        let scaler = ArtifactLoader::new().load_scaler(&path).unwrap();
        assert_eq!(scaler.mean(), &[50.0, 20.0, 10.0]);
    }

    #[test]
    fn test_missing_scaler() {
        let dir = tempfile::tempdir().unwrap();
        let result = ArtifactLoader::new().load_scaler(dir.path().join("scaler.json"));
        assert!(matches!(result, Err(ArtifactError::Missing { .. })));
    }

    #[test]
    fn test_corrupt_scaler() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        fs::write(&path, b"\x80\x04\x95 not json").unwrap();

        let result = ArtifactLoader::new().load_scaler(&path);
        assert!(matches!(result, Err(ArtifactError::Corrupt { .. })));
    }

    #[test]
    fn test_load_linear_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, r#"{"coefficients": [1.0, 2.0, 3.0], "intercept": 0.5}"#).unwrap();

        let model = ArtifactLoader::new()
            .load_model(&path, ModelFormat::Linear)
            .unwrap();
        assert_eq!(model.name(), "linear");
    }

    #[test]
    fn test_missing_onnx_model() {
        let dir = tempfile::tempdir().unwrap();
        let result = ArtifactLoader::with_threads(2)
            .load_model(dir.path().join("model.onnx"), ModelFormat::Onnx);
        assert!(matches!(result, Err(ArtifactError::Missing { .. })));
    }
}

//! Error types for artifact loading and request processing

use crate::service::PipelineStage;
use std::path::PathBuf;

/// Failures raised by the scaler or the model, at load time or call time.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact not found at {path}")]
    Missing { path: PathBuf },

    #[error("artifact at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("artifact at {path} is incompatible: {reason}")]
    Incompatible { path: PathBuf, reason: String },

    #[error("{artifact} expected {expected} features, got {actual}")]
    ShapeMismatch {
        artifact: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{artifact} runtime failure: {reason}")]
    Runtime {
        artifact: &'static str,
        reason: String,
    },

    #[error("{artifact} produced a non-finite value")]
    NonFiniteOutput { artifact: &'static str },
}

/// A request passed validation but the artifacts could not serve it.
#[derive(Debug, thiserror::Error)]
#[error("processing failed during {stage}: {source}")]
pub struct ProcessingError {
    pub stage: PipelineStage,
    #[source]
    pub source: ArtifactError,
}

impl ProcessingError {
    pub fn new(stage: PipelineStage, source: ArtifactError) -> Self {
        Self { stage, source }
    }
}

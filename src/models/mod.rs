//! Trained artifacts: the feature scaler and the regression model

pub mod inference;
pub mod linear;
pub mod loader;
pub mod scaler;
pub mod store;

pub use inference::OnnxRegressor;
pub use linear::LinearRegressor;
pub use loader::ArtifactLoader;
pub use scaler::StandardScaler;
pub use store::ArtifactStore;

use crate::error::ArtifactError;
use crate::feature_extractor::{FeatureVector, ScaledFeatureVector, FEATURE_SCHEMA};
use std::path::Path;

/// A fitted feature transformation. Implementations never mutate after load.
pub trait FeatureScaler: Send + Sync {
    fn transform(&self, features: &FeatureVector) -> Result<ScaledFeatureVector, ArtifactError>;
}

/// A fitted regression model. Implementations never mutate after load.
pub trait Regressor: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    fn predict(&self, features: &ScaledFeatureVector) -> Result<f64, ArtifactError>;
}

/// Fail unless `names` is exactly the fitted column list, in order.
pub(crate) fn check_feature_names(path: &Path, names: &[String]) -> Result<(), ArtifactError> {
    let expected = FEATURE_SCHEMA.map(|column| column.name);
    if names.len() == expected.len() && names.iter().zip(expected).all(|(a, b)| a == b) {
        Ok(())
    } else {
        Err(ArtifactError::Incompatible {
            path: path.to_path_buf(),
            reason: format!(
                "feature names {:?} do not match expected {:?}",
                names, expected
            ),
        })
    }
}

/// Arity guard shared by every artifact
pub(crate) fn check_arity(
    artifact: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ArtifactError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ArtifactError::ShapeMismatch {
            artifact,
            expected,
            actual,
        })
    }
}

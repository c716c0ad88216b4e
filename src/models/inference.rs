//! ONNX Runtime regression model

use crate::error::ArtifactError;
use crate::feature_extractor::ScaledFeatureVector;
use crate::models::Regressor;
use ort::session::Session;
use ort::value::Tensor;
use std::sync::Mutex;
use tracing::debug;

/// Regression graph executed through ONNX Runtime.
///
/// `Session::run` needs exclusive access, so the session sits behind a mutex.
/// The graph itself is never modified after load.
pub struct OnnxRegressor {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxRegressor {
    pub fn new(session: Session, input_name: String, output_name: String) -> Self {
        Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        }
    }
}

impl Regressor for OnnxRegressor {
    fn name(&self) -> &str {
        "onnx"
    }

    fn predict(&self, features: &ScaledFeatureVector) -> Result<f64, ArtifactError> {
        let input_tensor = Tensor::from_array(input_parts(features)).map_err(runtime_error)?;

        let mut session = self.session.lock().map_err(|e| ArtifactError::Runtime {
            artifact: "model",
            reason: format!("session lock poisoned: {}", e),
        })?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(runtime_error)?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ArtifactError::Runtime {
                artifact: "model",
                reason: format!("missing output {}", self.output_name),
            })?;

        let (_, data) = output.try_extract_tensor::<f32>().map_err(runtime_error)?;
        let prediction = first_value(data)?;

        debug!(output = %self.output_name, prediction = prediction, "ONNX inference complete");
        Ok(prediction)
    }
}

fn runtime_error<E: std::fmt::Display>(e: E) -> ArtifactError {
    ArtifactError::Runtime {
        artifact: "model",
        reason: e.to_string(),
    }
}

/// Input tensor - shape [1, num_features], single precision
fn input_parts(features: &ScaledFeatureVector) -> (Vec<i64>, Vec<f32>) {
    (vec![1, features.len() as i64], features.to_f32())
}

/// Regressors emit `[batch, 1]`; with a batch of one the prediction is the
/// first element.
fn first_value(data: &[f32]) -> Result<f64, ArtifactError> {
    let value = data.first().copied().ok_or_else(|| ArtifactError::Runtime {
        artifact: "model",
        reason: "empty output tensor".to_string(),
    })?;

    if value.is_finite() {
        Ok(f64::from(value))
    } else {
        Err(ArtifactError::NonFiniteOutput { artifact: "model" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_is_one_row_of_features() {
        let scaled = ScaledFeatureVector::new(vec![-0.5, 0.25, 1.5]);
        let (shape, data) = input_parts(&scaled);
        assert_eq!(shape, vec![1, 3]);
        assert_eq!(data, vec![-0.5_f32, 0.25, 1.5]);
    }

    #[test]
    fn test_first_value() {
        assert_eq!(first_value(&[42.5, 1.0]).unwrap(), 42.5);
    }

    #[test]
    fn test_empty_output_is_an_error() {
        assert!(matches!(
            first_value(&[]),
            Err(ArtifactError::Runtime { .. })
        ));
    }

    #[test]
    fn test_non_finite_output_is_an_error() {
        assert!(matches!(
            first_value(&[f32::NAN]),
            Err(ArtifactError::NonFiniteOutput { .. })
        ));
    }
}

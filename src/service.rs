//! Prediction service: validate, scale, predict, round, respond.

use crate::error::ProcessingError;
use crate::feature_extractor::{FeatureExtractor, FeatureVector};
use crate::metrics::ServiceMetrics;
use crate::models::ArtifactStore;
use crate::rounding::round_prediction;
use crate::types::request::PredictionRequest;
use crate::types::response::{
    PredictionResponse, ProcessingFailureBody, Reply, ReplyStatus, ValidationErrorReport,
};
use crate::validation;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info_span};

/// Where a request is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Validating,
    Valid,
    Invalid,
    Scaling,
    Predicting,
    Responded,
    ErrorResponded,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Validating => "validating",
            PipelineStage::Valid => "valid",
            PipelineStage::Invalid => "invalid",
            PipelineStage::Scaling => "scaling",
            PipelineStage::Predicting => "predicting",
            PipelineStage::Responded => "responded",
            PipelineStage::ErrorResponded => "error_responded",
        };
        f.write_str(name)
    }
}

/// Terminal result of one request
#[derive(Debug)]
pub enum Outcome {
    /// Prediction served
    Responded(PredictionResponse),
    /// Input rejected; the artifacts were not touched
    ErrorResponded(ValidationErrorReport),
    /// Input was valid but the artifacts failed
    Failed(ProcessingError),
}

impl Outcome {
    pub fn status(&self) -> ReplyStatus {
        match self {
            Outcome::Responded(_) => ReplyStatus::Ok,
            Outcome::ErrorResponded(_) => ReplyStatus::Unprocessable,
            Outcome::Failed(_) => ReplyStatus::Internal,
        }
    }

    /// Serialize for the caller. Processing errors carry no internal detail.
    pub fn into_reply(self) -> Reply {
        let status = self.status();
        match self {
            Outcome::Responded(response) => Reply::new(status, &response),
            Outcome::ErrorResponded(report) => Reply::new(status, &report),
            Outcome::Failed(_) => Reply::new(status, &ProcessingFailureBody::default()),
        }
    }
}

/// Runs the request pipeline against a shared, read-only artifact store.
pub struct PredictionService {
    store: Arc<ArtifactStore>,
    extractor: FeatureExtractor,
    metrics: Arc<ServiceMetrics>,
}

impl PredictionService {
    pub fn new(store: Arc<ArtifactStore>, metrics: Arc<ServiceMetrics>) -> Self {
        Self {
            store,
            extractor: FeatureExtractor::new(),
            metrics,
        }
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    /// Handle one raw request body and produce the reply to send back
    pub fn handle_payload(&self, payload: &[u8]) -> Reply {
        self.process(|| validation::validate_payload(payload)).into_reply()
    }

    /// Validate an in-process request value and run the pipeline
    pub fn submit(&self, input: &serde_json::Value) -> Outcome {
        self.process(|| validation::parse_request(input))
    }

    /// Shared lifecycle of every request, whichever way it was received
    fn process<V>(&self, validate: V) -> Outcome
    where
        V: FnOnce() -> Result<PredictionRequest, ValidationErrorReport>,
    {
        let span = info_span!("prediction", request_id = %uuid::Uuid::new_v4());
        let _enter = span.enter();

        let start = Instant::now();
        self.metrics.record_request();
        debug!(stage = %PipelineStage::Received);

        debug!(stage = %PipelineStage::Validating);
        let outcome = match validate() {
            Ok(request) => self.run_valid(&request),
            Err(report) => self.reject(report),
        };

        self.record_outcome(&outcome, start);
        outcome
    }

    /// Scale and predict an already-validated request
    pub fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, ProcessingError> {
        let features = self.extractor.extract(request);
        self.predict_features(&features)
    }

    fn run_valid(&self, request: &PredictionRequest) -> Outcome {
        debug!(stage = %PipelineStage::Valid);
        match self.predict(request) {
            Ok(response) => {
                debug!(stage = %PipelineStage::Responded, prediction = response.prediction);
                Outcome::Responded(response)
            }
            Err(e) => {
                error!(stage = %e.stage, error = %e, "Prediction processing failed");
                Outcome::Failed(e)
            }
        }
    }

    fn reject(&self, report: ValidationErrorReport) -> Outcome {
        debug!(
            stage = %PipelineStage::Invalid,
            errors = report.len(),
            "Request failed validation"
        );
        debug!(stage = %PipelineStage::ErrorResponded);
        Outcome::ErrorResponded(report)
    }

    fn predict_features(
        &self,
        features: &FeatureVector,
    ) -> Result<PredictionResponse, ProcessingError> {
        debug!(features = ?features.named().collect::<Vec<_>>(), "Input features");

        debug!(stage = %PipelineStage::Scaling);
        let scaled = self
            .store
            .transform(features)
            .map_err(|e| ProcessingError::new(PipelineStage::Scaling, e))?;

        debug!(stage = %PipelineStage::Predicting, scaled = ?scaled.values());
        let raw = self
            .store
            .predict(&scaled)
            .map_err(|e| ProcessingError::new(PipelineStage::Predicting, e))?;

        Ok(PredictionResponse {
            prediction: round_prediction(raw),
        })
    }

    fn record_outcome(&self, outcome: &Outcome, start: Instant) {
        let elapsed = start.elapsed();
        match outcome {
            Outcome::Responded(response) => {
                self.metrics.record_prediction(elapsed, response.prediction)
            }
            Outcome::ErrorResponded(report) => {
                self.metrics.record_validation_failure(report.len())
            }
            Outcome::Failed(e) => self.metrics.record_processing_failure(e.stage),
        }
    }
}

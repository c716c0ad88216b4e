//! Food Waste Prediction Service Library
//!
//! Validates per-capita food waste estimates, scales them with a fitted
//! scaler and predicts with a fitted regression model loaded at startup.

pub mod config;
pub mod consumer;
pub mod dispatch;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod producer;
pub mod rounding;
pub mod service;
pub mod types;
pub mod validation;

pub use config::AppConfig;
pub use consumer::RequestConsumer;
pub use dispatch::WorkerPool;
pub use error::{ArtifactError, ProcessingError};
pub use feature_extractor::{FeatureExtractor, FeatureVector, ScaledFeatureVector, FEATURE_SCHEMA};
pub use models::ArtifactStore;
pub use producer::ReplyPublisher;
pub use service::{Outcome, PipelineStage, PredictionService};
pub use types::{PredictionRequest, PredictionResponse, ValidationErrorReport};

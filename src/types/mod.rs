//! Type definitions for the prediction service

pub mod request;
pub mod response;

pub use request::{PredictionRequest, RequestField};
pub use response::{
    Constraint, ErrorEntry, PredictionResponse, ProcessingFailureBody, Reply, ReplyStatus,
    ValidationErrorReport,
};

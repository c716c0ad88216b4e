//! Response bodies and reply envelopes

use crate::types::request::RequestField;
use serde::{Deserialize, Serialize};

/// Successful prediction body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Model output rounded to 2 decimal places
    pub prediction: f64,
}

/// Bound metadata attached to an out-of-range entry.
///
/// Serializes as `{"ge": 0.0}` or `{"le": 100.0}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Constraint {
    /// Value must be greater than or equal to the bound
    Ge(f64),
    /// Value must be less than or equal to the bound
    Le(f64),
}

/// One rejected field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Human-readable message
    pub msg: String,
    /// Location path, e.g. `["body", "household_estimate"]`
    pub loc: Vec<String>,
    /// The value as submitted (`null` when absent)
    pub input_value: serde_json::Value,
    /// Violated bound, if the failure was a range check
    pub constraint: Option<Constraint>,
}

impl ErrorEntry {
    fn for_field(field: RequestField, msg: String, input_value: serde_json::Value) -> Self {
        Self {
            msg,
            loc: vec!["body".to_string(), field.name().to_string()],
            input_value,
            constraint: None,
        }
    }

    pub fn missing(field: RequestField) -> Self {
        Self::for_field(field, "Field required".to_string(), serde_json::Value::Null)
    }

    pub fn not_a_number(field: RequestField, input_value: serde_json::Value) -> Self {
        Self::for_field(
            field,
            "Input should be a valid number".to_string(),
            input_value,
        )
    }

    pub fn not_finite(field: RequestField, input_value: serde_json::Value) -> Self {
        Self::for_field(
            field,
            "Input should be a finite number".to_string(),
            input_value,
        )
    }

    pub fn out_of_range(
        field: RequestField,
        input_value: serde_json::Value,
        constraint: Constraint,
    ) -> Self {
        let msg = format!(
            "Input for {} is out of range. Please provide a value between the specified limits.",
            field
        );
        Self {
            constraint: Some(constraint),
            ..Self::for_field(field, msg, input_value)
        }
    }

    /// Entry for a payload that cannot be read as a request object at all
    pub fn body(msg: impl Into<String>, input_value: serde_json::Value) -> Self {
        Self {
            msg: msg.into(),
            loc: vec!["body".to_string()],
            input_value,
            constraint: None,
        }
    }

    /// Name of the offending field, `None` for body-level entries
    pub fn field(&self) -> Option<&str> {
        match self.loc.as_slice() {
            [_, field] => Some(field.as_str()),
            _ => None,
        }
    }
}

/// All field-level failures of one request, in field order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorReport {
    detail: Vec<ErrorEntry>,
}

impl ValidationErrorReport {
    pub fn single(entry: ErrorEntry) -> Self {
        Self {
            detail: vec![entry],
        }
    }

    pub fn push(&mut self, entry: ErrorEntry) {
        self.detail.push(entry);
    }

    pub fn entries(&self) -> &[ErrorEntry] {
        &self.detail
    }

    pub fn len(&self) -> usize {
        self.detail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detail.is_empty()
    }
}

/// Body returned when a valid request could not be processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingFailureBody {
    pub detail: String,
}

impl Default for ProcessingFailureBody {
    fn default() -> Self {
        Self {
            detail: "Internal Server Error".to_string(),
        }
    }
}

/// Outcome class carried alongside every reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    /// Prediction served
    Ok,
    /// The caller's input was malformed
    Unprocessable,
    /// The server failed to process a valid request
    Internal,
}

impl ReplyStatus {
    /// HTTP-style status code
    pub fn code(&self) -> u16 {
        match self {
            ReplyStatus::Ok => 200,
            ReplyStatus::Unprocessable => 422,
            ReplyStatus::Internal => 500,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            200 => Some(ReplyStatus::Ok),
            422 => Some(ReplyStatus::Unprocessable),
            500 => Some(ReplyStatus::Internal),
            _ => None,
        }
    }
}

/// Serialized reply ready for the transport
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: ReplyStatus,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn new<T: Serialize>(status: ReplyStatus, body: &T) -> Self {
        match serde_json::to_vec(body) {
            Ok(body) => Self { status, body },
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize reply body");
                Self::internal()
            }
        }
    }

    pub fn internal() -> Self {
        Self {
            status: ReplyStatus::Internal,
            body: br#"{"detail":"Internal Server Error"}"#.to_vec(),
        }
    }
}

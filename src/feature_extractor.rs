//! Feature extraction for food waste model inference.
//!
//! The scaler and model were fitted on a frame with three named columns. This
//! module owns the one place that maps request fields onto those columns.

use crate::types::request::{PredictionRequest, RequestField};
use std::fmt;

/// Number of features the scaler and model were fitted with
pub const FEATURE_COUNT: usize = 3;

/// One fitted column: its training-time name and where its value comes from
#[derive(Clone, Copy)]
pub struct FeatureColumn {
    /// Column name as seen by the scaler at fit time
    pub name: &'static str,
    /// Request field feeding this column
    pub field: RequestField,
    accessor: fn(&PredictionRequest) -> f64,
}

impl fmt::Debug for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureColumn")
            .field("name", &self.name)
            .field("field", &self.field)
            .finish()
    }
}

impl FeatureColumn {
    pub fn value(&self, request: &PredictionRequest) -> f64 {
        (self.accessor)(request)
    }
}

/// Column order of the fitted artifacts. Position `i` here is column `i` of
/// the scaler input.
pub const FEATURE_SCHEMA: [FeatureColumn; FEATURE_COUNT] = [
    FeatureColumn {
        name: "Household estimate (kg/capita/year)",
        field: RequestField::HouseholdEstimate,
        accessor: PredictionRequest::household_estimate,
    },
    FeatureColumn {
        name: "Retail estimate (kg/capita/year)",
        field: RequestField::RetailEstimate,
        accessor: PredictionRequest::retail_estimate,
    },
    FeatureColumn {
        name: "Food service estimate (kg/capita/year)",
        field: RequestField::FoodServiceEstimate,
        accessor: PredictionRequest::food_service_estimate,
    },
];

/// Raw feature values in [`FEATURE_SCHEMA`] order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(column name, value)` pairs, for diagnostics
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_SCHEMA
            .map(|column| column.name)
            .into_iter()
            .zip(self.values.iter().copied())
    }
}

/// Scaler output; arity is whatever the scaler produced
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledFeatureVector {
    values: Vec<f64>,
}

impl ScaledFeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Single-precision copy for ONNX input tensors
    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }
}

/// Feature extractor that transforms requests into scaler input.
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract features from a validated request in fitted column order.
    pub fn extract(&self, request: &PredictionRequest) -> FeatureVector {
        FeatureVector {
            values: FEATURE_SCHEMA.map(|column| column.value(request)),
        }
    }

    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn feature_names(&self) -> Vec<&'static str> {
        FEATURE_SCHEMA.iter().map(|column| column.name).collect()
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_order_is_fixed() {
        let extractor = FeatureExtractor::new();
        assert_eq!(
            extractor.feature_names(),
            vec![
                "Household estimate (kg/capita/year)",
                "Retail estimate (kg/capita/year)",
                "Food service estimate (kg/capita/year)",
            ]
        );
        assert_eq!(
            FEATURE_SCHEMA.map(|c| c.field),
            RequestField::ALL,
            "schema columns must follow request field order"
        );
    }

    #[test]
    fn test_feature_extraction() {
        let extractor = FeatureExtractor::new();
        let request = PredictionRequest::new(45.5, 20.3, 15.2).unwrap();

        let features = extractor.extract(&request);

        assert_eq!(features.values().len(), extractor.feature_count());
        assert_eq!(features.values(), &[45.5, 20.3, 15.2]);
    }

    #[test]
    fn test_accessors_match_declared_fields() {
        let request = PredictionRequest::new(1.0, 2.0, 3.0).unwrap();
        for column in FEATURE_SCHEMA {
            assert_eq!(column.value(&request), request.get(column.field));
        }
    }

    #[test]
    fn test_named_pairs() {
        let request = PredictionRequest::new(10.0, 0.0, 100.0).unwrap();
        let named: Vec<_> = FeatureExtractor::new().extract(&request).named().collect();
        assert_eq!(named[0], ("Household estimate (kg/capita/year)", 10.0));
        assert_eq!(named[2], ("Food service estimate (kg/capita/year)", 100.0));
    }
}

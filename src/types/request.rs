//! Prediction request data structures

use crate::types::response::ValidationErrorReport;
use crate::validation;
use serde::Serialize;
use std::fmt;

/// The three inputs a prediction request carries, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestField {
    HouseholdEstimate,
    RetailEstimate,
    FoodServiceEstimate,
}

impl RequestField {
    pub const ALL: [RequestField; 3] = [
        RequestField::HouseholdEstimate,
        RequestField::RetailEstimate,
        RequestField::FoodServiceEstimate,
    ];

    /// JSON field name on the wire
    pub fn name(&self) -> &'static str {
        match self {
            RequestField::HouseholdEstimate => "household_estimate",
            RequestField::RetailEstimate => "retail_estimate",
            RequestField::FoodServiceEstimate => "food_service_estimate",
        }
    }
}

impl fmt::Display for RequestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated prediction request.
///
/// Every estimate is a finite value in kg/capita/year within
/// [`validation::LOWER_BOUND`, `validation::UPPER_BOUND`]. The only ways to
/// obtain one are [`PredictionRequest::new`] and [`validation::parse_request`],
/// both of which enforce the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionRequest {
    household_estimate: f64,
    retail_estimate: f64,
    food_service_estimate: f64,
}

impl PredictionRequest {
    /// Build a request from raw values, reporting every out-of-bounds field
    pub fn new(
        household_estimate: f64,
        retail_estimate: f64,
        food_service_estimate: f64,
    ) -> Result<Self, ValidationErrorReport> {
        let raw = [household_estimate, retail_estimate, food_service_estimate];
        let mut values = [0.0; 3];
        let mut report = ValidationErrorReport::default();

        for ((slot, field), value) in values.iter_mut().zip(RequestField::ALL).zip(raw) {
            match validation::check_value(field, value, serde_json::Value::from(value)) {
                Ok(v) => *slot = v,
                Err(entry) => report.push(entry),
            }
        }

        if report.is_empty() {
            Ok(Self::from_validated(values))
        } else {
            Err(report)
        }
    }

    /// Values must already have passed `validation::check_value`
    pub(crate) fn from_validated(values: [f64; 3]) -> Self {
        let [household_estimate, retail_estimate, food_service_estimate] = values;
        Self {
            household_estimate,
            retail_estimate,
            food_service_estimate,
        }
    }

    pub fn household_estimate(&self) -> f64 {
        self.household_estimate
    }

    pub fn retail_estimate(&self) -> f64 {
        self.retail_estimate
    }

    pub fn food_service_estimate(&self) -> f64 {
        self.food_service_estimate
    }

    pub fn get(&self, field: RequestField) -> f64 {
        match field {
            RequestField::HouseholdEstimate => self.household_estimate,
            RequestField::RetailEstimate => self.retail_estimate,
            RequestField::FoodServiceEstimate => self.food_service_estimate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_bounds() {
        let request = PredictionRequest::new(0.0, 100.0, 50.0).unwrap();
        assert_eq!(request.household_estimate(), 0.0);
        assert_eq!(request.retail_estimate(), 100.0);
        assert_eq!(request.get(RequestField::FoodServiceEstimate), 50.0);
    }

    #[test]
    fn test_new_reports_every_bad_field() {
        let report = PredictionRequest::new(-1.0, 101.0, f64::NAN).unwrap_err();
        let fields: Vec<_> = report.entries().iter().filter_map(|e| e.field()).collect();
        assert_eq!(
            fields,
            vec!["household_estimate", "retail_estimate", "food_service_estimate"]
        );
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let request = PredictionRequest::new(45.5, 20.3, 15.2).unwrap();
        let json = serde_json::to_value(request).unwrap();
        assert_eq!(json["household_estimate"], 45.5);
        assert_eq!(json["retail_estimate"], 20.3);
        assert_eq!(json["food_service_estimate"], 15.2);
    }
}

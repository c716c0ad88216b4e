//! Request validation.
//!
//! Every field is checked and every failure is collected, so one reply tells
//! the caller everything that needs fixing.

use crate::feature_extractor::{FeatureExtractor, FeatureVector};
use crate::types::request::{PredictionRequest, RequestField};
use crate::types::response::{Constraint, ErrorEntry, ValidationErrorReport};
use serde_json::Value;

/// Inclusive lower bound for every estimate
pub const LOWER_BOUND: f64 = 0.0;

/// Inclusive upper bound for every estimate
pub const UPPER_BOUND: f64 = 100.0;

/// Validate a decoded request body and map it onto the fitted feature order.
pub fn validate(input: &Value) -> Result<FeatureVector, ValidationErrorReport> {
    let request = parse_request(input)?;
    Ok(FeatureExtractor::new().extract(&request))
}

/// Validate raw payload bytes. Undecodable JSON is a client error too.
pub fn validate_payload(payload: &[u8]) -> Result<PredictionRequest, ValidationErrorReport> {
    let input: Value = serde_json::from_slice(payload).map_err(|e| {
        ValidationErrorReport::single(ErrorEntry::body(
            format!("JSON decode error: {}", e),
            Value::String(String::from_utf8_lossy(payload).into_owned()),
        ))
    })?;
    parse_request(&input)
}

/// Check presence, type and bounds of all three fields.
///
/// Fields not named by the request schema are ignored.
pub fn parse_request(input: &Value) -> Result<PredictionRequest, ValidationErrorReport> {
    let Some(object) = input.as_object() else {
        return Err(ValidationErrorReport::single(ErrorEntry::body(
            "Input should be a valid dictionary or object to extract fields from",
            input.clone(),
        )));
    };

    let mut values = [0.0; 3];
    let mut report = ValidationErrorReport::default();

    for (slot, field) in values.iter_mut().zip(RequestField::ALL) {
        match check_field(field, object.get(field.name())) {
            Ok(value) => *slot = value,
            Err(entry) => report.push(entry),
        }
    }

    if report.is_empty() {
        Ok(PredictionRequest::from_validated(values))
    } else {
        Err(report)
    }
}

fn check_field(field: RequestField, raw: Option<&Value>) -> Result<f64, ErrorEntry> {
    let raw = raw.ok_or_else(|| ErrorEntry::missing(field))?;
    let value = number_value(raw).ok_or_else(|| ErrorEntry::not_a_number(field, raw.clone()))?;
    check_value(field, value, raw.clone())
}

/// Numbers keep their source text, so a literal beyond `f64` range decodes
/// and is reported against its own field as infinite.
fn number_value(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(number) => number
            .as_f64()
            .or_else(|| number.to_string().parse::<f64>().ok()),
        _ => None,
    }
}

/// Range check shared by wire and in-process construction.
/// `input` is echoed back in the entry on failure.
pub(crate) fn check_value(
    field: RequestField,
    value: f64,
    input: Value,
) -> Result<f64, ErrorEntry> {
    if !value.is_finite() {
        Err(ErrorEntry::not_finite(field, input))
    } else if value < LOWER_BOUND {
        Err(ErrorEntry::out_of_range(
            field,
            input,
            Constraint::Ge(LOWER_BOUND),
        ))
    } else if value > UPPER_BOUND {
        Err(ErrorEntry::out_of_range(
            field,
            input,
            Constraint::Le(UPPER_BOUND),
        ))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(h: Value, r: Value, f: Value) -> Value {
        json!({
            "household_estimate": h,
            "retail_estimate": r,
            "food_service_estimate": f,
        })
    }

    fn fields(report: &ValidationErrorReport) -> Vec<&str> {
        report.entries().iter().filter_map(|e| e.field()).collect()
    }

    #[test]
    fn test_valid_request_maps_to_features() {
        let features = validate(&body(json!(45.5), json!(20.3), json!(15.2))).unwrap();
        assert_eq!(features.values(), &[45.5, 20.3, 15.2]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        for (low, high) in [(LOWER_BOUND, UPPER_BOUND), (UPPER_BOUND, LOWER_BOUND)] {
            let input = body(json!(low), json!(high), json!(low));
            assert!(validate(&input).is_ok(), "rejected {low}/{high}");
        }
        assert!(validate(&body(json!(0), json!(100), json!(0))).is_ok());
    }

    #[test]
    fn test_values_just_outside_bounds_are_rejected() {
        let below = LOWER_BOUND - 1e-9;
        let above = UPPER_BOUND + 1e-9;

        for field in RequestField::ALL {
            for value in [below, above] {
                let mut input = body(json!(50.0), json!(50.0), json!(50.0));
                input[field.name()] = json!(value);

                let report = validate(&input).unwrap_err();
                assert_eq!(fields(&report), vec![field.name()]);
            }
        }
    }

    #[test]
    fn test_constraint_metadata() {
        let report = validate(&body(json!(-0.5), json!(100.5), json!(10))).unwrap_err();
        let entries = report.entries();
        assert_eq!(entries[0].constraint, Some(Constraint::Ge(0.0)));
        assert_eq!(entries[0].input_value, json!(-0.5));
        assert_eq!(entries[1].constraint, Some(Constraint::Le(100.0)));
        assert_eq!(entries[1].input_value, json!(100.5));
    }

    #[test]
    fn test_only_violating_fields_are_reported() {
        let report = validate(&body(json!(150), json!(20.3), json!(15.2))).unwrap_err();
        assert_eq!(report.len(), 1);
        assert_eq!(fields(&report), vec!["household_estimate"]);
    }

    #[test]
    fn test_all_fields_reported_together() {
        let report = validate(&body(json!(-1), json!(-2), json!(-3))).unwrap_err();
        assert_eq!(
            fields(&report),
            vec!["household_estimate", "retail_estimate", "food_service_estimate"]
        );
    }

    #[test]
    fn test_missing_and_mistyped_fields() {
        let input = json!({
            "household_estimate": "lots",
            "food_service_estimate": null,
        });

        let report = validate(&input).unwrap_err();
        let entries = report.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].msg, "Input should be a valid number");
        assert_eq!(entries[0].input_value, json!("lots"));
        assert_eq!(entries[1].msg, "Field required");
        assert_eq!(entries[1].field(), Some("retail_estimate"));
        assert_eq!(entries[2].msg, "Input should be a valid number");
        assert!(entries.iter().all(|e| e.constraint.is_none()));
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let mut input = body(json!(1), json!(2), json!(3));
        input["country"] = json!("NL");
        assert!(validate(&input).is_ok());
    }

    #[test]
    fn test_non_object_body() {
        let report = validate(&json!([45.5, 20.3, 15.2])).unwrap_err();
        assert_eq!(report.len(), 1);
        assert_eq!(report.entries()[0].loc, vec!["body".to_string()]);
    }

    #[test]
    fn test_undecodable_payload() {
        let report = validate_payload(b"{\"household_estimate\": ").unwrap_err();
        assert_eq!(report.len(), 1);
        assert!(report.entries()[0].msg.starts_with("JSON decode error"));
    }

    #[test]
    fn test_overflowing_number_is_reported_per_field() {
        let report = validate_payload(
            br#"{"household_estimate": 1e400, "retail_estimate": -1, "food_service_estimate": 500}"#,
        )
        .unwrap_err();

        assert_eq!(
            fields(&report),
            vec!["household_estimate", "retail_estimate", "food_service_estimate"]
        );
        let entries = report.entries();
        assert_eq!(entries[0].msg, "Input should be a finite number");
        assert_eq!(entries[1].constraint, Some(Constraint::Ge(0.0)));
        assert_eq!(entries[2].constraint, Some(Constraint::Le(100.0)));
    }

    #[test]
    fn test_non_finite_values() {
        let err =
            check_value(RequestField::RetailEstimate, f64::INFINITY, Value::Null).unwrap_err();
        assert_eq!(err.msg, "Input should be a finite number");
        assert!(check_value(RequestField::RetailEstimate, f64::NAN, Value::Null).is_err());
    }
}

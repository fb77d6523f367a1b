//! Tests for filter wire shapes

use crate::Error;
use crate::app::services::filter::{Filter, FilterCondition, FilterRequest, FilterValue};

#[test]
fn test_request_deserializes_mixed_values() {
    let json = r#"{
        "filters": [
            {"field": "name", "condition": "contains", "value": "PMC"},
            {"field": "hasTracks", "condition": "equals", "value": true}
        ]
    }"#;

    let request: FilterRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.filters.len(), 2);
    assert_eq!(request.filters[0].condition, FilterCondition::Contains);
    assert_eq!(request.filters[0].value, FilterValue::Text("PMC".to_string()));
    assert_eq!(request.filters[1].value, FilterValue::Bool(true));
}

#[test]
fn test_missing_filters_key_means_no_filters() {
    let request: FilterRequest = serde_json::from_str("{}").unwrap();
    assert!(request.is_empty());
}

#[test]
fn test_unknown_condition_rejected_on_wire() {
    let json = r#"{"filters": [{"field": "name", "condition": "startsWith", "value": "P"}]}"#;
    assert!(serde_json::from_str::<FilterRequest>(json).is_err());
}

#[test]
fn test_cli_filter_keeps_colons_in_value() {
    let filter: Filter = "value:equals:2023-01-01 09:00:00".parse().unwrap();
    assert_eq!(filter.field, "value");
    assert_eq!(filter.condition, FilterCondition::Equals);
    assert_eq!(filter.value, FilterValue::Text("2023-01-01 09:00:00".to_string()));
}

#[test]
fn test_cli_filter_requires_three_parts() {
    let err = "name:contains".parse::<Filter>().unwrap_err();
    assert!(matches!(err, Error::Validation { ref field, .. } if field == "filter"));

    let err = "name:like:x".parse::<Filter>().unwrap_err();
    assert!(matches!(err, Error::Validation { ref field, .. } if field == "condition"));
}

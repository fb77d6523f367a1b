//! Filter to predicate translation
//!
//! Every filter is checked against the entity whitelist before anything is
//! built, so an invalid request never produces a partial predicate.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::request::{Filter, FilterCondition, FilterValue};
use super::schema::{EntitySchema, FieldKind, Filterable};
use crate::app::models::ParamType;
use crate::{Error, Result};

/// Conditions applied to one field; all present conditions must hold
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldCondition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equals: Option<FilterValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<FilterValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
}

impl FieldCondition {
    fn matches(&self, actual: &FilterValue) -> bool {
        if let Some(expected) = &self.equals {
            if actual != expected {
                return false;
            }
        }
        if let Some(excluded) = &self.not {
            if actual == excluded {
                return false;
            }
        }
        if let Some(needle) = &self.contains {
            match actual.as_text() {
                Some(text) if text.contains(needle.as_str()) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Backend-neutral predicate: field name to condition record, AND-combined
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Predicate {
    conditions: BTreeMap<String, FieldCondition>,
}

impl Predicate {
    /// The predicate matching every entity
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn is_match_all(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&FieldCondition> {
        self.conditions.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.conditions.keys().map(String::as_str)
    }

    /// Evaluate against an entity; unknown fields never match
    pub fn matches<T: Filterable>(&self, entity: &T) -> bool {
        self.conditions
            .iter()
            .all(|(field, condition)| match entity.field_value(field) {
                Some(actual) => condition.matches(&actual),
                None => false,
            })
    }
}

/// Translate filters into a predicate over the fields permitted by `schema`
pub fn translate(filters: &[Filter], schema: &EntitySchema) -> Result<Predicate> {
    let mut conditions: BTreeMap<String, FieldCondition> = BTreeMap::new();

    for filter in filters {
        let spec = schema.field(&filter.field).ok_or_else(|| {
            Error::validation(
                filter.field.clone(),
                format!(
                    "Field is not filterable on {}. Permitted fields: {}",
                    schema.entity,
                    schema.field_names().join(", ")
                ),
            )
        })?;

        if filter.condition == FilterCondition::Contains && spec.kind != FieldKind::Text {
            return Err(Error::validation(
                filter.field.clone(),
                "Condition 'contains' is only valid for string fields",
            ));
        }

        let value = coerce_value(&filter.field, spec.kind, &filter.value)?;
        let record = conditions.entry(filter.field.clone()).or_default();

        let slot_taken = match (filter.condition, value) {
            (FilterCondition::Equals, value) => record.equals.replace(value).is_some(),
            (FilterCondition::Not, value) => record.not.replace(value).is_some(),
            (FilterCondition::Contains, FilterValue::Text(needle)) => {
                record.contains.replace(needle).is_some()
            }
            (FilterCondition::Contains, FilterValue::Bool(_)) => {
                return Err(Error::validation(
                    filter.field.clone(),
                    "Condition 'contains' requires a string value",
                ));
            }
        };

        if slot_taken {
            return Err(Error::validation(
                filter.field.clone(),
                format!("Condition '{}' given more than once", filter.condition),
            ));
        }
    }

    debug!(
        "Translated {} filters into predicate on {} fields",
        filters.len(),
        conditions.len()
    );

    Ok(Predicate { conditions })
}

/// Check a wire value against the field type, normalising it where needed
fn coerce_value(field: &str, kind: FieldKind, value: &FilterValue) -> Result<FilterValue> {
    match (kind, value) {
        (FieldKind::Text, FilterValue::Text(_)) => Ok(value.clone()),
        (FieldKind::Text, FilterValue::Bool(_)) => {
            Err(Error::validation(field, "Expected a string value"))
        }
        (FieldKind::Bool, FilterValue::Bool(_)) => Ok(value.clone()),
        (FieldKind::Bool, FilterValue::Text(text)) => {
            match text.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(FilterValue::Bool(true)),
                "false" => Ok(FilterValue::Bool(false)),
                _ => Err(Error::validation(
                    field,
                    format!("Expected true or false, got '{}'", text),
                )),
            }
        }
        (FieldKind::ParamType, FilterValue::Text(text)) => {
            let kind: ParamType = text
                .parse()
                .map_err(|_| Error::validation(field, format!("Unknown parameter type '{}'", text)))?;
            Ok(FilterValue::Text(kind.as_str().to_string()))
        }
        (FieldKind::ParamType, FilterValue::Bool(_)) => {
            Err(Error::validation(field, "Expected a parameter type name"))
        }
    }
}

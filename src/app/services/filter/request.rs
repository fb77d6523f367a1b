//! Wire shapes for filter requests
//!
//! `{ "filters": [{ "field": "name", "condition": "contains", "value": "PMC" }] }`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Comparison requested for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterCondition {
    Equals,
    Not,
    Contains,
}

impl FilterCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterCondition::Equals => "equals",
            FilterCondition::Not => "not",
            FilterCondition::Contains => "contains",
        }
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterCondition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equals" => Ok(FilterCondition::Equals),
            "not" => Ok(FilterCondition::Not),
            "contains" => Ok(FilterCondition::Contains),
            other => Err(Error::validation(
                "condition",
                format!(
                    "Unknown condition '{}'. Expected one of: equals, not, contains",
                    other
                ),
            )),
        }
    }
}

/// Filter operand as it arrives on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Text(String),
}

impl FilterValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(text) => Some(text),
            FilterValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Bool(value) => write!(f, "{}", value),
            FilterValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

/// One `(field, condition, value)` triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub condition: FilterCondition,
    pub value: FilterValue,
}

impl Filter {
    pub fn new(
        field: impl Into<String>,
        condition: FilterCondition,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            field: field.into(),
            condition,
            value: value.into(),
        }
    }
}

/// Parses the CLI form `field:condition:value`; the value may itself contain colons
impl FromStr for Filter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        let (Some(field), Some(condition), Some(value)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::validation(
                "filter",
                format!("Expected field:condition:value, got '{}'", s),
            ));
        };

        let field = field.trim();
        if field.is_empty() {
            return Err(Error::validation("filter", "Filter field cannot be empty"));
        }

        Ok(Filter {
            field: field.to_string(),
            condition: condition.parse()?,
            value: FilterValue::Text(value.to_string()),
        })
    }
}

/// Request body carrying filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub filters: Vec<Filter>,
}

impl FilterRequest {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

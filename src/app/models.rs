//! Domain entities for PMC records and their parameters
//!
//! A PMC is a named cyclone-like event. It owns zero or more parameters,
//! each a typed scalar or coordinate value kept as raw text.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Opaque identifier assigned by the storage backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Parent entity: a named PMC event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pmc {
    pub id: EntityId,
    pub name: String,
    /// Derived on read: whether any parameter references this PMC
    #[serde(default)]
    pub has_tracks: bool,
    pub created_at: DateTime<Utc>,
}

/// Closed set of parameter value encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Coords,
    Number,
    Date,
    String,
}

impl ParamType {
    pub const ALL: [ParamType; 4] = [
        ParamType::Coords,
        ParamType::Number,
        ParamType::Date,
        ParamType::String,
    ];

    /// Wire name of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Coords => "coords",
            ParamType::Number => "number",
            ParamType::Date => "date",
            ParamType::String => "string",
        }
    }

    /// Check that a non-empty raw value is structurally valid for this type
    pub fn check_value(&self, value: &str) -> std::result::Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }

        match self {
            ParamType::String => Ok(()),
            ParamType::Number => value
                .parse::<f64>()
                .map(|_| ())
                .map_err(|_| format!("'{}' is not a number", value)),
            ParamType::Coords => parse_coordinates(value)
                .map(|_| ())
                .ok_or_else(|| format!("'{}' is not a coordinate pair", value)),
            ParamType::Date => {
                if parse_date(value) {
                    Ok(())
                } else {
                    Err(format!("'{}' is not a recognised date", value))
                }
            }
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        ParamType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                Error::validation(
                    "type",
                    format!(
                        "Unknown parameter type '{}'. Expected one of: coords, number, date, string",
                        s
                    ),
                )
            })
    }
}

/// Parse "lat,lon" or "lat lon" into a pair of floats
pub fn parse_coordinates(value: &str) -> Option<(f64, f64)> {
    let mut parts = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty());

    let lat = parts.next()?.parse::<f64>().ok()?;
    let lon = parts.next()?.parse::<f64>().ok()?;

    if parts.next().is_some() {
        return None;
    }
    Some((lat, lon))
}

fn parse_date(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Child entity: a typed value attached to exactly one PMC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    pub id: EntityId,
    pub pmc_id: EntityId,
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: ParamType,
    pub created_at: DateTime<Utc>,
}

/// Creation payload for a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewParam {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: ParamType,
}

impl NewParam {
    pub fn new(name: impl Into<String>, kind: ParamType, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind,
        }
    }

    /// Check required fields and type correctness of the value
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("name", "Parameter name is required"));
        }

        self.kind
            .check_value(&self.value)
            .map_err(|message| Error::validation("value", message))
    }
}

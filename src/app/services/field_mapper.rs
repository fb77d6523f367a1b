//! Column mapping for the fixed PMC track layout
//!
//! Each uploaded file carries five known columns. Every column maps to one
//! semantic parameter name and value type through a static table; there
//! are no dynamic columns.

use tracing::warn;

use super::csv_parser::CsvRow;
use crate::app::models::{NewParam, ParamType};
use crate::config::ColumnHeaders;
use crate::constants::param_names;
use crate::{Error, Result};

/// The five known input columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestField {
    FormationTime,
    DeathTime,
    FormationCoords,
    Radius,
    DeathCoords,
}

/// Semantic name and type a column is written as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub field: IngestField,
    pub param_name: &'static str,
    pub kind: ParamType,
}

/// Column table in file order
pub static FIELD_TABLE: [FieldMapping; 5] = [
    FieldMapping {
        field: IngestField::FormationTime,
        param_name: param_names::FORMATION_TIME,
        kind: ParamType::String,
    },
    FieldMapping {
        field: IngestField::DeathTime,
        param_name: param_names::DISSOLUTION_TIME,
        kind: ParamType::String,
    },
    FieldMapping {
        field: IngestField::FormationCoords,
        param_name: param_names::FORMATION_COORDS,
        kind: ParamType::Coords,
    },
    FieldMapping {
        field: IngestField::Radius,
        param_name: param_names::RADIUS,
        kind: ParamType::String,
    },
    FieldMapping {
        field: IngestField::DeathCoords,
        param_name: param_names::DISSOLUTION_COORDS,
        kind: ParamType::Coords,
    },
];

impl IngestField {
    pub fn mapping(&self) -> &'static FieldMapping {
        let index = match self {
            IngestField::FormationTime => 0,
            IngestField::DeathTime => 1,
            IngestField::FormationCoords => 2,
            IngestField::Radius => 3,
            IngestField::DeathCoords => 4,
        };
        &FIELD_TABLE[index]
    }

    pub fn param_name(&self) -> &'static str {
        self.mapping().param_name
    }
}

/// One CSV row resolved onto the column table
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    /// 1-based position among data rows
    pub index: usize,
    /// Line on which the row starts in the upload
    pub line: usize,
    values: [(IngestField, String); 5],
}

impl MappedRow {
    pub fn value(&self, field: IngestField) -> &str {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value.as_str())
            .unwrap_or_default()
    }

    pub fn formation_time(&self) -> &str {
        self.value(IngestField::FormationTime)
    }

    /// Parameter payloads for all five columns, in table order
    pub fn params(&self) -> Vec<(IngestField, NewParam)> {
        self.values
            .iter()
            .map(|(field, value)| {
                let mapping = field.mapping();
                (
                    *field,
                    NewParam::new(mapping.param_name, mapping.kind, value.clone()),
                )
            })
            .collect()
    }
}

/// Resolves configured CSV headers onto [`IngestField`]s
#[derive(Debug, Clone)]
pub struct FieldMapper {
    headers: [(IngestField, String); 5],
}

impl FieldMapper {
    /// Build from column headers, rejecting empty or duplicated names
    pub fn new(columns: &ColumnHeaders) -> Result<Self> {
        let headers = [
            (IngestField::FormationTime, columns.formation_time.trim()),
            (IngestField::DeathTime, columns.death_time.trim()),
            (IngestField::FormationCoords, columns.formation_coords.trim()),
            (IngestField::Radius, columns.radius.trim()),
            (IngestField::DeathCoords, columns.death_coords.trim()),
        ];

        for (position, (field, header)) in headers.iter().enumerate() {
            if header.is_empty() {
                return Err(Error::configuration(format!(
                    "No CSV header configured for {:?}",
                    field
                )));
            }
            if headers[..position].iter().any(|(_, other)| other == header) {
                return Err(Error::configuration(format!(
                    "Column header '{}' is mapped more than once",
                    header
                )));
            }
        }

        Ok(Self {
            headers: headers.map(|(field, header)| (field, header.to_string())),
        })
    }

    /// Header configured for `field`
    pub fn header(&self, field: IngestField) -> &str {
        self.headers
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, header)| header.as_str())
            .unwrap_or_default()
    }

    /// Check an upload header line before any row is processed
    pub fn check_headers(&self, present: &[String]) -> Result<()> {
        for (_, header) in &self.headers {
            if !present.iter().any(|p| p == header) {
                return Err(Error::validation(
                    header.clone(),
                    "Required column missing from CSV header",
                ));
            }
        }

        for extra in present
            .iter()
            .filter(|p| !self.headers.iter().any(|(_, header)| header == *p))
        {
            warn!("Ignoring unknown CSV column '{}'", extra);
        }

        Ok(())
    }

    /// Map a parsed row; absent columns read as empty strings
    pub fn map_row(&self, index: usize, row: &CsvRow) -> MappedRow {
        MappedRow {
            index,
            line: row.line,
            values: self
                .headers
                .clone()
                .map(|(field, header)| (field, row.get(&header).unwrap_or_default().to_string())),
        }
    }
}

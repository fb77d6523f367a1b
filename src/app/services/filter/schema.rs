//! Field whitelists for filterable entities

use crate::app::models::{Param, Pmc};

use super::request::FilterValue;

/// Value type of a filterable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Bool,
    ParamType,
}

/// A whitelisted field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// The permitted fields of one entity kind
#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    pub entity: &'static str,
    pub fields: &'static [FieldSpec],
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|spec| spec.name).collect()
    }
}

pub const PMC_SCHEMA: EntitySchema = EntitySchema {
    entity: "PMC",
    fields: &[
        FieldSpec {
            name: "name",
            kind: FieldKind::Text,
        },
        FieldSpec {
            name: "hasTracks",
            kind: FieldKind::Bool,
        },
    ],
};

pub const PARAM_SCHEMA: EntitySchema = EntitySchema {
    entity: "Param",
    fields: &[
        FieldSpec {
            name: "name",
            kind: FieldKind::Text,
        },
        FieldSpec {
            name: "type",
            kind: FieldKind::ParamType,
        },
        FieldSpec {
            name: "value",
            kind: FieldKind::Text,
        },
    ],
};

/// Field access used when a backend evaluates a predicate in memory
pub trait Filterable {
    fn field_value(&self, field: &str) -> Option<FilterValue>;
}

impl Filterable for Pmc {
    fn field_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "name" => Some(FilterValue::Text(self.name.clone())),
            "hasTracks" => Some(FilterValue::Bool(self.has_tracks)),
            _ => None,
        }
    }
}

impl Filterable for Param {
    fn field_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "name" => Some(FilterValue::Text(self.name.clone())),
            "type" => Some(FilterValue::Text(self.kind.as_str().to_string())),
            "value" => Some(FilterValue::Text(self.value.clone())),
            _ => None,
        }
    }
}

//! Declarative filter translation shared by every listing
//!
//! Callers send a list of `(field, condition, value)` triples. The
//! translator checks each triple against the whitelist of the entity being
//! listed and folds them into a backend-neutral [`Predicate`]: a mapping from
//! field name to a small condition record, combined with logical AND.
//!
//! ## Components
//!
//! - [`request`] - Wire shapes of filter requests
//! - [`schema`] - Per-entity field whitelists and field access
//! - [`translator`] - Filter to predicate translation and evaluation

pub mod request;
pub mod schema;
pub mod translator;

#[cfg(test)]
mod tests;

pub use request::{Filter, FilterCondition, FilterRequest, FilterValue};
pub use schema::{EntitySchema, FieldKind, FieldSpec, Filterable, PARAM_SCHEMA, PMC_SCHEMA};
pub use translator::{FieldCondition, Predicate, translate};

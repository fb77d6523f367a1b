//! Test fixtures for filter translation

use chrono::Utc;

use crate::app::models::{EntityId, Param, ParamType, Pmc};

mod request_tests;

pub fn pmc(name: &str, has_tracks: bool) -> Pmc {
    Pmc {
        id: EntityId::new(name),
        name: name.to_string(),
        has_tracks,
        created_at: Utc::now(),
    }
}

pub fn param(name: &str, kind: ParamType, value: &str) -> Param {
    Param {
        id: EntityId::new(format!("{}-param", name)),
        pmc_id: EntityId::new("1"),
        name: name.to_string(),
        value: value.to_string(),
        kind,
        created_at: Utc::now(),
    }
}

//! Storage collaborator boundary
//!
//! The ingestion and query services never talk to a database directly. They
//! emit predicates and write requests through this trait, and the backend
//! owns durability and isolation of individual writes.

use async_trait::async_trait;

use crate::app::models::{EntityId, NewParam, Param, Pmc};
use crate::app::services::filter::Predicate;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Errors reported by a storage backend
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    /// A PMC with this name was created concurrently
    #[error("PMC named '{name}' already exists")]
    Conflict { name: String },

    /// Referenced entity does not exist
    #[error("{entity} not found: id = {id}")]
    NotFound { entity: &'static str, id: String },

    /// Backend failure for a single call
    #[error("{message}")]
    Backend { message: String },
}

impl StorageError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Operations the core requires from a persistence backend
#[async_trait]
pub trait Storage: Send + Sync {
    /// Find a PMC by its exact name
    async fn find_pmc_by_name(&self, name: &str) -> StorageResult<Option<Pmc>>;

    /// Find a PMC by identifier
    async fn find_pmc_by_id(&self, id: &EntityId) -> StorageResult<Option<Pmc>>;

    /// Create a PMC; fails with [`StorageError::Conflict`] if the name is taken
    async fn create_pmc(&self, name: &str) -> StorageResult<Pmc>;

    /// Create a parameter owned by `pmc_id`
    async fn create_param(&self, pmc_id: &EntityId, param: &NewParam) -> StorageResult<Param>;

    /// Page through PMCs matching `predicate`, returning the page and the total match count
    async fn list_pmcs(
        &self,
        predicate: &Predicate,
        limit: usize,
        offset: usize,
    ) -> StorageResult<(Vec<Pmc>, usize)>;

    /// All parameters of `pmc_id` matching `predicate`
    async fn list_params(
        &self,
        pmc_id: &EntityId,
        predicate: &Predicate,
    ) -> StorageResult<Vec<Param>>;
}

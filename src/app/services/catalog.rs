//! Single-entity operations on PMCs and their parameters
//!
//! Each call surfaces one typed error; unlike ingestion there is no batch
//! report to collect failures into.

use std::sync::Arc;
use tracing::{debug, info};

use crate::app::adapters::storage::{Storage, StorageError};
use crate::app::models::{EntityId, NewParam, Param, Pmc};
use crate::{Error, Result};

/// Write side of the catalogue for individual entities
pub struct CatalogService {
    storage: Arc<dyn Storage>,
}

impl CatalogService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Create a PMC, or return the existing one with the same name
    pub async fn create_pmc(&self, name: &str) -> Result<Pmc> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("name", "PMC name is required"));
        }

        if let Some(existing) = self.storage.find_pmc_by_name(name).await? {
            debug!("PMC '{}' already exists as {}", name, existing.id);
            return Ok(existing);
        }

        match self.storage.create_pmc(name).await {
            Ok(pmc) => {
                info!("Created PMC '{}' ({})", pmc.name, pmc.id);
                Ok(pmc)
            }
            Err(StorageError::Conflict { .. }) => self
                .storage
                .find_pmc_by_name(name)
                .await?
                .ok_or_else(|| Error::conflict(name)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_pmc(&self, id: &EntityId) -> Result<Pmc> {
        self.storage
            .find_pmc_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("PMC", id.as_str()))
    }

    /// Attach a parameter to an existing PMC
    pub async fn create_param(&self, pmc_id: &EntityId, param: &NewParam) -> Result<Param> {
        param.validate()?;

        if self.storage.find_pmc_by_id(pmc_id).await?.is_none() {
            return Err(Error::not_found("PMC", pmc_id.as_str()));
        }

        let created = self.storage.create_param(pmc_id, param).await?;
        info!(
            "Added parameter '{}' ({}) to PMC {}",
            created.name, created.kind, pmc_id
        );
        Ok(created)
    }
}

//! Get-or-create resolution of PMC names
//!
//! Rows that derive the same name share one initialisation cell, so the
//! lookup-then-create sequence runs at most once per name even when those
//! rows are processed concurrently. A failed resolution leaves the cell
//! empty and the next row with that name retries it.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::app::adapters::storage::{Storage, StorageError};
use crate::app::models::EntityId;
use crate::{Error, Result};

/// Per-run cache from PMC name to identifier
pub struct ParentResolver {
    storage: Arc<dyn Storage>,
    cells: Mutex<HashMap<String, Arc<OnceCell<EntityId>>>>,
    created: AtomicUsize,
    reused: AtomicUsize,
}

impl ParentResolver {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            cells: Mutex::new(HashMap::new()),
            created: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
        }
    }

    /// Identifier of the PMC named `name`, creating it on first sight
    pub async fn resolve(&self, name: &str) -> Result<EntityId> {
        let cell = {
            let mut cells = self.cells.lock().await;
            Arc::clone(cells.entry(name.to_string()).or_default())
        };

        cell.get_or_try_init(|| self.find_or_create(name))
            .await
            .cloned()
    }

    /// PMCs created by this resolver
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    /// PMCs that already existed in storage
    pub fn reused(&self) -> usize {
        self.reused.load(Ordering::Relaxed)
    }

    async fn find_or_create(&self, name: &str) -> Result<EntityId> {
        if let Some(existing) = self.storage.find_pmc_by_name(name).await? {
            debug!("Reusing PMC '{}' ({})", name, existing.id);
            self.reused.fetch_add(1, Ordering::Relaxed);
            return Ok(existing.id);
        }

        match self.storage.create_pmc(name).await {
            Ok(pmc) => {
                debug!("Created PMC '{}' ({})", name, pmc.id);
                self.created.fetch_add(1, Ordering::Relaxed);
                Ok(pmc.id)
            }
            Err(StorageError::Conflict { .. }) => {
                // Another writer won the race; adopt its record
                debug!("PMC '{}' created concurrently, re-reading", name);
                let existing = self.storage.find_pmc_by_name(name).await?.ok_or_else(|| {
                    Error::write(format!(
                        "PMC '{}' reported as existing but could not be read back",
                        name
                    ))
                })?;
                self.reused.fetch_add(1, Ordering::Relaxed);
                Ok(existing.id)
            }
            Err(e) => Err(e.into()),
        }
    }
}

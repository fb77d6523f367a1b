//! In-process storage backend
//!
//! Keeps PMCs and parameters in memory behind an async lock and evaluates
//! predicates directly against the entities. The whole state can be saved
//! to and restored from a JSON snapshot, which is how the CLI persists data
//! between invocations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::storage::{Storage, StorageError, StorageResult};
use crate::app::models::{EntityId, NewParam, Param, Pmc};
use crate::app::services::filter::Predicate;
use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPmc {
    id: EntityId,
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreState {
    next_id: u64,
    pmcs: Vec<StoredPmc>,
    params: Vec<Param>,
}

impl StoreState {
    fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId::new(self.next_id.to_string())
    }

    fn to_pmc(&self, stored: &StoredPmc) -> Pmc {
        Pmc {
            id: stored.id.clone(),
            name: stored.name.clone(),
            has_tracks: self.params.iter().any(|p| p.pmc_id == stored.id),
            created_at: stored.created_at,
        }
    }

    fn find_pmc(&self, id: &EntityId) -> Option<&StoredPmc> {
        self.pmcs.iter().find(|pmc| &pmc.id == id)
    }
}

/// Storage backend holding all entities in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a store from a snapshot; a missing file yields an empty store
    pub async fn open(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            info!("No snapshot at {}, starting empty", path.display());
            return Ok(Self::new());
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::io(format!("Failed to read snapshot {}", path.display()), e)
        })?;
        let state: StoreState = serde_json::from_str(&content).map_err(|e| {
            Error::serialization(format!("Failed to parse snapshot {}", path.display()), e)
        })?;

        debug!(
            "Loaded snapshot with {} PMCs and {} parameters",
            state.pmcs.len(),
            state.params.len()
        );

        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Write the current state as a JSON snapshot, replacing any previous one
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = {
            let state = self.state.read().await;
            serde_json::to_string_pretty(&*state)?
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    Error::io(format!("Failed to create {}", parent.display()), e)
                })?;
            }
        }

        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, json)
            .await
            .map_err(|e| Error::io(format!("Failed to write {}", staging.display()), e))?;
        tokio::fs::rename(&staging, path)
            .await
            .map_err(|e| Error::io(format!("Failed to replace {}", path.display()), e))?;

        debug!("Saved snapshot to {}", path.display());
        Ok(())
    }

    pub async fn pmc_count(&self) -> usize {
        self.state.read().await.pmcs.len()
    }

    pub async fn param_count(&self) -> usize {
        self.state.read().await.params.len()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn find_pmc_by_name(&self, name: &str) -> StorageResult<Option<Pmc>> {
        let state = self.state.read().await;
        Ok(state
            .pmcs
            .iter()
            .find(|pmc| pmc.name == name)
            .map(|stored| state.to_pmc(stored)))
    }

    async fn find_pmc_by_id(&self, id: &EntityId) -> StorageResult<Option<Pmc>> {
        let state = self.state.read().await;
        Ok(state.find_pmc(id).map(|stored| state.to_pmc(stored)))
    }

    async fn create_pmc(&self, name: &str) -> StorageResult<Pmc> {
        let mut state = self.state.write().await;
        if state.pmcs.iter().any(|pmc| pmc.name == name) {
            return Err(StorageError::Conflict {
                name: name.to_string(),
            });
        }

        let stored = StoredPmc {
            id: state.allocate_id(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        let pmc = state.to_pmc(&stored);
        state.pmcs.push(stored);
        Ok(pmc)
    }

    async fn create_param(&self, pmc_id: &EntityId, param: &NewParam) -> StorageResult<Param> {
        let mut state = self.state.write().await;
        if state.find_pmc(pmc_id).is_none() {
            return Err(StorageError::NotFound {
                entity: "PMC",
                id: pmc_id.to_string(),
            });
        }

        let created = Param {
            id: state.allocate_id(),
            pmc_id: pmc_id.clone(),
            name: param.name.clone(),
            value: param.value.clone(),
            kind: param.kind,
            created_at: Utc::now(),
        };
        state.params.push(created.clone());
        Ok(created)
    }

    async fn list_pmcs(
        &self,
        predicate: &Predicate,
        limit: usize,
        offset: usize,
    ) -> StorageResult<(Vec<Pmc>, usize)> {
        let state = self.state.read().await;
        let matching: Vec<Pmc> = state
            .pmcs
            .iter()
            .map(|stored| state.to_pmc(stored))
            .filter(|pmc| predicate.matches(pmc))
            .collect();

        let total = matching.len();
        let page = matching.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    async fn list_params(
        &self,
        pmc_id: &EntityId,
        predicate: &Predicate,
    ) -> StorageResult<Vec<Param>> {
        let state = self.state.read().await;
        Ok(state
            .params
            .iter()
            .filter(|param| &param.pmc_id == pmc_id && predicate.matches(*param))
            .cloned()
            .collect())
    }
}

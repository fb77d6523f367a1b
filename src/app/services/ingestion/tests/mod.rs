//! Test fixtures for ingestion
//!
//! Wrapper stores around [`MemoryStore`] that count, delay, fail or cancel
//! specific calls so concurrency and failure handling can be observed.
//! The query and catalog tests reuse [`TestStore`] to count storage calls.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

use crate::MemoryStore;
use crate::app::adapters::storage::{Storage, StorageError, StorageResult};
use crate::app::models::{EntityId, NewParam, Param, Pmc};
use crate::app::services::filter::Predicate;
use crate::app::services::ingestion::IngestionOrchestrator;
use crate::config::IngestionConfig;

mod resolver_tests;

pub const HEADER: &str = "formation_time,death_time,formation_coords,radius,death_coords";

/// Build a track file from `(formation, radius)` pairs
pub fn track_csv(rows: &[(&str, &str)]) -> String {
    let mut csv = format!("{}\n", HEADER);
    for (formation, radius) in rows {
        csv.push_str(&format!(
            "{},2023-02-01 00:00:00,\"71.5, 12.0\",{},\"74.0, 20.5\"\n",
            formation, radius
        ));
    }
    csv
}

pub fn orchestrator(storage: Arc<dyn Storage>, workers: usize) -> IngestionOrchestrator {
    let config = IngestionConfig {
        workers,
        ..IngestionConfig::default()
    };
    IngestionOrchestrator::new(storage, &config).unwrap()
}

/// Store wrapper with call counters, yield points and optional faults
#[derive(Default)]
pub struct TestStore {
    pub inner: MemoryStore,
    pub lookups: AtomicUsize,
    pub pmc_creates: AtomicUsize,
    pub param_creates: AtomicUsize,
    pub listings: AtomicUsize,
    /// `(param name, value)` whose creation fails
    pub fail_param: Option<(String, String)>,
    /// PMC name whose creation fails
    pub fail_pmc: Option<String>,
    /// Failures left before `fail_pmc` starts succeeding
    pub fail_pmc_times: AtomicUsize,
    /// Cancelled on the first PMC creation
    pub cancel_on_create: Option<CancellationToken>,
}

impl TestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_param(name: &str, value: &str) -> Self {
        Self {
            fail_param: Some((name.to_string(), value.to_string())),
            ..Self::default()
        }
    }

    pub fn failing_pmc(name: &str, times: usize) -> Self {
        Self {
            fail_pmc: Some(name.to_string()),
            fail_pmc_times: AtomicUsize::new(times),
            ..Self::default()
        }
    }

    pub fn cancelling(token: CancellationToken) -> Self {
        Self {
            cancel_on_create: Some(token),
            ..Self::default()
        }
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for TestStore {
    async fn find_pmc_by_name(&self, name: &str) -> StorageResult<Option<Pmc>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        // Give concurrent rows a chance to interleave between lookup and create
        tokio::task::yield_now().await;
        self.inner.find_pmc_by_name(name).await
    }

    async fn find_pmc_by_id(&self, id: &EntityId) -> StorageResult<Option<Pmc>> {
        self.inner.find_pmc_by_id(id).await
    }

    async fn create_pmc(&self, name: &str) -> StorageResult<Pmc> {
        self.pmc_creates.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if let Some(token) = &self.cancel_on_create {
            token.cancel();
        }
        if self.fail_pmc.as_deref() == Some(name) {
            let left = self.fail_pmc_times.load(Ordering::SeqCst);
            if left > 0 {
                self.fail_pmc_times.store(left - 1, Ordering::SeqCst);
                return Err(StorageError::backend("injected PMC failure"));
            }
        }
        self.inner.create_pmc(name).await
    }

    async fn create_param(&self, pmc_id: &EntityId, param: &NewParam) -> StorageResult<Param> {
        self.param_creates.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if let Some((name, value)) = &self.fail_param {
            if &param.name == name && &param.value == value {
                return Err(StorageError::backend("injected write failure"));
            }
        }
        self.inner.create_param(pmc_id, param).await
    }

    async fn list_pmcs(
        &self,
        predicate: &Predicate,
        limit: usize,
        offset: usize,
    ) -> StorageResult<(Vec<Pmc>, usize)> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        self.inner.list_pmcs(predicate, limit, offset).await
    }

    async fn list_params(
        &self,
        pmc_id: &EntityId,
        predicate: &Predicate,
    ) -> StorageResult<Vec<Param>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        self.inner.list_params(pmc_id, predicate).await
    }
}

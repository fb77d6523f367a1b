//! Tests for PMC name resolution

use futures::future::join_all;
use std::sync::atomic::AtomicBool;

use super::*;
use crate::app::services::ingestion::ParentResolver;

/// Misses the first lookup so the following create hits a conflict
#[derive(Default)]
struct StaleReadStore {
    inner: MemoryStore,
    missed: AtomicBool,
}

#[async_trait]
impl Storage for StaleReadStore {
    async fn find_pmc_by_name(&self, name: &str) -> StorageResult<Option<Pmc>> {
        if !self.missed.swap(true, Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.find_pmc_by_name(name).await
    }

    async fn find_pmc_by_id(&self, id: &EntityId) -> StorageResult<Option<Pmc>> {
        self.inner.find_pmc_by_id(id).await
    }

    async fn create_pmc(&self, name: &str) -> StorageResult<Pmc> {
        self.inner.create_pmc(name).await
    }

    async fn create_param(&self, pmc_id: &EntityId, param: &NewParam) -> StorageResult<Param> {
        self.inner.create_param(pmc_id, param).await
    }

    async fn list_pmcs(
        &self,
        predicate: &Predicate,
        limit: usize,
        offset: usize,
    ) -> StorageResult<(Vec<Pmc>, usize)> {
        self.inner.list_pmcs(predicate, limit, offset).await
    }

    async fn list_params(
        &self,
        pmc_id: &EntityId,
        predicate: &Predicate,
    ) -> StorageResult<Vec<Param>> {
        self.inner.list_params(pmc_id, predicate).await
    }
}

#[tokio::test]
async fn test_concurrent_first_sight_creates_once() {
    let store = Arc::new(TestStore::new());
    let resolver = ParentResolver::new(store.clone());

    let ids = join_all((0..10).map(|_| resolver.resolve("PMC A"))).await;

    let first = ids[0].as_ref().unwrap().clone();
    assert!(ids.iter().all(|id| id.as_ref().unwrap() == &first));
    assert_eq!(TestStore::count(&store.lookups), 1);
    assert_eq!(TestStore::count(&store.pmc_creates), 1);
    assert_eq!(resolver.created(), 1);
    assert_eq!(resolver.reused(), 0);
}

#[tokio::test]
async fn test_distinct_names_resolve_independently() {
    let store = Arc::new(TestStore::new());
    let resolver = ParentResolver::new(store.clone());

    let a = resolver.resolve("PMC A").await.unwrap();
    let b = resolver.resolve("PMC B").await.unwrap();

    assert_ne!(a, b);
    assert_eq!(resolver.created(), 2);
}

#[tokio::test]
async fn test_conflict_is_recovered_by_rereading() {
    let store = Arc::new(StaleReadStore::default());
    let existing = store.inner.create_pmc("PMC A").await.unwrap();
    let resolver = ParentResolver::new(store.clone());

    let id = resolver.resolve("PMC A").await.unwrap();

    assert_eq!(id, existing.id);
    assert_eq!(resolver.reused(), 1);
    assert_eq!(resolver.created(), 0);
}

#[tokio::test]
async fn test_failed_resolution_can_be_retried() {
    let store = Arc::new(TestStore::failing_pmc("PMC A", 1));
    let resolver = ParentResolver::new(store.clone());

    assert!(matches!(
        resolver.resolve("PMC A").await,
        Err(crate::Error::Write { .. })
    ));
    assert!(resolver.resolve("PMC A").await.is_ok());
    assert_eq!(TestStore::count(&store.pmc_creates), 2);
}

//! End-to-end ingestion tests through the public API
//!
//! Uploads are fed as raw bytes, stored in a `MemoryStore`, and read back
//! through the query service the way a caller would.

use async_trait::async_trait;
use pmc_ingest::app::adapters::storage::StorageResult;
use pmc_ingest::app::services::filter::{Filter, FilterCondition, FilterRequest, Predicate};
use pmc_ingest::app::services::ingestion::{BatchStatus, IngestionOrchestrator};
use pmc_ingest::app::services::query::{PageRequest, QueryService};
use pmc_ingest::config::{ColumnHeaders, Config, IngestionConfig};
use pmc_ingest::{EntityId, Error, MemoryStore, NewParam, Param, ParamType, Pmc, Storage, StorageError};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const TRACKS: &str = "\
formation_time,death_time,formation_coords,radius,death_coords
2023-01-01 09:00:00,2023-01-03 18:00:00,\"71.5, 12.0\",300,\"74.0, 20.5\"

2023-01-01 09:00:00,2023-01-03 21:00:00,\"71.9, 12.8\",320,\"74.4, 21.0\"
2023-01-05 06:00:00,2023-01-06 12:00:00,\"70.1, 5.3\",\"250 \"\"approx\"\"\",\"72.8, 9.9\"
";

fn orchestrator(store: Arc<dyn Storage>) -> IngestionOrchestrator {
    IngestionOrchestrator::new(store, &Config::default().with_workers(4).ingestion).unwrap()
}

/// Fails every write of one parameter value
struct FlakyStore {
    inner: MemoryStore,
    failing_value: &'static str,
}

#[async_trait]
impl Storage for FlakyStore {
    async fn find_pmc_by_name(&self, name: &str) -> StorageResult<Option<Pmc>> {
        self.inner.find_pmc_by_name(name).await
    }

    async fn find_pmc_by_id(&self, id: &EntityId) -> StorageResult<Option<Pmc>> {
        self.inner.find_pmc_by_id(id).await
    }

    async fn create_pmc(&self, name: &str) -> StorageResult<Pmc> {
        self.inner.create_pmc(name).await
    }

    async fn create_param(&self, pmc_id: &EntityId, param: &NewParam) -> StorageResult<Param> {
        if param.value == self.failing_value {
            return Err(StorageError::backend("connection reset"));
        }
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
async fn test_upload_is_stored_and_queryable() {
    let store = Arc::new(MemoryStore::new());
    let report = orchestrator(store.clone())
        .ingest(TRACKS.as_bytes(), &CancellationToken::new(), None)
        .await
        .unwrap();

    assert_eq!(report.status(), BatchStatus::Success);
    assert_eq!(report.rows_total, 3);
    assert_eq!(report.pmcs_created, 2);
    assert_eq!(report.params_created, 15);

    let query = QueryService::new(store.clone(), Config::default().query);
    let request = FilterRequest::new(vec![
        Filter::new("name", FilterCondition::Contains, "2023-01-01"),
        Filter::new("hasTracks", FilterCondition::Equals, "true"),
    ]);
    let page = query.list_pmcs(&request, PageRequest::default()).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert!(page.is_last_page);

    let pmc = &page.list[0];
    assert_eq!(pmc.name, "PMC 2023-01-01 09:00:00");

    let radii = query
        .list_params(
            &pmc.id,
            &FilterRequest::new(vec![Filter::new("name", FilterCondition::Equals, "Radius")]),
        )
        .await
        .unwrap();
    let mut values: Vec<_> = radii.iter().map(|p| p.value.as_str()).collect();
    values.sort();
    assert_eq!(values, vec!["300", "320"]);

    let coords = query
        .list_params(
            &pmc.id,
            &FilterRequest::new(vec![Filter::new("type", FilterCondition::Equals, "coords")]),
        )
        .await
        .unwrap();
    assert_eq!(coords.len(), 4);
    assert!(coords.iter().all(|p| p.kind == ParamType::Coords));
}

#[tokio::test]
async fn test_quoted_values_survive_ingestion() {
    let store = Arc::new(MemoryStore::new());
    orchestrator(store.clone())
        .ingest(TRACKS.as_bytes(), &CancellationToken::new(), None)
        .await
        .unwrap();

    let pmc = store
        .find_pmc_by_name("PMC 2023-01-05 06:00:00")
        .await
        .unwrap()
        .unwrap();
    let radius = QueryService::new(store.clone(), Config::default().query)
        .list_params(
            &pmc.id,
            &FilterRequest::new(vec![Filter::new("name", FilterCondition::Equals, "Radius")]),
        )
        .await
        .unwrap();
    assert_eq!(radius[0].value, "250 \"approx\"");
}

#[tokio::test]
async fn test_reingesting_reuses_pmcs() {
    let store = Arc::new(MemoryStore::new());
    let orchestrator = orchestrator(store.clone());
    let token = CancellationToken::new();

    orchestrator.ingest(TRACKS.as_bytes(), &token, None).await.unwrap();
    let second = orchestrator.ingest(TRACKS.as_bytes(), &token, None).await.unwrap();

    assert_eq!(second.pmcs_created, 0);
    assert_eq!(second.pmcs_reused, 2);
    assert_eq!(store.pmc_count().await, 2);
    assert_eq!(store.param_count().await, 30);
}

#[tokio::test]
async fn test_backend_failures_are_collected_per_field() {
    let store = Arc::new(FlakyStore {
        inner: MemoryStore::new(),
        failing_value: "320",
    });
    let report = orchestrator(store.clone())
        .ingest(TRACKS.as_bytes(), &CancellationToken::new(), None)
        .await
        .unwrap();

    assert_eq!(report.status(), BatchStatus::PartialFailure);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].row, 2);
    assert_eq!(report.failures[0].line, 4);
    assert_eq!(report.failures[0].field, "Radius");
    assert_eq!(report.params_created, 14);
    assert_eq!(store.inner.param_count().await, 14);
}

#[tokio::test]
async fn test_custom_columns_and_template() {
    let columns = ColumnHeaders {
        formation_time: "born".to_string(),
        death_time: "died".to_string(),
        formation_coords: "start".to_string(),
        radius: "size_km".to_string(),
        death_coords: "end".to_string(),
    };
    let config = Config::default()
        .with_columns(columns)
        .with_name_template("Low {formation}");
    config.validate().unwrap();

    let store = Arc::new(MemoryStore::new());
    let orchestrator = IngestionOrchestrator::new(store.clone(), &config.ingestion).unwrap();
    let csv = "born,died,start,size_km,end,comment\n2023-03-01,2023-03-02,70 10,150,71 11,ok\n";

    let report = orchestrator
        .ingest(csv.as_bytes(), &CancellationToken::new(), None)
        .await
        .unwrap();

    assert!(report.is_success());
    assert!(store.find_pmc_by_name("Low 2023-03-01").await.unwrap().is_some());
}

#[tokio::test]
async fn test_malformed_upload_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let truncated = &TRACKS[..TRACKS.len() - 20];

    let result = orchestrator(store.clone())
        .ingest(truncated.as_bytes(), &CancellationToken::new(), None)
        .await;

    assert!(matches!(result, Err(Error::Parse { .. })));
    assert_eq!(store.pmc_count().await, 0);
}

#[tokio::test]
async fn test_snapshot_persists_ingested_data() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let store = Arc::new(MemoryStore::new());
    orchestrator(store.clone())
        .ingest(TRACKS.as_bytes(), &CancellationToken::new(), None)
        .await
        .unwrap();
    store.save(&path).await.unwrap();

    let restored = MemoryStore::open(&path).await.unwrap();
    assert_eq!(restored.pmc_count().await, 2);
    assert_eq!(restored.param_count().await, 15);
    let pmc = restored
        .find_pmc_by_name("PMC 2023-01-05 06:00:00")
        .await
        .unwrap()
        .unwrap();
    assert!(pmc.has_tracks);
}

#[test]
fn test_default_ingestion_config_is_valid() {
    let config = IngestionConfig::default();
    assert!(config.workers >= 1);
    assert!(IngestionOrchestrator::new(Arc::new(MemoryStore::new()), &config).is_ok());
}

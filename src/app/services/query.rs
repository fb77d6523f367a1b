//! Filtered, paginated listings
//!
//! Filters are translated against the entity whitelist before storage is
//! touched; a rejected filter never reaches the backend.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::filter::{FilterRequest, PARAM_SCHEMA, PMC_SCHEMA, translate};
use crate::app::adapters::storage::Storage;
use crate::app::models::{EntityId, Param, Pmc};
use crate::config::QueryConfig;
use crate::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::{Error, Result};

/// Pagination parameters as received from a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// Number of entities preceding this page
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    pub fn validate(&self, max_page_size: usize) -> Result<()> {
        if self.page < 1 {
            return Err(Error::validation("page", "Page must be at least 1"));
        }
        if self.page_size < 1 {
            return Err(Error::validation("pageSize", "Page size must be at least 1"));
        }
        if self.page_size > max_page_size {
            return Err(Error::validation(
                "pageSize",
                format!("Page size must not exceed {}", max_page_size),
            ));
        }
        Ok(())
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub list: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub is_last_page: bool,
    pub total_count: usize,
}

impl<T> Page<T> {
    pub fn new(list: Vec<T>, request: PageRequest, total_count: usize) -> Self {
        Self {
            list,
            page: request.page,
            page_size: request.page_size,
            is_last_page: is_last_page(request, total_count),
            total_count,
        }
    }

    /// Number of pages holding at least one entity
    pub fn page_count(&self) -> usize {
        self.total_count.div_ceil(self.page_size.max(1))
    }
}

/// Pages past the end are reported as last, never as errors
fn is_last_page(request: PageRequest, total_count: usize) -> bool {
    total_count == 0 || request.page >= total_count.div_ceil(request.page_size.max(1))
}

/// Read side of the catalogue
pub struct QueryService {
    storage: Arc<dyn Storage>,
    config: QueryConfig,
}

impl QueryService {
    pub fn new(storage: Arc<dyn Storage>, config: QueryConfig) -> Self {
        Self { storage, config }
    }

    /// Build a page request, filling gaps from configuration
    pub fn page_request(&self, page: Option<usize>, page_size: Option<usize>) -> PageRequest {
        PageRequest::new(
            page.unwrap_or(DEFAULT_PAGE),
            page_size.unwrap_or(self.config.default_page_size),
        )
    }

    /// List PMCs matching all filters, one page at a time
    pub async fn list_pmcs(&self, request: &FilterRequest, page: PageRequest) -> Result<Page<Pmc>> {
        let predicate = translate(&request.filters, &PMC_SCHEMA)?;
        page.validate(self.config.max_page_size)?;

        let (list, total_count) = self
            .storage
            .list_pmcs(&predicate, page.page_size, page.offset())
            .await?;

        debug!(
            "Listed {} of {} PMCs (page {}, size {})",
            list.len(),
            total_count,
            page.page,
            page.page_size
        );

        Ok(Page::new(list, page, total_count))
    }

    /// List the parameters of one PMC matching all filters
    pub async fn list_params(&self, pmc_id: &EntityId, request: &FilterRequest) -> Result<Vec<Param>> {
        let predicate = translate(&request.filters, &PARAM_SCHEMA)?;

        if self.storage.find_pmc_by_id(pmc_id).await?.is_none() {
            return Err(Error::not_found("PMC", pmc_id.as_str()));
        }

        let params = self.storage.list_params(pmc_id, &predicate).await?;
        debug!("Listed {} parameters of PMC {}", params.len(), pmc_id);
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{NewParam, ParamType};
    use crate::app::services::filter::{Filter, FilterCondition};
    use crate::app::services::ingestion::tests::TestStore;

    async fn seeded_store(count: usize) -> Arc<TestStore> {
        let store = Arc::new(TestStore::new());
        for i in 0..count {
            store.inner.create_pmc(&format!("PMC {:02}", i)).await.unwrap();
        }
        store
    }

    fn service(store: Arc<TestStore>) -> QueryService {
        QueryService::new(store, QueryConfig::default())
    }

    #[tokio::test]
    async fn test_pagination_boundaries() {
        let service = service(seeded_store(25).await);
        let everything = FilterRequest::default();

        let third = service
            .list_pmcs(&everything, PageRequest::new(3, 10))
            .await
            .unwrap();
        assert_eq!(third.list.len(), 5);
        assert!(third.is_last_page);
        assert_eq!(third.total_count, 25);
        assert_eq!(third.page_count(), 3);

        let fourth = service
            .list_pmcs(&everything, PageRequest::new(4, 10))
            .await
            .unwrap();
        assert!(fourth.list.is_empty());
        assert!(fourth.is_last_page);

        let first = service
            .list_pmcs(&everything, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(first.list.len(), 10);
        assert!(!first.is_last_page);
        assert_eq!(first.list[0].name, "PMC 00");
    }

    #[tokio::test]
    async fn test_empty_listing_is_last_page() {
        let service = service(seeded_store(0).await);
        let page = service
            .list_pmcs(&FilterRequest::default(), PageRequest::default())
            .await
            .unwrap();
        assert!(page.list.is_empty());
        assert!(page.is_last_page);
        assert_eq!(page.total_count, 0);
    }

    #[tokio::test]
    async fn test_unknown_field_issues_no_storage_call() {
        let store = seeded_store(3).await;
        let service = service(store.clone());
        let request = FilterRequest::new(vec![Filter::new(
            "secret",
            FilterCondition::Equals,
            "x",
        )]);

        match service.list_pmcs(&request, PageRequest::default()).await {
            Err(Error::Validation { field, .. }) => assert_eq!(field, "secret"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(TestStore::count(&store.listings), 0);
    }

    #[tokio::test]
    async fn test_invalid_page_request_is_rejected() {
        let store = seeded_store(3).await;
        let service = service(store.clone());

        for request in [PageRequest::new(0, 10), PageRequest::new(1, 0), PageRequest::new(1, 101)] {
            let result = service.list_pmcs(&FilterRequest::default(), request).await;
            assert!(result.unwrap_err().is_validation());
        }
        assert_eq!(TestStore::count(&store.listings), 0);
    }

    #[tokio::test]
    async fn test_filters_combine_with_and() {
        let store = seeded_store(3).await;
        store.inner.create_pmc("Other").await.unwrap();
        let tracked = store.inner.find_pmc_by_name("PMC 01").await.unwrap().unwrap();
        store
            .inner
            .create_param(&tracked.id, &NewParam::new("Radius", ParamType::String, "300"))
            .await
            .unwrap();

        let request = FilterRequest::new(vec![
            Filter::new("name", FilterCondition::Contains, "PMC"),
            Filter::new("hasTracks", FilterCondition::Equals, true),
        ]);
        let page = service(store)
            .list_pmcs(&request, PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.total_count, 1);
        assert_eq!(page.list[0].id, tracked.id);
    }

    #[tokio::test]
    async fn test_list_params_filters_and_checks_parent() {
        let store = seeded_store(1).await;
        let pmc = store.inner.find_pmc_by_name("PMC 00").await.unwrap().unwrap();
        for (name, kind, value) in [
            ("Radius", ParamType::String, "300"),
            ("Formation coordinates", ParamType::Coords, "71.5, 12.0"),
            ("Dissolution coordinates", ParamType::Coords, "74.0, 20.5"),
        ] {
            store
                .inner
                .create_param(&pmc.id, &NewParam::new(name, kind, value))
                .await
                .unwrap();
        }
        let service = service(store);

        let coords = FilterRequest::new(vec![Filter::new("type", FilterCondition::Equals, "coords")]);
        let params = service.list_params(&pmc.id, &coords).await.unwrap();
        assert_eq!(params.len(), 2);

        let all = service
            .list_params(&pmc.id, &FilterRequest::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        assert!(matches!(
            service
                .list_params(&EntityId::new("missing"), &FilterRequest::default())
                .await,
            Err(Error::NotFound { entity: "PMC", .. })
        ));
    }

    #[test]
    fn test_page_request_defaults_and_offset() {
        let request: PageRequest = serde_json::from_str(r#"{"page": 3}"#).unwrap();
        assert_eq!(request, PageRequest::new(3, 10));
        assert_eq!(request.offset(), 20);
        assert_eq!(PageRequest::default().offset(), 0);
    }

    #[test]
    fn test_page_wire_shape() {
        let page = Page::new(vec![1, 2], PageRequest::new(2, 2), 4);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pageSize"], 2);
        assert_eq!(json["isLastPage"], true);
        assert_eq!(json["totalCount"], 4);
        assert_eq!(json["list"], serde_json::json!([1, 2]));
    }
}

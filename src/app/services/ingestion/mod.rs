//! Bulk ingestion of PMC track files
//!
//! This module turns an uploaded CSV file into storage writes: one PMC per
//! distinct derived name plus five parameters per row.
//!
//! # Architecture
//!
//! - [`orchestrator`] - Parsing, header checks and the bounded row fan-out
//! - [`resolver`] - At-most-once PMC creation per name within a run
//! - [`report`] - Batch outcome with per-item failures and counts
//!
//! # Processing Pipeline
//!
//! 1. **Parse**: the whole upload is parsed before any write is issued, so a
//!    malformed file never leaves partial data behind
//! 2. **Resolve**: each row derives its PMC name and resolves it through a
//!    shared get-or-create cell keyed by name
//! 3. **Fan out**: the row's parameters are written concurrently once the
//!    PMC id is known; failures are collected, never propagated to siblings
//!
//! # Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use pmc_ingest::app::services::ingestion::IngestionOrchestrator;
//! use pmc_ingest::config::IngestionConfig;
//! use pmc_ingest::MemoryStore;
//!
//! # async fn example(upload: Vec<u8>) -> pmc_ingest::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let orchestrator = IngestionOrchestrator::new(store, &IngestionConfig::default())?;
//!
//! let report = orchestrator
//!     .ingest(&upload, &CancellationToken::new(), None)
//!     .await?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

pub mod orchestrator;
pub mod report;
pub mod resolver;

#[cfg(test)]
pub mod tests;

pub use orchestrator::IngestionOrchestrator;
pub use report::{BatchStatus, IngestionFailure, IngestionPreview, IngestionReport, PARENT_FIELD};
pub use resolver::ParentResolver;

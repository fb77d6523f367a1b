//! Ingestion orchestrator
//!
//! Drives one upload from raw bytes to a batch report. Rows are processed
//! concurrently up to the configured worker limit; each row resolves its
//! PMC and then writes its five parameters concurrently. Every issued write
//! is awaited before the report is returned.

use futures::future;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::report::{IngestionFailure, IngestionPreview, IngestionReport, PARENT_FIELD};
use super::resolver::ParentResolver;
use crate::app::adapters::storage::Storage;
use crate::app::models::EntityId;
use crate::app::services::csv_parser::{CsvReader, decode_upload};
use crate::app::services::field_mapper::{FieldMapper, MappedRow};
use crate::config::IngestionConfig;
use crate::constants::{NAME_TEMPLATE_PLACEHOLDER, param_names};
use crate::{Error, Result};

/// What happened to a single row
#[derive(Debug, Default)]
struct RowOutcome {
    params_created: usize,
    failures: Vec<IngestionFailure>,
}

impl RowOutcome {
    fn failed(row: &MappedRow, field: &str, error: impl ToString) -> Self {
        Self {
            params_created: 0,
            failures: vec![IngestionFailure {
                row: row.index,
                line: row.line,
                field: field.to_string(),
                error: error.to_string(),
            }],
        }
    }
}

/// Orchestrates CSV ingestion against a storage backend
pub struct IngestionOrchestrator {
    storage: Arc<dyn Storage>,
    mapper: FieldMapper,
    name_template: String,
    workers: usize,
}

impl IngestionOrchestrator {
    pub fn new(storage: Arc<dyn Storage>, config: &IngestionConfig) -> Result<Self> {
        if config.workers == 0 {
            return Err(Error::configuration("Worker count must be at least 1"));
        }
        if !config.name_template.contains(NAME_TEMPLATE_PLACEHOLDER) {
            return Err(Error::configuration(format!(
                "Name template '{}' must contain {}",
                config.name_template, NAME_TEMPLATE_PLACEHOLDER
            )));
        }

        Ok(Self {
            storage,
            mapper: FieldMapper::new(&config.columns)?,
            name_template: config.name_template.clone(),
            workers: config.workers,
        })
    }

    /// PMC name derived from a formation timestamp
    pub fn parent_name(&self, formation: &str) -> String {
        self.name_template
            .replace(NAME_TEMPLATE_PLACEHOLDER, formation.trim())
    }

    /// Ingest an uploaded file
    ///
    /// Decoding, parsing and header errors fail the whole call before any
    /// write is issued. Once writing starts, the call always returns a
    /// report; failures are listed in it rather than returned.
    pub async fn ingest(
        &self,
        upload: &[u8],
        cancel: &CancellationToken,
        progress: Option<&ProgressBar>,
    ) -> Result<IngestionReport> {
        let text = decode_upload(upload)?;
        self.ingest_str(text, cancel, progress).await
    }

    /// Ingest CSV text
    pub async fn ingest_str(
        &self,
        text: &str,
        cancel: &CancellationToken,
        progress: Option<&ProgressBar>,
    ) -> Result<IngestionReport> {
        let rows = self.prepare(text)?;
        if let Some(pb) = progress {
            pb.set_length(rows.len() as u64);
        }
        Ok(self.ingest_rows(rows, cancel, progress).await)
    }

    /// Parse an upload and derive its PMC names without writing anything
    pub fn preview(&self, upload: &[u8]) -> Result<IngestionPreview> {
        let rows = self.prepare(decode_upload(upload)?)?;

        let mut names = BTreeSet::new();
        let mut rows_without_formation = 0;
        for row in &rows {
            if row.formation_time().trim().is_empty() {
                rows_without_formation += 1;
            } else {
                names.insert(self.parent_name(row.formation_time()));
            }
        }

        Ok(IngestionPreview {
            rows: rows.len(),
            pmc_names: names.into_iter().collect(),
            rows_without_formation,
        })
    }

    /// Parse and map every row up front
    fn prepare(&self, text: &str) -> Result<Vec<MappedRow>> {
        let reader = CsvReader::new(text)?;
        self.mapper.check_headers(reader.headers())?;

        let mut rows = Vec::new();
        for (position, row) in reader.enumerate() {
            rows.push(self.mapper.map_row(position + 1, &row?));
        }

        debug!("Parsed {} data rows", rows.len());
        Ok(rows)
    }

    /// Process mapped rows with bounded concurrency
    pub async fn ingest_rows(
        &self,
        rows: Vec<MappedRow>,
        cancel: &CancellationToken,
        progress: Option<&ProgressBar>,
    ) -> IngestionReport {
        let started = Instant::now();
        let rows_total = rows.len();
        let resolver = ParentResolver::new(Arc::clone(&self.storage));

        info!(
            "Ingesting {} rows with {} concurrent workers",
            rows_total, self.workers
        );

        let resolver = &resolver;
        let outcomes: Vec<RowOutcome> = stream::iter(rows)
            // Checked as each row is pulled, so in-flight rows finish and no new ones start
            .take_while(|_| future::ready(!cancel.is_cancelled()))
            .map(|row| async move {
                let outcome = self.process_row(row, resolver).await;
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                outcome
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;

        let mut report = IngestionReport {
            rows_total,
            rows_processed: outcomes.len(),
            rows_skipped: rows_total - outcomes.len(),
            pmcs_created: resolver.created(),
            pmcs_reused: resolver.reused(),
            ..Default::default()
        };
        for outcome in outcomes {
            report.params_created += outcome.params_created;
            report.failures.extend(outcome.failures);
        }
        report.failures.sort_by_key(|failure| failure.row);
        report.processing_time = started.elapsed();

        if report.rows_skipped > 0 {
            warn!(
                "Ingestion cancelled: {} of {} rows not started",
                report.rows_skipped, rows_total
            );
        }
        info!(
            "Ingestion finished: {} PMCs created, {} parameters created, {} failures",
            report.pmcs_created,
            report.params_created,
            report.failures.len()
        );

        report
    }

    async fn process_row(&self, row: MappedRow, resolver: &ParentResolver) -> RowOutcome {
        let formation = row.formation_time();
        if formation.trim().is_empty() {
            warn!("Row {} has no formation timestamp", row.index);
            return RowOutcome::failed(
                &row,
                param_names::FORMATION_TIME,
                Error::validation(
                    param_names::FORMATION_TIME,
                    "Formation timestamp is required to name the PMC",
                ),
            );
        }

        let name = self.parent_name(formation);
        let pmc_id = match resolver.resolve(&name).await {
            Ok(id) => id,
            Err(e) => {
                warn!("Row {}: failed to resolve PMC '{}': {}", row.index, name, e);
                return RowOutcome::failed(&row, PARENT_FIELD, e);
            }
        };

        self.write_params(&row, &pmc_id).await
    }

    async fn write_params(&self, row: &MappedRow, pmc_id: &EntityId) -> RowOutcome {
        let writes = row.params().into_iter().map(|(_, param)| async move {
            let result = match param.validate() {
                Ok(()) => self
                    .storage
                    .create_param(pmc_id, &param)
                    .await
                    .map_err(Error::from),
                Err(e) => Err(e),
            };
            (param.name, result)
        });

        let mut outcome = RowOutcome::default();
        for (name, result) in future::join_all(writes).await {
            match result {
                Ok(_) => outcome.params_created += 1,
                Err(e) => {
                    warn!("Row {}: failed to write '{}': {}", row.index, name, e);
                    outcome.failures.push(IngestionFailure {
                        row: row.index,
                        line: row.line,
                        field: name,
                        error: e.to_string(),
                    });
                }
            }
        }

        debug!(
            "Row {} wrote {} parameters to PMC {}",
            row.index, outcome.params_created, pmc_id
        );
        outcome
    }
}

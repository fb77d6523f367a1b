//! Batch outcome of an ingestion run

use serde::Serialize;
use std::time::Duration;

use crate::app::services::field_mapper::FIELD_TABLE;

/// Field label used for failures resolving the row's PMC
pub const PARENT_FIELD: &str = "PMC";

/// One failed write, or a row that could not be written at all
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionFailure {
    /// 1-based data row index
    pub row: usize,
    /// Line on which the row starts in the upload
    pub line: usize,
    /// Parameter name, or [`PARENT_FIELD`] for PMC resolution
    pub field: String,
    pub error: String,
}

/// What an upload would write, computed without touching storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionPreview {
    pub rows: usize,
    /// Distinct PMC names in name order
    pub pmc_names: Vec<String>,
    pub rows_without_formation: usize,
}

impl IngestionPreview {
    /// Parameters written if every row succeeds
    pub fn expected_params(&self) -> usize {
        (self.rows - self.rows_without_formation) * FIELD_TABLE.len()
    }
}

/// Overall result of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Every issued write succeeded and every row was processed
    Success,
    /// At least one write failed
    PartialFailure,
    /// Stopped early; rows not yet started were skipped
    Cancelled,
}

/// Counts and failures collected from every row of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestionReport {
    /// Data rows in the upload
    pub rows_total: usize,
    /// Rows whose work was started and awaited
    pub rows_processed: usize,
    /// Rows never started because the run was cancelled
    pub rows_skipped: usize,
    /// PMCs created by this run
    pub pmcs_created: usize,
    /// PMCs found already stored
    pub pmcs_reused: usize,
    /// Parameters written
    pub params_created: usize,
    /// Failed items, ordered by row
    pub failures: Vec<IngestionFailure>,
    #[serde(skip)]
    pub processing_time: Duration,
}

impl IngestionReport {
    pub fn status(&self) -> BatchStatus {
        if !self.failures.is_empty() {
            BatchStatus::PartialFailure
        } else if self.rows_skipped > 0 {
            BatchStatus::Cancelled
        } else {
            BatchStatus::Success
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == BatchStatus::Success
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Writes that succeeded, PMC creations included
    pub fn writes_succeeded(&self) -> usize {
        self.pmcs_created + self.params_created
    }

    /// Calculate rows processed per second
    pub fn rows_per_second(&self) -> f64 {
        if self.processing_time.as_secs_f64() > 0.0 {
            self.rows_processed as f64 / self.processing_time.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Rows: {} total, {} processed, {} skipped\n\
             PMCs: {} created, {} reused\n\
             Parameters: {} created\n\
             Failures: {}\n\
             Duration: {:.2}s",
            self.rows_total,
            self.rows_processed,
            self.rows_skipped,
            self.pmcs_created,
            self.pmcs_reused,
            self.params_created,
            self.failures.len(),
            self.processing_time.as_secs_f64()
        )
    }
}

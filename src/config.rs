//! Configuration management and validation.
//!
//! Provides configuration structures for ingestion concurrency, the CSV
//! column layout, pagination limits and the snapshot store location.
//! Configuration is validated once at startup so that a misconfigured
//! column table never reaches an ingestion run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{
    COLUMN_DEATH_COORDS, COLUMN_DEATH_TIME, COLUMN_FORMATION_COORDS, COLUMN_FORMATION_TIME,
    COLUMN_RADIUS, DATA_DIR_NAME, DEFAULT_NAME_TEMPLATE, DEFAULT_PAGE_SIZE,
    DEFAULT_PARALLEL_WORKERS, MAX_PAGE_SIZE, NAME_TEMPLATE_PLACEHOLDER, SNAPSHOT_FILE_NAME,
};
use crate::{Error, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ingestion: IngestionConfig,
    pub query: QueryConfig,
    pub storage: StorageConfig,
}

/// Settings for bulk CSV ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Maximum number of rows processed concurrently
    pub workers: usize,

    /// Template deriving a PMC name from the formation timestamp
    pub name_template: String,

    /// CSV headers of the five known columns
    pub columns: ColumnHeaders,
}

/// Header names of the fixed CSV columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnHeaders {
    pub formation_time: String,
    pub death_time: String,
    pub formation_coords: String,
    pub radius: String,
    pub death_coords: String,
}

/// Pagination limits for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

/// Location of the JSON snapshot used by the CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Snapshot file; defaults to the user data directory when unset
    pub snapshot_path: Option<PathBuf>,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().clamp(1, DEFAULT_PARALLEL_WORKERS),
            name_template: DEFAULT_NAME_TEMPLATE.to_string(),
            columns: ColumnHeaders::default(),
        }
    }
}

impl Default for ColumnHeaders {
    fn default() -> Self {
        Self {
            formation_time: COLUMN_FORMATION_TIME.to_string(),
            death_time: COLUMN_DEATH_TIME.to_string(),
            formation_coords: COLUMN_FORMATION_COORDS.to_string(),
            radius: COLUMN_RADIUS.to_string(),
            death_coords: COLUMN_DEATH_COORDS.to_string(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl ColumnHeaders {
    /// Headers in table order
    pub fn as_array(&self) -> [&str; 5] {
        [
            &self.formation_time,
            &self.death_time,
            &self.formation_coords,
            &self.radius,
            &self.death_coords,
        ]
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("Failed to read config file {}", path.display()),
                e,
            )
        })?;

        let config: Config = serde_json::from_str(&content).map_err(|e| {
            Error::serialization(
                format!("Failed to parse config file {}", path.display()),
                e,
            )
        })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from a file when given, otherwise use defaults; always validated
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Create configuration with custom worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.ingestion.workers = workers;
        self
    }

    /// Create configuration with a custom naming template
    pub fn with_name_template(mut self, template: impl Into<String>) -> Self {
        self.ingestion.name_template = template.into();
        self
    }

    /// Create configuration with custom column headers
    pub fn with_columns(mut self, columns: ColumnHeaders) -> Self {
        self.ingestion.columns = columns;
        self
    }

    /// Create configuration with a snapshot location
    pub fn with_snapshot_path(mut self, path: PathBuf) -> Self {
        self.storage.snapshot_path = Some(path);
        self
    }

    /// Resolved snapshot location
    pub fn snapshot_path(&self) -> PathBuf {
        self.storage.snapshot_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DATA_DIR_NAME)
                .join(SNAPSHOT_FILE_NAME)
        })
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<()> {
        if self.ingestion.workers == 0 {
            return Err(Error::configuration(
                "Number of workers must be greater than 0",
            ));
        }

        if !self
            .ingestion
            .name_template
            .contains(NAME_TEMPLATE_PLACEHOLDER)
        {
            return Err(Error::configuration(format!(
                "Name template '{}' must contain {}",
                self.ingestion.name_template, NAME_TEMPLATE_PLACEHOLDER
            )));
        }

        let mut seen = HashSet::new();
        for header in self.ingestion.columns.as_array() {
            let header = header.trim();
            if header.is_empty() {
                return Err(Error::configuration("Column headers cannot be empty"));
            }
            if !seen.insert(header) {
                return Err(Error::configuration(format!(
                    "Column header '{}' is mapped more than once",
                    header
                )));
            }
        }

        if self.query.default_page_size == 0 || self.query.max_page_size == 0 {
            return Err(Error::configuration("Page sizes must be greater than 0"));
        }

        if self.query.default_page_size > self.query.max_page_size {
            return Err(Error::configuration(format!(
                "Default page size {} exceeds maximum {}",
                self.query.default_page_size, self.query.max_page_size
            )));
        }

        Ok(())
    }
}

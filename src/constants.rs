//! Application constants for the PMC ingestion service
//!
//! This module contains the fixed CSV column headers, the semantic parameter
//! names they map to, and the default values used throughout the crate.

// =============================================================================
// CSV Columns
// =============================================================================

/// Default header of the formation timestamp column
pub const COLUMN_FORMATION_TIME: &str = "formation_time";

/// Default header of the dissolution timestamp column
pub const COLUMN_DEATH_TIME: &str = "death_time";

/// Default header of the formation coordinates column
pub const COLUMN_FORMATION_COORDS: &str = "formation_coords";

/// Default header of the radius column
pub const COLUMN_RADIUS: &str = "radius";

/// Default header of the dissolution coordinates column
pub const COLUMN_DEATH_COORDS: &str = "death_coords";

/// Field delimiter used by uploaded CSV files
pub const CSV_DELIMITER: char = ',';

/// Quote character used by uploaded CSV files
pub const CSV_QUOTE: char = '"';

// =============================================================================
// Parameter Names
// =============================================================================

/// Semantic parameter names written for each ingested row
pub mod param_names {
    pub const FORMATION_TIME: &str = "Formation date/time";
    pub const DISSOLUTION_TIME: &str = "Dissolution date/time";
    pub const FORMATION_COORDS: &str = "Formation coordinates";
    pub const RADIUS: &str = "Radius";
    pub const DISSOLUTION_COORDS: &str = "Dissolution coordinates";
}

// =============================================================================
// Ingestion Defaults
// =============================================================================

/// Placeholder substituted with the formation timestamp in the naming template
pub const NAME_TEMPLATE_PLACEHOLDER: &str = "{formation}";

/// Default template used to derive a PMC name from a CSV row
pub const DEFAULT_NAME_TEMPLATE: &str = "PMC {formation}";

/// Upper bound for the default number of concurrent row workers
pub const DEFAULT_PARALLEL_WORKERS: usize = 8;

// =============================================================================
// Query Defaults
// =============================================================================

/// Page number used when the caller does not provide one
pub const DEFAULT_PAGE: usize = 1;

/// Page size used when the caller does not provide one
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: usize = 100;

// =============================================================================
// Storage Defaults
// =============================================================================

/// Directory under the user data dir holding the snapshot store
pub const DATA_DIR_NAME: &str = "pmc-ingest";

/// File name of the JSON snapshot store
pub const SNAPSHOT_FILE_NAME: &str = "store.json";

/// Progress bar template used by the CLI
pub const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

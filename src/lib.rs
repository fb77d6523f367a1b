//! PMC Ingestion Library
//!
//! A Rust library for loading meteorological cyclone ("PMC") records and
//! their time-series parameters from uploaded CSV files, and for listing
//! them through whitelisted declarative filters.
//!
//! This library provides tools for:
//! - Parsing RFC 4180 style CSV text into header-keyed rows
//! - Mapping the fixed CSV columns onto typed PMC parameters
//! - Idempotent, concurrent ingestion with per-item failure reporting
//! - Translating `(field, condition, value)` filters into storage predicates
//! - Paginated listings over any storage backend implementing [`Storage`]

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod catalog;
        pub mod csv_parser;
        pub mod field_mapper;
        pub mod filter;
        pub mod ingestion;
        pub mod query;
    }
    pub mod adapters {
        pub mod memory_store;
        pub mod storage;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::adapters::memory_store::MemoryStore;
pub use app::adapters::storage::{Storage, StorageError};
pub use app::models::{EntityId, NewParam, Param, ParamType, Pmc};
pub use config::Config;

/// Result type alias for the PMC ingestion service
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for parsing, validation, ingestion and query operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed CSV structure; fatal to the whole ingestion call
    #[error("CSV parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Invalid request content, naming the offending field
    #[error("Validation error for '{field}': {message}")]
    Validation { field: String, message: String },

    /// A PMC with the same name already exists
    #[error("PMC named '{name}' already exists")]
    Conflict { name: String },

    /// A storage write failed
    #[error("Storage write failed: {message}")]
    Write { message: String },

    /// Referenced entity does not exist
    #[error("{entity} not found: id = {id}")]
    NotFound { entity: &'static str, id: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failed
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create a CSV parse error for a given line
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create a validation error naming the offending field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a name conflict error
    pub fn conflict(name: impl Into<String>) -> Self {
        Self::Conflict { name: name.into() }
    }

    /// Create a storage write error
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }

    /// Create a not found error for an entity kind
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a serialization error with context
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Whether this error is a request validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON processing failed".to_string(),
            source: error,
        }
    }
}

impl From<StorageError> for Error {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Conflict { name } => Self::Conflict { name },
            StorageError::NotFound { entity, id } => Self::NotFound { entity, id },
            StorageError::Backend { message } => Self::Write { message },
        }
    }
}

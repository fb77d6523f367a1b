//! CSV parser for uploaded PMC track files
//!
//! This module turns raw upload text into an ordered sequence of rows keyed
//! by the header line. Quoting follows RFC 4180: a quoted field may contain
//! delimiters and line breaks verbatim, and a doubled quote decodes to one.
//!
//! ## Architecture
//!
//! - [`tokenizer`] - Character-level record splitting with line tracking
//! - [`reader`] - Header handling, blank-line skipping and row width policy
//!
//! ## Usage
//!
//! ```rust
//! use pmc_ingest::app::services::csv_parser::parse_csv;
//!
//! # fn example() -> pmc_ingest::Result<()> {
//! let rows = parse_csv("name,radius\n\"PMC, north\",300\n")?;
//! assert_eq!(rows[0].get("name"), Some("PMC, north"));
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod tokenizer;

#[cfg(test)]
mod tests;

pub use reader::{CsvReader, CsvRow, decode_upload, parse_csv};
pub use tokenizer::{RawRecord, Tokenizer};

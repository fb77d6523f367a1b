//! Header-keyed CSV rows
//!
//! The first non-blank record is the header. Each following non-blank record
//! becomes a [`CsvRow`] with exactly one value per header: missing trailing
//! values read as empty strings and surplus values are dropped.

use std::sync::Arc;
use tracing::debug;

use super::tokenizer::Tokenizer;
use crate::{Error, Result};

/// A data row keyed by the header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based line on which the row starts
    pub line: usize,
    headers: Arc<[String]>,
    values: Vec<String>,
}

impl CsvRow {
    /// Value under `header`, if the header exists
    pub fn get(&self, header: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h == header)
            .map(|index| self.values[index].as_str())
    }

    /// `(header, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Lazy, single-pass reader yielding [`CsvRow`]s
pub struct CsvReader<'a> {
    tokenizer: Tokenizer<'a>,
    headers: Arc<[String]>,
}

impl<'a> CsvReader<'a> {
    /// Read the header line and prepare to stream data rows
    pub fn new(text: &'a str) -> Result<Self> {
        let mut tokenizer = Tokenizer::new(text);
        let mut headers: Vec<String> = Vec::new();

        for record in tokenizer.by_ref() {
            let record = record?;
            if !record.blank {
                headers = record.fields;
                break;
            }
        }

        debug!("CSV header: {:?}", headers);

        Ok(Self {
            tokenizer,
            headers: headers.into(),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Iterator for CsvReader<'_> {
    type Item = Result<CsvRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.tokenizer.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e)),
            };

            if record.blank {
                continue;
            }

            let mut values = record.fields;
            if values.len() != self.headers.len() {
                debug!(
                    "Line {} has {} values for {} headers",
                    record.line,
                    values.len(),
                    self.headers.len()
                );
                values.resize(self.headers.len(), String::new());
            }

            return Some(Ok(CsvRow {
                line: record.line,
                headers: Arc::clone(&self.headers),
                values,
            }));
        }
    }
}

/// Parse the whole text; any malformed record fails the entire parse
pub fn parse_csv(text: &str) -> Result<Vec<CsvRow>> {
    CsvReader::new(text)?.collect()
}

/// Decode uploaded bytes as UTF-8, dropping a leading byte order mark
pub fn decode_upload(bytes: &[u8]) -> Result<&str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    std::str::from_utf8(bytes).map_err(|e| {
        let valid = &bytes[..e.valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        Error::parse(line, "Upload is not valid UTF-8")
    })
}

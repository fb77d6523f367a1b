//! Character-level CSV record splitting
//!
//! Records are produced one at a time; the tokenizer never looks further
//! ahead than the record it is building.

use std::iter::Peekable;
use std::str::Chars;

use crate::constants::{CSV_DELIMITER, CSV_QUOTE};
use crate::{Error, Result};

/// One physical CSV record before header mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line on which the record starts
    pub line: usize,
    /// Decoded and trimmed field values
    pub fields: Vec<String>,
    /// True for whitespace-only lines
    pub blank: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldEnd {
    Delimiter,
    Record,
    Eof,
}

/// Lazy record iterator over CSV text
pub struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
            finished: false,
        }
    }

    /// Read one field, returning its decoded value, whether it was quoted and what ended it
    fn read_field(&mut self) -> Result<(String, bool, FieldEnd)> {
        let mut value = String::new();

        while let Some(&c) = self.chars.peek() {
            if c == ' ' || c == '\t' {
                self.chars.next();
            } else {
                break;
            }
        }

        let quoted = self.chars.peek() == Some(&CSV_QUOTE);
        if quoted {
            let open_line = self.line;
            self.chars.next();

            loop {
                match self.chars.next() {
                    None => {
                        return Err(Error::parse(open_line, "Unterminated quoted field"));
                    }
                    Some(c) if c == CSV_QUOTE => {
                        if self.chars.peek() == Some(&CSV_QUOTE) {
                            self.chars.next();
                            value.push(CSV_QUOTE);
                        } else {
                            break;
                        }
                    }
                    Some('\n') => {
                        self.line += 1;
                        value.push('\n');
                    }
                    Some(c) => value.push(c),
                }
            }
        }

        // Unquoted content, or anything trailing a closing quote, is taken literally
        let end = loop {
            match self.chars.next() {
                None => break FieldEnd::Eof,
                Some(c) if c == CSV_DELIMITER => break FieldEnd::Delimiter,
                Some('\n') => {
                    self.line += 1;
                    break FieldEnd::Record;
                }
                Some('\r') if self.chars.peek() == Some(&'\n') => {
                    self.chars.next();
                    self.line += 1;
                    break FieldEnd::Record;
                }
                Some(c) => value.push(c),
            }
        };

        Ok((value.trim().to_string(), quoted, end))
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.chars.peek().is_none() {
            self.finished = true;
            return None;
        }

        let line = self.line;
        let mut fields = Vec::new();
        let mut any_quoted = false;

        loop {
            match self.read_field() {
                Ok((value, quoted, end)) => {
                    any_quoted |= quoted;
                    fields.push(value);
                    if end != FieldEnd::Delimiter {
                        break;
                    }
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }

        let blank = !any_quoted && fields.len() == 1 && fields[0].is_empty();
        Some(Ok(RawRecord {
            line,
            fields,
            blank,
        }))
    }
}

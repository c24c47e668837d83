//! Query engine — dotted references, lookup and dump
//!
//! A reference is written `section.key`, with optional whitespace around the
//! dot and at both ends. References address the most recent definition of a
//! key; the dump walks the document in parse order.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use log::{debug, info};

use crate::error::{LookupError, ReferenceError};
use crate::{is_identifier, is_identifier_char, Document, Error, Record, Result};

/// A parsed `section.key` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub section: String,
    pub key: String,
}

impl Reference {
    pub fn new(section: impl Into<String>, key: impl Into<String>) -> Self {
        Reference {
            section: section.into(),
            key: key.into(),
        }
    }

    /// Parse a reference that must span the whole input
    ///
    /// # Errors
    /// Returns `Reference` if the dot is missing, either half is not an
    /// identifier, or anything but whitespace follows the key.
    pub fn parse(input: &str) -> Result<Self> {
        let (reference, rest) = Self::parse_prefix(input)?;
        if !rest.is_empty() {
            return Err(Error::reference(
                input,
                ReferenceError::TrailingInput(rest.to_string()),
            ));
        }
        Ok(reference)
    }

    /// Parse a reference at the start of `input`
    ///
    /// The section runs up to the first whitespace or `.`; the key is the run
    /// of identifier characters after the dot. Returns the reference and the
    /// remaining input with leading whitespace skipped.
    pub fn parse_prefix(input: &str) -> Result<(Self, &str)> {
        let rest = input.trim_start();
        let section_end = rest
            .find(|c: char| c.is_whitespace() || c == '.')
            .unwrap_or(rest.len());
        let (section, rest) = rest.split_at(section_end);

        let Some(rest) = rest.trim_start().strip_prefix('.') else {
            return Err(Error::reference(input, ReferenceError::MissingDot));
        };
        if !is_identifier(section) {
            return Err(Error::reference(
                input,
                ReferenceError::InvalidSection(section.to_string()),
            ));
        }

        let rest = rest.trim_start();
        let key_end = rest
            .find(|c: char| !is_identifier_char(c))
            .unwrap_or(rest.len());
        let (key, rest) = rest.split_at(key_end);
        if key.is_empty() {
            let found: String = rest.split_whitespace().next().unwrap_or_default().to_string();
            return Err(Error::reference(input, ReferenceError::InvalidKey(found)));
        }

        Ok((Reference::new(section, key), rest.trim_start()))
    }
}

impl FromStr for Reference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Reference::parse(s)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.key)
    }
}

/// Resolve a reference to the most recent matching record
///
/// # Errors
/// `KeyNotFound` when the section exists but lacks the key, otherwise
/// `SectionNotFound`.
pub fn lookup<'a>(
    document: &'a Document,
    reference: &Reference,
) -> std::result::Result<&'a Record, LookupError> {
    if let Some(record) = document.find(&reference.section, &reference.key) {
        debug!("Found {} = \"{}\"", reference, record.value);
        return Ok(record);
    }

    if document.has_section(&reference.section) {
        Err(LookupError::KeyNotFound {
            section: reference.section.clone(),
            key: reference.key.clone(),
        })
    } else {
        Err(LookupError::SectionNotFound {
            section: reference.section.clone(),
            key: reference.key.clone(),
        })
    }
}

/// Single-key mode: parse `input` as a reference and return its value
///
/// # Errors
/// `Reference` for a malformed reference, `NotFound` when nothing matches.
pub fn value_of<'a>(document: &'a Document, input: &str) -> Result<&'a str> {
    let reference = Reference::parse(input)?;
    let record = lookup(document, &reference)?;
    Ok(&record.value)
}

/// Write every record as `section.key = value`, in parse order
///
/// Returns the number of records written.
pub fn dump<W: Write>(document: &Document, out: &mut W) -> Result<usize> {
    for record in document {
        writeln!(out, "{}", record)?;
    }
    info!("Parsed {} variables", document.len());
    Ok(document.len())
}

/// Write the records as a pretty-printed JSON array, in parse order
pub fn dump_json<W: Write>(document: &Document, out: &mut W) -> Result<usize> {
    serde_json::to_writer_pretty(&mut *out, document).map_err(std::io::Error::from)?;
    writeln!(out)?;
    info!("Parsed {} variables", document.len());
    Ok(document.len())
}

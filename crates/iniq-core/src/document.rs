//! Document store — ordered `(section, key, value)` records
//!
//! Records are appended in parse order and never modified. Iteration yields
//! that order; [`Document::find`] scans from the end so the most recent
//! definition of a key shadows earlier ones.

use std::fmt;

/// One parsed assignment
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    /// Enclosing section; empty for keys that precede every header
    pub section: String,
    pub key: String,
    /// Trimmed value, possibly empty
    pub value: String,
}

impl Record {
    pub fn new(
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Record {
            section: section.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} = {}", self.section, self.key, self.value)
    }
}

/// All records of one input, in parse order
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Document {
    records: Vec<Record>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record; it shadows any earlier record with the same section and key
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in parse order
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Most recently parsed record for `section` and `key`
    pub fn find(&self, section: &str, key: &str) -> Option<&Record> {
        self.records
            .iter()
            .rev()
            .find(|r| r.section == section && r.key == key)
    }

    /// Whether any record belongs to `section`
    pub fn has_section(&self, section: &str) -> bool {
        self.records.iter().any(|r| r.section == section)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<Record> for Document {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Document {
            records: iter.into_iter().collect(),
        }
    }
}

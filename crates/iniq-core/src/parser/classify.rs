//! Line classifier — decides what kind of line the parser is looking at
//!
//! Only the first significant character matters: leading spaces and tabs
//! are skipped by the caller, everything after that character is the
//! parser's business.

use log::warn;

/// Syntactic category of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Whitespace or an unrecognised leading character
    Ignore,
    /// `[name]`
    SectionHeader,
    /// `; ...` or `# ...`
    Comment,
    /// `key = value`
    Assignment,
}

/// Classify a line by its first non-whitespace character
pub fn classify(first: char) -> LineKind {
    match first {
        c if c.is_whitespace() => LineKind::Ignore,
        ';' | '#' => LineKind::Comment,
        '[' => LineKind::SectionHeader,
        c if crate::is_identifier_char(c) => LineKind::Assignment,
        c => {
            warn!("Unclassified character '{}' (U+{:04X}), line ignored", c.escape_debug(), c as u32);
            LineKind::Ignore
        }
    }
}

/// Strip the spaces and tabs that precede the first significant character
pub fn skip_indent(line: &str) -> &str {
    line.trim_start_matches([' ', '\t'])
}

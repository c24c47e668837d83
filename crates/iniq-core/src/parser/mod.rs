//! INI parser — turns classified lines into document records
//!
//! The parser is an explicit context object: it holds the current section
//! and the document being built, and is fed one line at a time. It has two
//! states, [`ParseState::NoSection`] (initial) and [`ParseState::InSection`];
//! only a successfully parsed section header moves between them.
//!
//! Every syntax error is fatal for the whole parse and carries the line
//! number of the offending line.

pub mod classify;

use std::io::Read;

use log::{debug, info, trace, warn};

use crate::error::SyntaxError;
use crate::reader::{self, LineReader, Source};
use crate::{is_identifier, Document, Error, Record, Result};

pub use classify::{classify, LineKind};

/// Section cursor of the parser
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParseState {
    /// No header seen yet; assignments go to the empty-named section
    #[default]
    NoSection,
    InSection(String),
}

impl ParseState {
    /// Name records are attached to in this state
    pub fn section(&self) -> &str {
        match self {
            ParseState::NoSection => "",
            ParseState::InSection(name) => name,
        }
    }
}

/// Parser context: current section plus the records parsed so far
#[derive(Debug, Default)]
pub struct Parser {
    state: ParseState,
    document: Document,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ParseState {
        &self.state
    }

    /// Parse one line of input
    ///
    /// # Errors
    /// Returns `Syntax` with `number` as the line for a malformed header,
    /// a malformed assignment or an invalid identifier.
    pub fn parse_line(&mut self, number: usize, text: &str) -> Result<()> {
        let significant = classify::skip_indent(text);
        let Some(first) = significant.chars().next() else {
            trace!("line {}: blank", number);
            return Ok(());
        };

        match classify(first) {
            LineKind::Ignore => trace!("line {}: ignored", number),
            LineKind::Comment => trace!("line {}: comment", number),
            LineKind::SectionHeader => {
                let name = parse_section_header(text).map_err(|kind| Error::syntax(number, kind))?;
                debug!("line {}: section [{}]", number, name);
                self.state = ParseState::InSection(name);
            }
            LineKind::Assignment => {
                let (key, value) =
                    parse_assignment(text).map_err(|kind| Error::syntax(number, kind))?;
                debug!(
                    "line {}: {}.{} = \"{}\"",
                    number,
                    self.state.section(),
                    key,
                    value
                );
                self.document
                    .push(Record::new(self.state.section(), key, value));
            }
        }
        Ok(())
    }

    /// Consume the parser and return the finished document
    pub fn finish(self) -> Document {
        self.document
    }
}

/// Parse a section header line into its trimmed name
///
/// The line must hold exactly one `[` and one `]`, in that order, and be at
/// least three characters long. Text after `]` is ignored with a warning.
pub fn parse_section_header(line: &str) -> std::result::Result<String, SyntaxError> {
    if line.chars().count() < 3 {
        return Err(SyntaxError::LineTooShort);
    }
    let open = line.find('[').ok_or(SyntaxError::MissingOpenBracket)?;
    let close = line.rfind(']').ok_or(SyntaxError::MissingCloseBracket)?;
    if line.rfind('[') != Some(open) {
        return Err(SyntaxError::DuplicateOpenBracket);
    }
    if line.find(']') != Some(close) {
        return Err(SyntaxError::DuplicateCloseBracket);
    }
    if close < open {
        return Err(SyntaxError::MisplacedCloseBracket);
    }

    let name = line[open + 1..close].trim();
    if !is_identifier(name) {
        return Err(SyntaxError::InvalidSectionName(name.to_string()));
    }

    let trailing = line[close + 1..].trim();
    if !trailing.is_empty() {
        warn!("Ignoring text after section header [{}]: \"{}\"", name, trailing);
    }
    Ok(name.to_string())
}

/// Split an assignment line at its first `=` into a validated key and a value
///
/// Both halves are trimmed; the value may be empty and may contain `=`.
pub fn parse_assignment(line: &str) -> std::result::Result<(String, String), SyntaxError> {
    if line.chars().count() < 3 {
        return Err(SyntaxError::LineTooShort);
    }
    let (key, value) = line.split_once('=').ok_or(SyntaxError::MissingEquals)?;

    let key = key.trim();
    if !is_identifier(key) {
        return Err(SyntaxError::InvalidKey(key.to_string()));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Parse every line a reader yields
pub fn parse_reader<R: Read>(mut lines: LineReader<R>) -> Result<Document> {
    let mut parser = Parser::new();
    while let Some(line) = lines.next_line()? {
        parser.parse_line(line.number, &line.text)?;
    }
    info!("Read {} lines", lines.lines_read());
    Ok(parser.finish())
}

/// Parse INI text held in memory
pub fn parse_str(text: &str) -> Result<Document> {
    parse_reader(LineReader::new(text.as_bytes()))
}

/// Open a file (or stdin) and parse it
pub fn parse_source(source: &Source) -> Result<Document> {
    debug!("Reading {}", source);
    parse_reader(reader::open(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Document {
        parse_str(input).unwrap()
    }

    fn parse_err(input: &str) -> Error {
        parse_str(input).unwrap_err()
    }

    fn entries(doc: &Document) -> Vec<(String, String, String)> {
        doc.iter()
            .map(|r| (r.section.clone(), r.key.clone(), r.value.clone()))
            .collect()
    }

    fn entry(section: &str, key: &str, value: &str) -> (String, String, String) {
        (section.into(), key.into(), value.into())
    }

    // ── Section headers ────────────────────────────────

    #[test]
    fn test_section_header_trims_name() {
        assert_eq!(parse_section_header("[  server ]").unwrap(), "server");
        assert_eq!(parse_section_header("\t[a-1]").unwrap(), "a-1");
    }

    #[test]
    fn test_section_header_errors() {
        assert_eq!(parse_section_header("[]"), Err(SyntaxError::LineTooShort));
        assert_eq!(parse_section_header("[abc"), Err(SyntaxError::MissingCloseBracket));
        assert_eq!(parse_section_header("[[a]"), Err(SyntaxError::DuplicateOpenBracket));
        assert_eq!(parse_section_header("[a]]"), Err(SyntaxError::DuplicateCloseBracket));
        assert_eq!(parse_section_header("]a["), Err(SyntaxError::MisplacedCloseBracket));
        assert_eq!(parse_section_header("abc]"), Err(SyntaxError::MissingOpenBracket));
    }

    #[test]
    fn test_section_header_invalid_names() {
        for (line, name) in [
            ("[a_b]", "a_b"),
            ("[a.b]", "a.b"),
            ("[a b]", "a b"),
            ("[   ]", ""),
        ] {
            assert_eq!(
                parse_section_header(line),
                Err(SyntaxError::InvalidSectionName(name.into())),
                "line {:?}",
                line
            );
        }
    }

    #[test]
    fn test_section_header_trailing_text_ignored() {
        assert_eq!(parse_section_header("[a] ; note").unwrap(), "a");
    }

    // ── Assignments ────────────────────────────────────

    #[test]
    fn test_assignment_trims_both_sides() {
        assert_eq!(
            parse_assignment("  key  =  some value  ").unwrap(),
            ("key".to_string(), "some value".to_string())
        );
    }

    #[test]
    fn test_assignment_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("url=a=b=c").unwrap(),
            ("url".to_string(), "a=b=c".to_string())
        );
    }

    #[test]
    fn test_assignment_empty_value() {
        assert_eq!(
            parse_assignment("key=").unwrap(),
            ("key".to_string(), String::new())
        );
    }

    #[test]
    fn test_assignment_errors() {
        assert_eq!(parse_assignment("a="), Err(SyntaxError::LineTooShort));
        assert_eq!(parse_assignment("key value"), Err(SyntaxError::MissingEquals));
        assert_eq!(
            parse_assignment("snake_case = 1"),
            Err(SyntaxError::InvalidKey("snake_case".into()))
        );
        assert_eq!(
            parse_assignment("two words = 1"),
            Err(SyntaxError::InvalidKey("two words".into()))
        );
        assert_eq!(
            parse_assignment("a.b = 1"),
            Err(SyntaxError::InvalidKey("a.b".into()))
        );
    }

    // ── State machine ──────────────────────────────────

    #[test]
    fn test_state_transitions() {
        let mut parser = Parser::new();
        assert_eq!(parser.state(), &ParseState::NoSection);

        parser.parse_line(1, "[one]").unwrap();
        assert_eq!(parser.state(), &ParseState::InSection("one".into()));

        parser.parse_line(2, "k=v").unwrap();
        parser.parse_line(3, "; [two]").unwrap();
        assert_eq!(parser.state().section(), "one");

        parser.parse_line(4, "[two]").unwrap();
        assert_eq!(parser.state().section(), "two");
        assert_eq!(parser.finish().len(), 1);
    }

    #[test]
    fn test_failed_header_keeps_section() {
        let mut parser = Parser::new();
        parser.parse_line(1, "[one]").unwrap();
        assert!(parser.parse_line(2, "[bad name]").is_err());
        assert_eq!(parser.state().section(), "one");
    }

    #[test]
    fn test_keys_before_first_header_use_empty_section() {
        let doc = parse("top=1\n[s]\nk=2\n");
        assert_eq!(entries(&doc), vec![entry("", "top", "1"), entry("s", "k", "2")]);
    }

    // ── Whole documents ────────────────────────────────

    #[test]
    fn test_parse_document_in_order() {
        let input = "\
; comment
# another comment
[server]
host = localhost
  port=8080

[client]
\tretries = 3
[server]
port = 9090
";
        let doc = parse(input);
        assert_eq!(
            entries(&doc),
            vec![
                entry("server", "host", "localhost"),
                entry("server", "port", "8080"),
                entry("client", "retries", "3"),
                entry("server", "port", "9090"),
            ]
        );
    }

    #[test]
    fn test_unclassified_and_blank_lines_ignored() {
        let doc = parse("[a]\n   \n@weird line\n=oops\nk=v\n");
        assert_eq!(entries(&doc), vec![entry("a", "k", "v")]);
    }

    #[test]
    fn test_syntax_error_reports_line_number() {
        match parse_err("[a]\nk=v\n\nbroken line\n") {
            Error::Syntax { line, kind } => {
                assert_eq!(line, 4);
                assert_eq!(kind, SyntaxError::MissingEquals);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_section_is_fatal() {
        let err = parse_err("[ok]\n[not_ok]\nk=v\n");
        assert!(err.to_string().contains("invalid section name \"not_ok\""));
    }

    #[test]
    fn test_latin1_comment_keeps_document() {
        let doc = parse_reader(LineReader::new(&b"; caf\xe9 settings\n[a]\nk=v\n"[..])).unwrap();
        assert_eq!(entries(&doc), vec![entry("a", "k", "v")]);
    }

    #[test]
    fn test_latin1_value_is_kept_with_replacement() {
        let doc = parse_reader(LineReader::new(&b"[a]\nk=caf\xe9\n"[..])).unwrap();
        assert_eq!(entries(&doc), vec![entry("a", "k", "caf\u{fffd}")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n; only comments\n").is_empty());
    }

    #[test]
    fn test_parse_source_missing_file() {
        let err = parse_source(&Source::File("no/such/file.ini".into())).unwrap_err();
        assert!(matches!(err, Error::Open { .. }));
    }
}

//! iniq core - streaming INI parser and query engine
//!
//! Reads INI text line by line, builds an ordered document of
//! `(section, key, value)` records and answers queries against it.
//!
//! # Architecture
//!
//! ```text
//! File / stdin → LineReader → classify → Parser → Document
//!                                                    ↑
//!                              query (dump, lookup) ─┤
//!                              eval (REF OP REF)  ───┘
//! ```
//!
//! # Guarantees
//!
//! - **Streaming**: input is read once, one line at a time, with no limit
//!   on line length
//! - **Ordered**: dump lists records in the order they were parsed
//! - **Last write wins**: lookups return the most recent definition of a key
//! - **Typed failures**: every error is a variant of [`Error`], nothing exits
//!   the process from inside the library

pub mod document;
pub mod error;
pub mod eval;
pub mod parser;
pub mod query;
pub mod reader;

pub use document::{Document, Record};
pub use error::{Error, Result};
pub use eval::{evaluate, Evaluation, Expression, Operator, Value};
pub use parser::{parse_reader, parse_source, parse_str, Parser};
pub use query::{lookup, Reference};
pub use reader::{Line, LineReader, Source};

/// Check the identifier grammar shared by section names, keys and references:
/// non-empty, ASCII alphanumerics and `-` only.
pub fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_identifier_char)
}

/// Characters allowed inside an identifier
pub(crate) fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_accepts_alnum_and_hyphen() {
        assert!(is_identifier("server"));
        assert!(is_identifier("Port8080"));
        assert!(is_identifier("max-connections"));
        assert!(is_identifier("-"));
        assert!(is_identifier("42"));
    }

    #[test]
    fn test_identifier_rejects_other_characters() {
        assert!(!is_identifier(""));
        assert!(!is_identifier("snake_case"));
        assert!(!is_identifier("a.b"));
        assert!(!is_identifier("two words"));
        assert!(!is_identifier(" padded"));
        assert!(!is_identifier("tab\t"));
        assert!(!is_identifier("zażółć"));
    }

    #[test]
    fn test_identifier_char_matches_identifier() {
        for c in ['a', 'Z', '0', '-', '_', '.', ' ', 'é'] {
            assert_eq!(is_identifier_char(c), is_identifier(&c.to_string()));
        }
    }

    #[test]
    fn test_end_to_end_duplicate_section() {
        let doc = parse_str("[server]\nhost=localhost\nport=8080\n[server]\nport=9090\n").unwrap();
        let port = lookup(&doc, &"server.port".parse().unwrap()).unwrap();
        assert_eq!(port.value, "9090");

        let expr: Expression = "server.port+server.port".parse().unwrap();
        let result = evaluate(&doc, &expr).unwrap();
        assert_eq!(result.value, Value::Integer(18180));
    }

    #[test]
    fn test_parse_determinism_100_iterations() {
        let input = "; settings\n[a]\nx = 1\n[b-2]\ny=two words \n[a]\nx=3\n";
        let first = parse_str(input).unwrap();
        for i in 0..100 {
            let doc = parse_str(input).unwrap();
            assert_eq!(first, doc, "Non-determinism at iteration {}", i);
        }
    }
}

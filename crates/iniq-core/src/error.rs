//! Error types for iniq
//!
//! All fallible operations return `Result<T, Error>`.
//! Each variant carries enough context to print a diagnostic without
//! consulting the input again.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::eval::Operator;

/// iniq error types
#[derive(Debug, Error)]
pub enum Error {
    /// The input file could not be opened
    #[error("failed to open '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from the input (or writing results) failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed section header, assignment or identifier
    #[error("line {line}: {kind}")]
    Syntax { line: usize, kind: SyntaxError },

    /// A dotted `section.key` reference could not be parsed
    #[error("invalid reference \"{input}\": {kind}")]
    Reference { input: String, kind: ReferenceError },

    /// A single-key lookup found nothing
    #[error("{0}")]
    NotFound(#[from] LookupError),

    /// One or both expression operands could not be resolved
    #[error("{0}")]
    Unresolved(#[from] Unresolved),

    /// Operand types or values do not support the operator
    #[error("{0}")]
    Evaluation(#[from] EvalError),
}

/// Result type alias for iniq operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a line was rejected by the parser
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("line is too short")]
    LineTooShort,

    #[error("'[' expected")]
    MissingOpenBracket,

    #[error("']' expected")]
    MissingCloseBracket,

    #[error("'[' appears more than once")]
    DuplicateOpenBracket,

    #[error("']' appears more than once")]
    DuplicateCloseBracket,

    #[error("']' appears before '['")]
    MisplacedCloseBracket,

    #[error("invalid section name \"{0}\"")]
    InvalidSectionName(String),

    #[error("'=' expected")]
    MissingEquals,

    #[error("invalid key name \"{0}\"")]
    InvalidKey(String),
}

/// Why a dotted reference was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("expected '.' between section and key")]
    MissingDot,

    #[error("invalid section name \"{0}\"")]
    InvalidSection(String),

    #[error("invalid key name \"{0}\"")]
    InvalidKey(String),

    #[error("unexpected trailing input \"{0}\"")]
    TrailingInput(String),

    #[error("expected one of '+', '-', '*', '/' after the first reference")]
    MissingOperator,

    #[error("unknown operator '{0}'")]
    UnknownOperator(char),
}

/// A reference that matched no record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("section [{section}] not found")]
    SectionNotFound { section: String, key: String },

    #[error("key '{key}' not found in section [{section}]")]
    KeyNotFound { section: String, key: String },
}

/// Missing expression operands, ordered by reporting priority
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unresolved {
    #[error("neither operand could be resolved: {0}; {1}")]
    Both(LookupError, LookupError),

    #[error("left operand could not be resolved: {0}")]
    Left(LookupError),

    #[error("right operand could not be resolved: {0}")]
    Right(LookupError),
}

/// Semantic failures while applying an operator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("'{operator}' requires integer operands, but {side} not an integer (\"{left}\" {operator} \"{right}\")")]
    NonNumeric {
        operator: Operator,
        side: Side,
        left: String,
        right: String,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in {left} {operator} {right}")]
    Overflow {
        operator: Operator,
        left: i64,
        right: i64,
    },

    #[error("integer \"{0}\" is out of range")]
    OutOfRange(String),
}

/// Which operand(s) an evaluation error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Both,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Side::Left => write!(f, "the left operand is"),
            Side::Right => write!(f, "the right operand is"),
            Side::Both => write!(f, "neither operand is"),
        }
    }
}

impl Error {
    /// Attach a line number to a syntax error
    pub(crate) fn syntax(line: usize, kind: SyntaxError) -> Self {
        Error::Syntax { line, kind }
    }

    /// Attach the offending input to a reference error
    pub(crate) fn reference(input: &str, kind: ReferenceError) -> Self {
        Error::Reference {
            input: input.to_string(),
            kind,
        }
    }
}

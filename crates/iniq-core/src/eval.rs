//! Expression evaluator — `REF OP REF` over looked-up values
//!
//! An expression is two dotted references joined by one operator character.
//! The operator is whatever character ends the first reference, so it must
//! be one of `+ - * /`. Since `-` may appear inside identifiers, subtraction
//! is written with whitespace before the minus: `a.x - b.y`.
//!
//! # Typing
//!
//! Values carry no declared type. A value is an integer when it looks like
//! `-?[0-9]+`, anything else is a string:
//!
//! - `+` adds two integers and concatenates in every other case
//! - `-`, `*` and `/` need two integers
//! - `/` truncates toward zero and also reports the floating-point quotient
//!
//! Integer arithmetic is checked: overflow and division by zero are
//! evaluation errors, never panics.

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{EvalError, ReferenceError, Side, Unresolved};
use crate::query::{lookup, Reference};
use crate::{Document, Error, Result};

static INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+$").expect("valid integer pattern"));

// ── Values ────────────────────────────────────────────────

/// Type inferred from a value's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Integer,
    String,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Integer => write!(f, "Integer"),
            ValueType::String => write!(f, "String"),
        }
    }
}

/// Infer the type of a raw value
pub fn sniff(value: &str) -> ValueType {
    if INTEGER.is_match(value) {
        ValueType::Integer
    } else {
        ValueType::String
    }
}

/// Result of an evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

// ── Operators ─────────────────────────────────────────────

/// Binary operator of an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ── Expressions ───────────────────────────────────────────

/// `lhs op rhs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub lhs: Reference,
    pub op: Operator,
    pub rhs: Reference,
}

impl Expression {
    /// Parse `REF OP REF`; the whole input must be consumed
    ///
    /// # Errors
    /// Returns `Reference` for a malformed reference, a missing or unknown
    /// operator, or trailing input.
    pub fn parse(input: &str) -> Result<Self> {
        let (lhs, rest) = Reference::parse_prefix(input)?;

        let mut chars = rest.chars();
        let op = match chars.next() {
            None => return Err(Error::reference(input, ReferenceError::MissingOperator)),
            Some(c) => Operator::from_char(c)
                .ok_or_else(|| Error::reference(input, ReferenceError::UnknownOperator(c)))?,
        };

        let (rhs, rest) = Reference::parse_prefix(chars.as_str()).map_err(|err| match err {
            Error::Reference { kind, .. } => Error::reference(input, kind),
            other => other,
        })?;
        if !rest.is_empty() {
            return Err(Error::reference(
                input,
                ReferenceError::TrailingInput(rest.to_string()),
            ));
        }

        Ok(Expression { lhs, op, rhs })
    }
}

impl FromStr for Expression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Expression::parse(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}

// ── Evaluation ────────────────────────────────────────────

/// Outcome of evaluating an expression
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: Value,
    /// Floating-point quotient, only for `/`
    pub quotient: Option<f64>,
}

/// Resolve both operands of `expr` in `document` and apply the operator
///
/// # Errors
/// `Unresolved` when an operand has no record (both > left > right),
/// `Evaluation` when the operator cannot be applied to the values.
pub fn evaluate(document: &Document, expr: &Expression) -> Result<Evaluation> {
    let lhs = lookup(document, &expr.lhs);
    let rhs = lookup(document, &expr.rhs);

    let (lhs, rhs) = match (lhs, rhs) {
        (Ok(l), Ok(r)) => (l, r),
        (Err(l), Err(r)) => return Err(Unresolved::Both(l, r).into()),
        (Err(l), Ok(_)) => return Err(Unresolved::Left(l).into()),
        (Ok(_), Err(r)) => return Err(Unresolved::Right(r).into()),
    };

    debug!(
        "Evaluating \"{}\" {} \"{}\"",
        lhs.value, expr.op, rhs.value
    );
    Ok(apply(expr.op, &lhs.value, &rhs.value)?)
}

/// Apply `op` to two raw values using type sniffing
pub fn apply(op: Operator, lhs: &str, rhs: &str) -> std::result::Result<Evaluation, EvalError> {
    let types = (sniff(lhs), sniff(rhs));

    if op == Operator::Add && types != (ValueType::Integer, ValueType::Integer) {
        if types.0 != types.1 {
            warn!(
                "Concatenating {} \"{}\" with {} \"{}\"",
                types.0, lhs, types.1, rhs
            );
        }
        return Ok(Evaluation {
            value: Value::String(format!("{}{}", lhs, rhs)),
            quotient: None,
        });
    }

    let side = match types {
        (ValueType::Integer, ValueType::Integer) => None,
        (ValueType::String, ValueType::Integer) => Some(Side::Left),
        (ValueType::Integer, ValueType::String) => Some(Side::Right),
        (ValueType::String, ValueType::String) => Some(Side::Both),
    };
    if let Some(side) = side {
        return Err(EvalError::NonNumeric {
            operator: op,
            side,
            left: lhs.to_string(),
            right: rhs.to_string(),
        });
    }

    let a = parse_integer(lhs)?;
    let b = parse_integer(rhs)?;
    let overflow = || EvalError::Overflow {
        operator: op,
        left: a,
        right: b,
    };

    let (value, quotient) = match op {
        Operator::Add => (a.checked_add(b).ok_or_else(overflow)?, None),
        Operator::Sub => (a.checked_sub(b).ok_or_else(overflow)?, None),
        Operator::Mul => (a.checked_mul(b).ok_or_else(overflow)?, None),
        Operator::Div => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            let q = a.checked_div(b).ok_or_else(overflow)?;
            (q, Some(a as f64 / b as f64))
        }
    };

    Ok(Evaluation {
        value: Value::Integer(value),
        quotient,
    })
}

fn parse_integer(text: &str) -> std::result::Result<i64, EvalError> {
    text.parse()
        .map_err(|_| EvalError::OutOfRange(text.to_string()))
}

// ── Tests ─────────────────────────────────────────────────

//! Typed item values and their provenance.

use serde::{Deserialize, Serialize};

use crate::error::{DeckError, ErrorKind};

/// The declared kind of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Int,
    Double,
    String,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ValueKind::Int => "integer",
            ValueKind::Double => "double",
            ValueKind::String => "string",
        })
    }
}

/// One scalar value. The kind is fixed on construction and reads are
/// checked against it; there is no coercion between kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Double(f64),
    Str(String),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Double(_) => ValueKind::Double,
            Value::Str(_) => ValueKind::String,
        }
    }

    /// Parse a token as a value of `kind`.
    ///
    /// Integers must be a complete, optionally signed integer literal.
    /// Doubles accept integer and real literals, including Fortran `D`
    /// exponents. Strings accept anything.
    pub fn parse(kind: ValueKind, token: &str) -> Result<Value, DeckError> {
        match kind {
            ValueKind::Int => token.parse::<i64>().map(Value::Int).map_err(|_| {
                DeckError::new(
                    ErrorKind::TypeMismatch,
                    format!("could not convert '{}' to an integer", token),
                )
            }),
            ValueKind::Double => parse_double(token).map(Value::Double).ok_or_else(|| {
                DeckError::new(
                    ErrorKind::TypeMismatch,
                    format!("could not convert '{}' to a double", token),
                )
            }),
            ValueKind::String => Ok(Value::Str(token.to_string())),
        }
    }

    pub fn as_int(&self) -> Result<i64, DeckError> {
        match self {
            Value::Int(v) => Ok(*v),
            other => Err(mismatch(ValueKind::Int, other)),
        }
    }

    pub fn as_double(&self) -> Result<f64, DeckError> {
        match self {
            Value::Double(v) => Ok(*v),
            other => Err(mismatch(ValueKind::Double, other)),
        }
    }

    pub fn as_str(&self) -> Result<&str, DeckError> {
        match self {
            Value::Str(v) => Ok(v),
            other => Err(mismatch(ValueKind::String, other)),
        }
    }
}

fn mismatch(wanted: ValueKind, found: &Value) -> DeckError {
    DeckError::new(
        ErrorKind::TypeMismatch,
        format!("requested {} value from a {} item", wanted, found.kind()),
    )
}

/// Parse a numeric literal, accepting `D`/`d` as the exponent marker.
/// Textual specials such as `nan` and `inf` are rejected.
pub fn parse_double(token: &str) -> Option<f64> {
    let first = token.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '+' | '-' | '.')) {
        return None;
    }
    let normalized: String = token
        .chars()
        .map(|c| if c == 'D' || c == 'd' { 'E' } else { c })
        .collect();
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "'{}'", v),
        }
    }
}

/// Provenance of an item.
///
/// Consumers query it through [`has_value`](ValueStatus::has_value) and
/// [`defaulted`](ValueStatus::defaulted) only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueStatus {
    Uninitialized,
    DeckValue,
    EmptyDefault,
    ValidDefault,
}

impl ValueStatus {
    pub fn has_value(self) -> bool {
        matches!(self, ValueStatus::DeckValue | ValueStatus::ValidDefault)
    }

    pub fn defaulted(self) -> bool {
        matches!(self, ValueStatus::EmptyDefault | ValueStatus::ValidDefault)
    }
}

/// Types that can be read out of a [`Value`] with a checked kind.
pub trait FromValue: Sized {
    const KIND: ValueKind;

    fn from_value(value: &Value) -> Result<Self, DeckError>;
}

impl FromValue for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: &Value) -> Result<Self, DeckError> {
        value.as_int()
    }
}

impl FromValue for f64 {
    const KIND: ValueKind = ValueKind::Double;

    fn from_value(value: &Value) -> Result<Self, DeckError> {
        value.as_double()
    }
}

impl FromValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_value(value: &Value) -> Result<Self, DeckError> {
        value.as_str().map(str::to_string)
    }
}

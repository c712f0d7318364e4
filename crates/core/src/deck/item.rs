use serde::Serialize;

use ecldeck_units::Dimension;

use crate::error::{DeckError, ErrorKind};
use crate::value::{FromValue, Value, ValueStatus};

/// One realized item slot: a value with its provenance and, for
/// dimensioned items, the SI-normalized magnitude next to the value as
/// written in deck units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckItem {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    status: ValueStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimension: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    si: Option<f64>,
}

impl DeckItem {
    /// An item read from the deck text.
    pub fn from_deck(name: impl Into<String>, value: Value) -> Self {
        DeckItem {
            name: name.into(),
            value: Some(value),
            status: ValueStatus::DeckValue,
            dimension: None,
            si: None,
        }
    }

    /// An omitted item filled from the schema default.
    pub fn valid_default(name: impl Into<String>, value: Value) -> Self {
        DeckItem {
            name: name.into(),
            value: Some(value),
            status: ValueStatus::ValidDefault,
            dimension: None,
            si: None,
        }
    }

    /// An omitted item without a default. It has no value.
    pub fn empty_default(name: impl Into<String>) -> Self {
        DeckItem {
            name: name.into(),
            value: None,
            status: ValueStatus::EmptyDefault,
            dimension: None,
            si: None,
        }
    }

    /// Attach a dimension and the SI magnitude computed with it.
    pub(crate) fn with_si(mut self, dimension: Dimension, si: f64) -> Self {
        self.dimension = Some(dimension);
        self.si = Some(si);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_value(&self) -> bool {
        self.status.has_value()
    }

    pub fn defaulted(&self) -> bool {
        self.status.defaulted()
    }

    pub fn dimension(&self) -> Option<&Dimension> {
        self.dimension.as_ref()
    }

    /// The stored value; fails with `NoValue` for an empty default.
    pub fn value(&self) -> Result<&Value, DeckError> {
        self.value.as_ref().ok_or_else(|| {
            DeckError::new(
                ErrorKind::NoValue,
                format!("item '{}' is defaulted and has no value", self.name),
            )
        })
    }

    pub fn get<T: FromValue>(&self) -> Result<T, DeckError> {
        T::from_value(self.value()?).map_err(|e| self.rename(e))
    }

    pub fn get_int(&self) -> Result<i64, DeckError> {
        self.get::<i64>()
    }

    /// The value in deck units.
    pub fn get_double(&self) -> Result<f64, DeckError> {
        self.get::<f64>()
    }

    /// The value converted to SI. Fails with `NoValue` when the item has no
    /// value or no dimension.
    pub fn get_si(&self) -> Result<f64, DeckError> {
        self.value()?;
        self.si.ok_or_else(|| {
            DeckError::new(
                ErrorKind::NoValue,
                format!("item '{}' has no dimension and no SI value", self.name),
            )
        })
    }

    pub fn get_string(&self) -> Result<String, DeckError> {
        self.get::<String>()
    }

    /// The string value without surrounding whitespace.
    pub fn get_trimmed_string(&self) -> Result<String, DeckError> {
        Ok(self.get_string()?.trim().to_string())
    }

    fn rename(&self, mut err: DeckError) -> DeckError {
        err.message = format!("item '{}': {}", self.name, err.message);
        err
    }
}

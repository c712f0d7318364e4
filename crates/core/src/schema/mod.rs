//! Declarative keyword schemas.
//!
//! A [`KeywordSchema`] describes how many records a keyword has and, per
//! record, the ordered [`ItemSchema`]s that give every token its name, kind,
//! arity, default and physical dimension.

mod json;
mod registry;

pub use registry::{SchemaRegistry, SchemaRegistryBuilder, UNIT_SYSTEM_KEYWORDS};

use crate::error::SchemaError;
use crate::lexer::is_valid_keyword_name;
use crate::value::{Value, ValueKind};

/// How many tokens an item consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemArity {
    /// Exactly one token.
    Single,
    /// Every remaining token in the record.
    All,
    /// A fixed number of tokens.
    Fixed(usize),
    /// The value of an earlier integer item in the same record.
    FromItem(String),
    /// An integer item of another keyword already in the deck.
    FromDeck { keyword: String, item: String },
}

impl ItemArity {
    pub fn is_multi(&self) -> bool {
        !matches!(self, ItemArity::Single)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemSchema {
    pub name: String,
    pub kind: ValueKind,
    /// Raw string items are kept verbatim, without repeat-count expansion.
    pub raw: bool,
    pub arity: ItemArity,
    pub default: Option<Value>,
    /// Dimension expressions, cycled over the values of a multi-valued item.
    pub dimensions: Vec<String>,
}

impl ItemSchema {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        ItemSchema {
            name: name.into(),
            kind,
            raw: false,
            arity: ItemArity::Single,
            default: None,
            dimensions: Vec::new(),
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::Int)
    }

    pub fn double(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::Double)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::String)
    }

    pub fn raw_string(name: impl Into<String>) -> Self {
        ItemSchema {
            raw: true,
            ..Self::new(name, ValueKind::String)
        }
    }

    pub fn with_arity(mut self, arity: ItemArity) -> Self {
        self.arity = arity;
        self
    }

    /// Set the default. An integer default on a `Double` item is widened.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(match (self.kind, default) {
            (ValueKind::Double, Value::Int(i)) => Value::Double(i as f64),
            (_, default) => default,
        });
        self
    }

    pub fn with_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.dimensions.push(dimension.into());
        self
    }

    /// The dimension expression for the `index`th value of this item.
    pub fn dimension_for(&self, index: usize) -> Option<&str> {
        if self.dimensions.is_empty() {
            None
        } else {
            Some(&self.dimensions[index % self.dimensions.len()])
        }
    }

    fn validate(&self, keyword: &str, earlier: &[ItemSchema]) -> Result<(), SchemaError> {
        let fail = |reason: &str| SchemaError::InvalidItem {
            keyword: keyword.to_string(),
            item: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.is_empty() {
            return Err(fail("item name is empty"));
        }
        if earlier.iter().any(|i| i.name == self.name) {
            return Err(fail("duplicate item name in record"));
        }
        if let Some(prev) = earlier.last() {
            if prev.arity == ItemArity::All {
                return Err(fail("an ALL item must be the last item of its record"));
            }
        }
        if let Some(default) = &self.default {
            if default.kind() != self.kind {
                return Err(fail("default value does not match the item type"));
            }
            if self.arity == ItemArity::All && self.kind != ValueKind::Double {
                return Err(fail(
                    "an ALL item can only carry an explicit default if it is a double",
                ));
            }
        }
        if !self.dimensions.is_empty() && self.kind != ValueKind::Double {
            return Err(fail("only double items can have a dimension"));
        }
        if self.arity == ItemArity::Single && self.dimensions.len() > 1 {
            return Err(fail("a single-valued item can only have one dimension"));
        }
        if self.raw && self.kind != ValueKind::String {
            return Err(fail("raw items must be strings"));
        }
        if let ItemArity::FromItem(driver) = &self.arity {
            match earlier.iter().find(|i| &i.name == driver) {
                Some(i) if i.kind == ValueKind::Int && i.arity == ItemArity::Single => {}
                Some(_) => return Err(fail("size item must be a single integer item")),
                None => return Err(fail("size item must appear earlier in the record")),
            }
        }
        Ok(())
    }
}

/// An ordered list of items making up one record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSchema {
    items: Vec<ItemSchema>,
}

impl RecordSchema {
    pub fn new(items: Vec<ItemSchema>) -> Self {
        RecordSchema { items }
    }

    pub fn items(&self) -> &[ItemSchema] {
        &self.items
    }

    pub fn item(&self, name: &str) -> Option<&ItemSchema> {
        self.items.iter().find(|i| i.name == name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn is_raw(&self) -> bool {
        self.items.iter().any(|i| i.raw)
    }
}

/// How the records of a keyword are delimited in the input.
#[derive(Debug, Clone, PartialEq)]
pub enum KeywordSize {
    /// Exactly n `/`-terminated records; a lone `/` is an empty record.
    Fixed(usize),
    /// Records until a lone `/`.
    SlashTerminated,
    /// Records until the next recognised keyword.
    Unknown,
    /// Record count read from an item of another keyword, plus `shift`.
    FromKeyword {
        keyword: String,
        item: String,
        shift: i64,
    },
    /// The next line, verbatim, is the only record.
    Title,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordSchema {
    pub name: String,
    pub size: KeywordSize,
    records: Vec<RecordSchema>,
    pub deck_name_regex: Option<String>,
    pub requires: Vec<String>,
    pub prohibits: Vec<String>,
}

impl KeywordSchema {
    pub fn new(name: impl Into<String>, size: KeywordSize) -> Self {
        KeywordSchema {
            name: name.into(),
            size,
            records: Vec::new(),
            deck_name_regex: None,
            requires: Vec::new(),
            prohibits: Vec::new(),
        }
    }

    pub fn with_record(mut self, record: RecordSchema) -> Self {
        self.records.push(record);
        self
    }

    pub fn with_items(self, items: Vec<ItemSchema>) -> Self {
        self.with_record(RecordSchema::new(items))
    }

    pub fn with_deck_name_regex(mut self, regex: impl Into<String>) -> Self {
        self.deck_name_regex = Some(regex.into());
        self
    }

    pub fn requiring(mut self, keyword: impl Into<String>) -> Self {
        self.requires.push(keyword.into());
        self
    }

    pub fn prohibiting(mut self, keyword: impl Into<String>) -> Self {
        self.prohibits.push(keyword.into());
        self
    }

    pub fn records(&self) -> &[RecordSchema] {
        &self.records
    }

    /// The schema for record `index`; the last record schema repeats.
    pub fn record(&self, index: usize) -> Option<&RecordSchema> {
        self.records.get(index).or_else(|| self.records.last())
    }

    /// Raw keywords are tokenized verbatim, without repeat-count expansion.
    pub fn is_raw(&self) -> bool {
        self.records.iter().any(RecordSchema::is_raw)
    }

    /// A keyword with one unbounded item named `data`, such as `PORO`.
    pub fn is_data_keyword(&self) -> bool {
        match self.records.as_slice() {
            [record] => matches!(
                record.items(),
                [item] if item.name == "data" && item.arity == ItemArity::All
            ),
            _ => false,
        }
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        let fail = |reason: &str| SchemaError::InvalidKeyword {
            keyword: self.name.clone(),
            reason: reason.to_string(),
        };

        if !is_valid_keyword_name(&self.name) {
            return Err(fail("invalid keyword name"));
        }
        if self.size != KeywordSize::Fixed(0) && self.records.is_empty() {
            return Err(fail("a keyword with records must declare items"));
        }
        if let KeywordSize::FromKeyword { keyword, item, .. } = &self.size {
            if keyword.is_empty() || item.is_empty() {
                return Err(fail("size keyword and item must be named"));
            }
        }
        for record in &self.records {
            for (idx, item) in record.items().iter().enumerate() {
                item.validate(&self.name, &record.items()[..idx])?;
            }
        }
        Ok(())
    }
}

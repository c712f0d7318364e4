//! serde shapes of the JSON keyword definition files.

use serde::Deserialize;

use super::{ItemArity, ItemSchema, KeywordSchema, KeywordSize, RecordSchema};
use crate::error::SchemaError;
use crate::value::{Value, ValueKind};

/// One document is either a single keyword definition or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum KeywordDocument {
    Many(Vec<KeywordDef>),
    One(Box<KeywordDef>),
}

impl KeywordDocument {
    pub(crate) fn into_defs(self) -> Vec<KeywordDef> {
        match self {
            KeywordDocument::Many(defs) => defs,
            KeywordDocument::One(def) => vec![*def],
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct KeywordDef {
    name: String,
    #[serde(default)]
    size: Option<SizeDef>,
    #[serde(default)]
    items: Option<Vec<ItemDef>>,
    #[serde(default)]
    records: Option<Vec<Vec<ItemDef>>>,
    #[serde(default)]
    data: Option<DataDef>,
    #[serde(default)]
    deck_name_regex: Option<String>,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    prohibits: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SizeDef {
    Count(usize),
    Mode(String),
    FromKeyword {
        keyword: String,
        item: String,
        #[serde(default)]
        shift: i64,
    },
}

#[derive(Debug, Deserialize)]
struct ItemDef {
    name: String,
    value_type: String,
    #[serde(default)]
    size_type: Option<SizeTypeDef>,
    #[serde(default)]
    default: Option<serde_json::Value>,
    #[serde(default)]
    dimension: Option<DimensionDef>,
}

// FromDeck must be tried before FromItem: both carry an "item" key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SizeTypeDef {
    Mode(String),
    Fixed { fixed: usize },
    FromDeck { keyword: String, item: String },
    FromItem { item: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DimensionDef {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct DataDef {
    value_type: String,
    #[serde(default)]
    default: Option<serde_json::Value>,
    #[serde(default)]
    dimension: Option<DimensionDef>,
}

impl TryFrom<KeywordDef> for KeywordSchema {
    type Error = SchemaError;

    fn try_from(def: KeywordDef) -> Result<Self, SchemaError> {
        let keyword = def.name.clone();
        let invalid = |reason: String| SchemaError::InvalidKeyword {
            keyword: keyword.clone(),
            reason,
        };

        let declared = [def.items.is_some(), def.records.is_some(), def.data.is_some()]
            .iter()
            .filter(|d| **d)
            .count();
        if declared > 1 {
            return Err(invalid(
                "only one of items, records and data may be given".to_string(),
            ));
        }

        let mut records = Vec::new();
        if let Some(items) = def.items {
            records.push(convert_items(&keyword, items)?);
        }
        if let Some(list) = def.records {
            for items in list {
                records.push(convert_items(&keyword, items)?);
            }
        }
        let is_data = def.data.is_some();
        if let Some(data) = def.data {
            let item = convert_item(
                &keyword,
                ItemDef {
                    name: "data".to_string(),
                    value_type: data.value_type,
                    size_type: Some(SizeTypeDef::Mode("ALL".to_string())),
                    default: data.default,
                    dimension: data.dimension,
                },
            )?;
            records.push(RecordSchema::new(vec![item]));
        }

        let size = match def.size {
            Some(SizeDef::Count(n)) => KeywordSize::Fixed(n),
            Some(SizeDef::Mode(mode)) => match mode.as_str() {
                "SLASH_TERMINATED" => KeywordSize::SlashTerminated,
                "UNKNOWN" => KeywordSize::Unknown,
                other => return Err(invalid(format!("unknown size '{}'", other))),
            },
            Some(SizeDef::FromKeyword {
                keyword,
                item,
                shift,
            }) => KeywordSize::FromKeyword {
                keyword,
                item,
                shift,
            },
            None if is_data => KeywordSize::Fixed(1),
            None if records.is_empty() => KeywordSize::Fixed(0),
            None => KeywordSize::SlashTerminated,
        };

        let mut schema = KeywordSchema::new(def.name, size);
        for record in records {
            schema = schema.with_record(record);
        }
        schema.deck_name_regex = def.deck_name_regex;
        schema.requires = def.requires;
        schema.prohibits = def.prohibits;
        Ok(schema)
    }
}

fn convert_items(keyword: &str, items: Vec<ItemDef>) -> Result<RecordSchema, SchemaError> {
    items
        .into_iter()
        .map(|item| convert_item(keyword, item))
        .collect::<Result<Vec<_>, _>>()
        .map(RecordSchema::new)
}

fn convert_item(keyword: &str, def: ItemDef) -> Result<ItemSchema, SchemaError> {
    let invalid = |reason: String| SchemaError::InvalidItem {
        keyword: keyword.to_string(),
        item: def.name.clone(),
        reason,
    };

    let (kind, raw) = match def.value_type.as_str() {
        "INT" => (ValueKind::Int, false),
        "DOUBLE" => (ValueKind::Double, false),
        "STRING" => (ValueKind::String, false),
        "RAW_STRING" => (ValueKind::String, true),
        other => return Err(invalid(format!("unknown value_type '{}'", other))),
    };

    let arity = match &def.size_type {
        None => ItemArity::Single,
        Some(SizeTypeDef::Mode(mode)) => match mode.as_str() {
            "SINGLE" => ItemArity::Single,
            "ALL" => ItemArity::All,
            other => return Err(invalid(format!("unknown size_type '{}'", other))),
        },
        Some(SizeTypeDef::Fixed { fixed }) => ItemArity::Fixed(*fixed),
        Some(SizeTypeDef::FromDeck { keyword, item }) => ItemArity::FromDeck {
            keyword: keyword.clone(),
            item: item.clone(),
        },
        Some(SizeTypeDef::FromItem { item }) => ItemArity::FromItem(item.clone()),
    };

    let default = match &def.default {
        None => None,
        Some(json) => Some(json_default(kind, json).ok_or_else(|| {
            invalid(format!("default {} does not match value_type {}", json, def.value_type))
        })?),
    };

    let dimensions = match &def.dimension {
        None => Vec::new(),
        Some(DimensionDef::One(d)) => vec![d.clone()],
        Some(DimensionDef::Many(ds)) => ds.clone(),
    };

    Ok(ItemSchema {
        name: def.name.clone(),
        kind,
        raw,
        arity,
        default,
        dimensions,
    })
}

fn json_default(kind: ValueKind, json: &serde_json::Value) -> Option<Value> {
    match kind {
        ValueKind::Int => json.as_i64().map(Value::Int),
        ValueKind::Double => json.as_f64().map(Value::Double),
        ValueKind::String => json.as_str().map(|s| Value::Str(s.to_string())),
    }
}

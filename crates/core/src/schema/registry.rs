use std::collections::HashMap;
use std::path::Path;

use regex::Regex;

use super::json::KeywordDocument;
use super::{ItemArity, ItemSchema, KeywordSchema, KeywordSize};
use crate::error::SchemaError;

/// Immutable table of keyword schemas.
///
/// Built once through [`SchemaRegistry::builder`] and then shared, usually
/// as an `Arc<SchemaRegistry>`, by every parser that needs it. Engine
/// keywords (`INCLUDE`, `PATHS`, `END`, the unit system keywords, ...) are
/// always present.
#[derive(Debug)]
pub struct SchemaRegistry {
    keywords: HashMap<String, KeywordSchema>,
    matchers: Vec<(Regex, String)>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::new()
    }

    /// A registry holding only the engine keywords.
    pub fn intrinsic() -> Self {
        SchemaRegistry {
            keywords: intrinsic_keywords()
                .into_iter()
                .map(|k| (k.name.clone(), k))
                .collect(),
            matchers: Vec::new(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        SchemaRegistry::builder().add_json_str(json)?.build()
    }

    pub fn from_dir(dir: &Path) -> Result<Self, SchemaError> {
        SchemaRegistry::builder().add_dir(dir)?.build()
    }

    /// Exact name first, then each `deck_name_regex` in insertion order.
    pub fn lookup(&self, name: &str) -> Option<&KeywordSchema> {
        if let Some(schema) = self.keywords.get(name) {
            return Some(schema);
        }
        self.matchers
            .iter()
            .find(|(re, _)| re.is_match(name))
            .and_then(|(_, owner)| self.keywords.get(owner))
    }

    pub fn is_recognized(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// All schema names, sorted.
    pub fn keyword_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.keywords.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Collects and validates schemas for a [`SchemaRegistry`].
#[derive(Debug)]
pub struct SchemaRegistryBuilder {
    keywords: HashMap<String, KeywordSchema>,
    user_defined: Vec<String>,
}

impl Default for SchemaRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistryBuilder {
    pub fn new() -> Self {
        SchemaRegistryBuilder {
            keywords: intrinsic_keywords()
                .into_iter()
                .map(|k| (k.name.clone(), k))
                .collect(),
            user_defined: Vec::new(),
        }
    }

    /// Add one schema. A user schema replaces an engine keyword of the same
    /// name but may not replace another user schema.
    pub fn add(mut self, schema: KeywordSchema) -> Result<Self, SchemaError> {
        schema.validate()?;
        if self.user_defined.contains(&schema.name) {
            return Err(SchemaError::DuplicateKeyword(schema.name));
        }
        self.user_defined.push(schema.name.clone());
        self.keywords.insert(schema.name.clone(), schema);
        Ok(self)
    }

    /// Add the keyword definitions of a JSON document holding one
    /// definition or an array of them.
    pub fn add_json_str(mut self, json: &str) -> Result<Self, SchemaError> {
        let document: KeywordDocument = serde_json::from_str(json)?;
        for def in document.into_defs() {
            self = self.add(KeywordSchema::try_from(def)?)?;
        }
        Ok(self)
    }

    pub fn add_json_file(self, path: &Path) -> Result<Self, SchemaError> {
        let json = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.add_json_str(&json)
    }

    /// Add every `*.json` file directly under `dir`, in file name order.
    pub fn add_dir(mut self, dir: &Path) -> Result<Self, SchemaError> {
        let io_err = |source| SchemaError::Io {
            path: dir.display().to_string(),
            source,
        };
        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .map_err(io_err)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |e| e == "json"))
            .collect();
        paths.sort();
        for path in paths {
            self = self.add_json_file(&path)?;
        }
        Ok(self)
    }

    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        let mut matchers = Vec::new();
        for name in &self.user_defined {
            let Some(schema) = self.keywords.get(name) else {
                continue;
            };
            if let Some(pattern) = &schema.deck_name_regex {
                let re = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
                    SchemaError::InvalidRegex {
                        keyword: name.clone(),
                        source,
                    }
                })?;
                matchers.push((re, name.clone()));
            }
        }
        Ok(SchemaRegistry {
            keywords: self.keywords,
            matchers,
        })
    }
}

/// Names of the keywords that select a unit system.
pub const UNIT_SYSTEM_KEYWORDS: [&str; 4] = ["METRIC", "FIELD", "LAB", "PVT-M"];

fn intrinsic_keywords() -> Vec<KeywordSchema> {
    let mut keywords = vec![
        KeywordSchema::new("INCLUDE", KeywordSize::Fixed(1))
            .with_items(vec![ItemSchema::string("IncludeFile")]),
        KeywordSchema::new("PATHS", KeywordSize::SlashTerminated).with_items(vec![
            ItemSchema::string("PathName"),
            ItemSchema::string("PathValue"),
        ]),
        KeywordSchema::new("TITLE", KeywordSize::Title).with_items(vec![
            ItemSchema::raw_string("TitleText").with_arity(ItemArity::All),
        ]),
    ];
    for name in ["END", "ENDINC", "SKIP", "ENDSKIP"]
        .into_iter()
        .chain(UNIT_SYSTEM_KEYWORDS)
    {
        keywords.push(KeywordSchema::new(name, KeywordSize::Fixed(0)));
    }
    keywords
}

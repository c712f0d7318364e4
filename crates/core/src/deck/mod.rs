//! The parsed deck: an ordered, name-indexed sequence of keywords.

mod item;
mod keyword;
mod output;
mod record;

pub use item::DeckItem;
pub use keyword::DeckKeyword;
pub use record::DeckRecord;

use std::collections::HashMap;

use serde::Serialize;

use ecldeck_units::{UnitSystem, UnitType};

/// Keyword occurrences in source order, plus a name index onto them.
///
/// Iteration order equals input order. Every occurrence of a name is kept;
/// [`append`](Deck::append) is the only mutation.
#[derive(Debug, Clone, Serialize)]
pub struct Deck {
    keywords: Vec<DeckKeyword>,
    #[serde(skip)]
    index: HashMap<String, Vec<usize>>,
    default_unit_system: UnitSystem,
    active_unit_system: UnitSystem,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_file: Option<String>,
}

impl Default for Deck {
    fn default() -> Self {
        Deck::new(UnitType::Metric)
    }
}

impl Deck {
    /// An empty deck whose default and active unit system is `unit_type`.
    /// A custom unit type falls back to METRIC.
    pub fn new(unit_type: UnitType) -> Self {
        let system = UnitSystem::builtin(unit_type)
            .or_else(|| UnitSystem::builtin(UnitType::Metric))
            .cloned()
            .unwrap_or_else(UnitSystem::new_metric);
        Self::with_unit_system(system)
    }

    pub fn with_unit_system(system: UnitSystem) -> Self {
        Deck {
            keywords: Vec::new(),
            index: HashMap::new(),
            default_unit_system: system.clone(),
            active_unit_system: system,
            data_file: None,
        }
    }

    pub fn append(&mut self, keyword: DeckKeyword) {
        self.index
            .entry(keyword.name().to_string())
            .or_default()
            .push(self.keywords.len());
        self.keywords.push(keyword);
    }

    /// Occurrence `occurrence` (0-based) of `name`.
    pub fn get(&self, name: &str, occurrence: usize) -> Option<&DeckKeyword> {
        self.index
            .get(name)
            .and_then(|positions| positions.get(occurrence))
            .map(|&pos| &self.keywords[pos])
    }

    pub fn get_all(&self, name: &str) -> Vec<&DeckKeyword> {
        self.index(name)
            .iter()
            .map(|&pos| &self.keywords[pos])
            .collect()
    }

    pub fn last(&self, name: &str) -> Option<&DeckKeyword> {
        self.index(name).last().map(|&pos| &self.keywords[pos])
    }

    /// Positions of every occurrence of `name` in the full sequence.
    pub fn index(&self, name: &str) -> &[usize] {
        self.index.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, name: &str) -> usize {
        self.index(name).len()
    }

    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn size(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn keyword_at(&self, position: usize) -> Option<&DeckKeyword> {
        self.keywords.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeckKeyword> {
        self.keywords.iter()
    }

    pub fn default_unit_system(&self) -> &UnitSystem {
        &self.default_unit_system
    }

    /// The unit system selected by the last unit system keyword, or the
    /// default one.
    pub fn active_unit_system(&self) -> &UnitSystem {
        &self.active_unit_system
    }

    pub(crate) fn set_active_unit_system(&mut self, system: UnitSystem) {
        self.active_unit_system = system;
    }

    pub fn data_file(&self) -> Option<&str> {
        self.data_file.as_deref()
    }

    pub(crate) fn set_data_file(&mut self, path: impl Into<String>) {
        self.data_file = Some(path.into());
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl<'a> IntoIterator for &'a Deck {
    type Item = &'a DeckKeyword;
    type IntoIter = std::slice::Iter<'a, DeckKeyword>;

    fn into_iter(self) -> Self::IntoIter {
        self.keywords.iter()
    }
}

use serde::Serialize;

use super::record::DeckRecord;
use crate::error::{DeckError, ErrorKind, KeywordLocation};

/// One occurrence of a keyword in the deck.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckKeyword {
    name: String,
    location: KeywordLocation,
    records: Vec<DeckRecord>,
    #[serde(skip)]
    slash_terminated: bool,
    #[serde(skip)]
    data_keyword: bool,
    #[serde(skip)]
    raw: bool,
    #[serde(skip)]
    title: bool,
}

impl DeckKeyword {
    pub fn new(location: KeywordLocation, records: Vec<DeckRecord>) -> Self {
        DeckKeyword {
            name: location.keyword.clone(),
            location,
            records,
            slash_terminated: false,
            data_keyword: false,
            raw: false,
            title: false,
        }
    }

    /// Mark that the record list ends with a lone `/` in deck text.
    pub fn slash_terminated(mut self, yes: bool) -> Self {
        self.slash_terminated = yes;
        self
    }

    pub(crate) fn data_keyword(mut self, yes: bool) -> Self {
        self.data_keyword = yes;
        self
    }

    pub(crate) fn raw(mut self, yes: bool) -> Self {
        self.raw = yes;
        self
    }

    pub(crate) fn title(mut self, yes: bool) -> Self {
        self.title = yes;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &KeywordLocation {
        &self.location
    }

    pub fn records(&self) -> &[DeckRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Result<&DeckRecord, DeckError> {
        self.records.get(index).ok_or_else(|| {
            DeckError::at(
                ErrorKind::NoValue,
                &self.location,
                format!("keyword has {} records, asked for record {}", self.records.len(), index),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_slash_terminated(&self) -> bool {
        self.slash_terminated
    }

    /// String values are verbatim deck text, quotes included.
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// A keyword whose single record is one unbounded `data` item.
    pub fn is_data_keyword(&self) -> bool {
        self.data_keyword
    }

    /// Whether the single record is a free-text title line.
    pub fn is_title(&self) -> bool {
        self.title
    }
}

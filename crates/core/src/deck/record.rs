use serde::Serialize;

use super::item::DeckItem;
use crate::error::{DeckError, ErrorKind};
use crate::value::FromValue;

/// The items of one record, in schema order.
///
/// Multi-valued items contribute one [`DeckItem`] per value, all sharing
/// the item name.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct DeckRecord {
    items: Vec<DeckItem>,
}

impl DeckRecord {
    pub fn new(items: Vec<DeckItem>) -> Self {
        DeckRecord { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[DeckItem] {
        &self.items
    }

    pub fn item_at(&self, index: usize) -> Option<&DeckItem> {
        self.items.get(index)
    }

    /// The first item called `name`.
    pub fn item(&self, name: &str) -> Result<&DeckItem, DeckError> {
        self.items.iter().find(|i| i.name() == name).ok_or_else(|| {
            DeckError::new(
                ErrorKind::NoValue,
                format!("record has no item named '{}'", name),
            )
        })
    }

    pub fn items_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DeckItem> + 'a {
        self.items.iter().filter(move |i| i.name() == name)
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.items.iter().any(|i| i.name() == name)
    }

    fn collect<T: FromValue>(&self, name: &str) -> Result<Vec<T>, DeckError> {
        self.items_named(name).map(DeckItem::get::<T>).collect()
    }

    pub fn ints(&self, name: &str) -> Result<Vec<i64>, DeckError> {
        self.collect(name)
    }

    pub fn doubles(&self, name: &str) -> Result<Vec<f64>, DeckError> {
        self.collect(name)
    }

    pub fn si_doubles(&self, name: &str) -> Result<Vec<f64>, DeckError> {
        self.items_named(name).map(DeckItem::get_si).collect()
    }

    pub fn strings(&self, name: &str) -> Result<Vec<String>, DeckError> {
        self.collect(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn repeated_names_collect_in_order() {
        let record = DeckRecord::new(vec![
            DeckItem::from_deck("N", Value::Int(2)),
            DeckItem::from_deck("V", Value::Double(1.5)),
            DeckItem::valid_default("V", Value::Double(3.0)),
        ]);
        assert_eq!(record.doubles("V").unwrap(), vec![1.5, 3.0]);
        assert_eq!(record.item("N").unwrap().get_int().unwrap(), 2);
        assert_eq!(record.item_at(1).unwrap().name(), "V");
        assert!(record.item("Z").is_err());
    }

    #[test]
    fn collect_fails_on_empty_default() {
        let record = DeckRecord::new(vec![
            DeckItem::from_deck("V", Value::Double(1.0)),
            DeckItem::empty_default("V"),
        ]);
        assert_eq!(record.doubles("V").unwrap_err().kind, ErrorKind::NoValue);
    }
}

//! Writing a deck back out in input syntax.

use std::fmt;

use super::{Deck, DeckItem, DeckKeyword, DeckRecord};
use crate::value::Value;

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, raw: bool) -> fmt::Result {
    match value {
        Value::Int(v) => write!(f, "{}", v),
        Value::Double(v) => write!(f, "{:?}", v),
        Value::Str(v) if raw => f.write_str(v),
        Value::Str(v) => write_quoted(f, v),
    }
}

/// Quote with `'` unless the text holds one, then with `"`. Deck syntax
/// has no escapes, so a string holding both has its `"` written as `'`.
fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    if !text.contains('\'') {
        write!(f, "'{}'", text)
    } else if !text.contains('"') {
        write!(f, "\"{}\"", text)
    } else {
        write!(f, "\"{}\"", text.replace('"', "'"))
    }
}

/// A title record is one verbatim line with no terminator.
fn write_title(f: &mut fmt::Formatter<'_>, record: &DeckRecord) -> fmt::Result {
    let mut first = true;
    for item in record.items() {
        if let Ok(Value::Str(text)) = item.value() {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(text)?;
            first = false;
        }
    }
    Ok(())
}

fn write_record(f: &mut fmt::Formatter<'_>, record: &DeckRecord, raw: bool) -> fmt::Result {
    f.write_str(" ")?;
    let items: &[DeckItem] = record.items();
    let mut i = 0;
    while i < items.len() {
        if items[i].defaulted() {
            let run = items[i..].iter().take_while(|it| it.defaulted()).count();
            write!(f, " {}*", run)?;
            i += run;
            continue;
        }
        f.write_str(" ")?;
        if let Ok(value) = items[i].value() {
            write_value(f, value, raw)?;
        }
        i += 1;
    }
    f.write_str(" /")
}

impl fmt::Display for DeckKeyword {
    /// Defaulted items are written as repeat-count placeholders, so an
    /// item that was defaulted on input stays defaulted when re-read.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name())?;
        for record in self.records() {
            if self.is_title() {
                f.write_str("  ")?;
                write_title(f, record)?;
            } else {
                write_record(f, record, self.is_raw())?;
            }
            writeln!(f)?;
        }
        if self.is_slash_terminated() {
            writeln!(f, "/")?;
        }
        Ok(())
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for keyword in self.iter() {
            writeln!(f, "{}", keyword)?;
        }
        Ok(())
    }
}

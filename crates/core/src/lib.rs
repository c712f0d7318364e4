#![allow(clippy::result_large_err)]
//! ecldeck-core: keyword-driven parser for reservoir simulation decks.
//!
//! Deck text is read as a sequence of keyword blocks. Each block is split
//! into records, tokenized, and assembled against a keyword schema into
//! typed items that remember whether their value came from the deck or
//! from a default. Numeric items with a dimension also carry their value
//! in SI units.
//!
//! # Public API
//!
//! - [`DeckParser`] -- parse a string or a file (following `INCLUDE`)
//! - [`SchemaRegistry`] -- immutable table of keyword schemas, shareable
//!   across threads
//! - [`Deck`] -- ordered keyword container with lookup by name and
//!   occurrence
//! - [`ParseContext`] / [`ErrorGuard`] -- per-category error policy and
//!   the collected warnings and delayed errors
//!
//! ```no_run
//! use std::sync::Arc;
//! use ecldeck_core::{DeckParser, ErrorGuard, ParseContext, SchemaRegistry};
//!
//! let registry = Arc::new(SchemaRegistry::from_dir("keywords".as_ref()).unwrap());
//! let parser = DeckParser::new(registry);
//! let mut guard = ErrorGuard::new();
//! let deck = parser
//!     .parse_file("CASE.DATA".as_ref(), &ParseContext::from_env(), &mut guard)
//!     .unwrap();
//! println!("{} keywords", deck.size());
//! ```

pub mod assemble;
pub mod deck;
pub mod error;
pub mod error_guard;
pub mod lexer;
pub mod parse_context;
pub mod parser;
pub mod schema;
pub mod source;
pub mod value;

// ── Convenience re-exports: deck model ───────────────────────────────

pub use deck::{Deck, DeckItem, DeckKeyword, DeckRecord};
pub use value::{FromValue, Value, ValueKind, ValueStatus};

// ── Convenience re-exports: errors and policy ────────────────────────

pub use error::{DeckError, ErrorKind, KeywordLocation, SchemaError};
pub use error_guard::ErrorGuard;
pub use parse_context::{InputErrorAction, ParseContext};

// ── Convenience re-exports: parsing ──────────────────────────────────

pub use assemble::Assembler;
pub use parser::DeckParser;
pub use schema::{
    ItemArity, ItemSchema, KeywordSchema, KeywordSize, RecordSchema, SchemaRegistry,
    SchemaRegistryBuilder,
};
pub use source::{FileSystemProvider, InMemoryProvider, SourceProvider};

// ── Convenience re-exports: units ────────────────────────────────────

pub use ecldeck_units::{Dimension, UnitSystem, UnitType};

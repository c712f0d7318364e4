//! Schema-driven assembly of raw keyword blocks into typed deck keywords.

use std::collections::VecDeque;

use ecldeck_units::{Dimension, UnitSystem};

use crate::deck::{Deck, DeckItem, DeckKeyword, DeckRecord};
use crate::error::{DeckError, ErrorKind, KeywordLocation};
use crate::error_guard::ErrorGuard;
use crate::lexer::{RawKeyword, Token};
use crate::parse_context::ParseContext;
use crate::schema::{ItemArity, ItemSchema, KeywordSchema, KeywordSize, RecordSchema, SchemaRegistry};
use crate::value::Value;

/// Turns [`RawKeyword`]s into [`DeckKeyword`]s against the deck parsed so far.
///
/// Hard errors (type mismatch, malformed records, bad repeat counts,
/// unknown dimensions) are returned to the caller. Arity problems and
/// missing sizing keywords are routed through the [`ParseContext`] here,
/// and assembly continues when the policy allows it.
pub struct Assembler<'a> {
    registry: &'a SchemaRegistry,
    deck: &'a Deck,
    units: &'a UnitSystem,
    context: &'a ParseContext,
}

impl<'a> Assembler<'a> {
    /// Convert with the deck's active unit system.
    pub fn new(registry: &'a SchemaRegistry, deck: &'a Deck, context: &'a ParseContext) -> Self {
        Assembler {
            registry,
            deck,
            units: deck.active_unit_system(),
            context,
        }
    }

    pub fn with_units(mut self, units: &'a UnitSystem) -> Self {
        self.units = units;
        self
    }

    pub fn assemble(
        &self,
        raw: &RawKeyword,
        schema: &KeywordSchema,
        guard: &mut ErrorGuard,
    ) -> Result<DeckKeyword, DeckError> {
        let location = &raw.location;
        let mut records = Vec::with_capacity(raw.records.len());

        for (idx, raw_record) in raw.records.iter().enumerate() {
            let Some(record_schema) = schema.record(idx) else {
                self.context.handle_error(
                    guard,
                    DeckError::at(
                        ErrorKind::ArityMismatch,
                        location,
                        format!(
                            "too many records: keyword takes none, found {}",
                            raw.records.len()
                        ),
                    ),
                )?;
                break;
            };
            let tokens = raw_record
                .tokenize(raw.raw)
                .map_err(|e| e.with_location(location))?;
            records.push(self.assemble_record(location, record_schema, tokens, guard)?);
        }

        Ok(DeckKeyword::new(location.clone(), records)
            .slash_terminated(schema.size == KeywordSize::SlashTerminated)
            .data_keyword(schema.is_data_keyword())
            .raw(raw.raw)
            .title(schema.size == KeywordSize::Title))
    }

    fn assemble_record(
        &self,
        location: &KeywordLocation,
        schema: &RecordSchema,
        tokens: Vec<Token>,
        guard: &mut ErrorGuard,
    ) -> Result<DeckRecord, DeckError> {
        // Pass one: counts driven by keywords already in the deck.
        let mut deck_counts = Vec::with_capacity(schema.len());
        for item in schema.items() {
            deck_counts.push(match &item.arity {
                ItemArity::FromDeck { keyword, item: driver } => Some(self.count_from_deck(
                    location, keyword, driver, 0, guard,
                )?),
                _ => None,
            });
        }

        // Pass two: walk items in order, consuming tokens.
        let mut tokens: VecDeque<Token> = tokens.into();
        let mut items: Vec<DeckItem> = Vec::new();
        for (idx, item) in schema.items().iter().enumerate() {
            let dims = self.resolve_dimensions(location, item)?;
            match &item.arity {
                ItemArity::Single => {
                    let token = tokens.pop_front();
                    items.push(self.realize(location, item, &dims, 0, token)?);
                }
                ItemArity::All => {
                    let mut n = 0;
                    while let Some(token) = tokens.pop_front() {
                        items.push(self.realize(location, item, &dims, n, Some(token))?);
                        n += 1;
                    }
                }
                ItemArity::Fixed(n) => self.take_counted(
                    location,
                    item,
                    &dims,
                    Count::Schema(*n),
                    &mut tokens,
                    &mut items,
                    guard,
                )?,
                ItemArity::FromItem(driver) => {
                    let n = items
                        .iter()
                        .find(|i| i.name() == driver)
                        .and_then(|i| i.get_int().ok())
                        .map_or(0, |v| usize::try_from(v).unwrap_or(0));
                    self.take_counted(
                        location,
                        item,
                        &dims,
                        Count::Data { n, driver },
                        &mut tokens,
                        &mut items,
                        guard,
                    )?
                }
                ItemArity::FromDeck { keyword, .. } => {
                    let n = deck_counts[idx].unwrap_or(0);
                    self.take_counted(
                        location,
                        item,
                        &dims,
                        Count::Data { n, driver: keyword },
                        &mut tokens,
                        &mut items,
                        guard,
                    )?
                }
            }
        }

        if !tokens.is_empty() {
            self.context.handle_error(
                guard,
                DeckError::at(
                    ErrorKind::ArityMismatch,
                    location,
                    format!(
                        "too many items in record: {} value(s) left over after item {}",
                        tokens.len(),
                        schema.items().last().map_or("-", |i| i.name.as_str())
                    ),
                ),
            )?;
        }

        Ok(DeckRecord::new(items))
    }

    /// Consume the values of a counted item.
    ///
    /// A schema count materializes every slot, defaulting the ones the
    /// record leaves out. A count read from deck data only yields the
    /// values the record supplies; asking for more is an arity error.
    #[allow(clippy::too_many_arguments)]
    fn take_counted(
        &self,
        location: &KeywordLocation,
        item: &ItemSchema,
        dims: &[Dimension],
        count: Count<'_>,
        tokens: &mut VecDeque<Token>,
        items: &mut Vec<DeckItem>,
        guard: &mut ErrorGuard,
    ) -> Result<(), DeckError> {
        let wanted = count.n();
        let supplied = wanted.min(tokens.len());
        for n in 0..supplied {
            let token = tokens.pop_front();
            items.push(self.realize(location, item, dims, n, token)?);
        }
        if supplied == wanted {
            return Ok(());
        }

        match count {
            Count::Schema(_) => {
                if supplied > 0 && item.default.is_none() {
                    self.context.handle_error(
                        guard,
                        DeckError::at(
                            ErrorKind::ArityMismatch,
                            location,
                            format!(
                                "item {} expects {} values, record ended after {}",
                                item.name, wanted, supplied
                            ),
                        ),
                    )?;
                }
                for n in supplied..wanted {
                    items.push(self.realize(location, item, dims, n, None)?);
                }
            }
            Count::Data { driver, .. } => {
                self.context.handle_error(
                    guard,
                    DeckError::at(
                        ErrorKind::ArityMismatch,
                        location,
                        format!(
                            "item {} is sized {} by {}, record supplies {}",
                            item.name, wanted, driver, supplied
                        ),
                    ),
                )?;
            }
        }
        Ok(())
    }

    fn resolve_dimensions(
        &self,
        location: &KeywordLocation,
        item: &ItemSchema,
    ) -> Result<Vec<Dimension>, DeckError> {
        item.dimensions
            .iter()
            .map(|expr| {
                self.units.dimension(expr).map_err(|e| {
                    let err = DeckError::from(e);
                    DeckError::at(err.kind, location, format!("item {}: {}", item.name, err.message))
                })
            })
            .collect()
    }

    /// One slot: a token from the record, or the default path when the
    /// token is absent or a placeholder.
    fn realize(
        &self,
        location: &KeywordLocation,
        item: &ItemSchema,
        dims: &[Dimension],
        index: usize,
        token: Option<Token>,
    ) -> Result<DeckItem, DeckError> {
        let realized = match token.as_ref().and_then(Token::text) {
            Some(text) => {
                let value = Value::parse(item.kind, text).map_err(|e| {
                    DeckError::at(e.kind, location, format!("item {}: {}", item.name, e.message))
                })?;
                DeckItem::from_deck(&item.name, value)
            }
            None => match &item.default {
                Some(default) => DeckItem::valid_default(&item.name, default.clone()),
                None => return Ok(DeckItem::empty_default(&item.name)),
            },
        };

        if dims.is_empty() {
            return Ok(realized);
        }
        let dim = &dims[index % dims.len()];
        let raw_value = realized
            .get_double()
            .map_err(|e| e.with_location(location))?;
        let si = dim.convert_raw_to_si(raw_value);
        if !si.is_finite() {
            return Err(DeckError::at(
                ErrorKind::UnitConversion,
                location,
                format!(
                    "item {}: {} {} does not convert to a finite SI value",
                    item.name,
                    raw_value,
                    dim.name()
                ),
            ));
        }
        Ok(realized.with_si(dim.clone(), si))
    }

    /// A count read from the last occurrence of `keyword`, plus `shift`.
    ///
    /// Problems with the driver are raised through the error policy; when
    /// they are not thrown the fallback count is used.
    pub(crate) fn count_from_deck(
        &self,
        location: &KeywordLocation,
        keyword: &str,
        item: &str,
        shift: i64,
        guard: &mut ErrorGuard,
    ) -> Result<usize, DeckError> {
        let (count, problems) =
            resolve_deck_count(self.registry, self.deck, &location.keyword, keyword, item, shift);
        for problem in problems {
            self.context
                .handle_error(guard, problem.with_location(location))?;
        }
        Ok(count)
    }
}

/// Where a counted item's count came from.
#[derive(Debug, Clone, Copy)]
enum Count<'s> {
    Schema(usize),
    Data { n: usize, driver: &'s str },
}

impl Count<'_> {
    fn n(self) -> usize {
        match self {
            Count::Schema(n) | Count::Data { n, .. } => n,
        }
    }
}

/// The value of `keyword.item` in the deck, or why it cannot be read.
fn driver_value(deck: &Deck, sized: &str, keyword: &str, item: &str) -> Result<i64, DeckError> {
    let Some(driver) = deck.last(keyword) else {
        return Err(DeckError::new(
            ErrorKind::MissingDimsKeyword,
            format!(
                "keyword {} is needed to size {}; using the default of {}",
                keyword, sized, item
            ),
        ));
    };
    let no_value = || {
        DeckError::new(
            ErrorKind::NoValue,
            format!(
                "item {} of {} has no value to size {}; using the schema default",
                item, keyword, sized
            ),
        )
    };
    driver
        .record(0)
        .and_then(|record| record.item(item))
        .and_then(|slot| slot.get_int())
        .map_err(|_| no_value())
}

/// Resolve a count driven by `keyword.item` plus `shift` for the keyword
/// `sized`.
///
/// Returns the count to use and the problems met on the way, which the
/// caller routes through its error policy. A missing or valueless driver
/// falls back to the driver item's schema default. A sum that overflows
/// falls back to zero. Negative counts are clamped to zero.
pub(crate) fn resolve_deck_count(
    registry: &SchemaRegistry,
    deck: &Deck,
    sized: &str,
    keyword: &str,
    item: &str,
    shift: i64,
) -> (usize, Vec<DeckError>) {
    let mut problems = Vec::new();
    let base = driver_value(deck, sized, keyword, item).unwrap_or_else(|err| {
        problems.push(err);
        schema_default_count(registry, keyword, item)
    });

    let count = match base.checked_add(shift) {
        Some(n) => usize::try_from(n.max(0)).ok(),
        None => None,
    };
    match count {
        Some(n) => (n, problems),
        None => {
            problems.push(DeckError::new(
                ErrorKind::ArityMismatch,
                format!(
                    "count {} from {}.{} with shift {} is out of range for {}",
                    base, keyword, item, shift, sized
                ),
            ));
            (0, problems)
        }
    }
}

/// The schema default of a sizing item, or 0.
pub(crate) fn schema_default_count(registry: &SchemaRegistry, keyword: &str, item: &str) -> i64 {
    registry
        .lookup(keyword)
        .and_then(|schema| schema.record(0))
        .and_then(|record| record.item(item))
        .and_then(|item| item.default.as_ref())
        .and_then(|value| value.as_int().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::RawRecord;
    use crate::parse_context::InputErrorAction;
    use crate::value::ValueKind;

    fn raw(name: &str, records: &[&str]) -> RawKeyword {
        RawKeyword {
            name: name.to_string(),
            location: KeywordLocation::new(name, "t.data", 1),
            records: records
                .iter()
                .enumerate()
                .map(|(i, r)| RawRecord::new(*r, i as u32 + 2))
                .collect(),
            raw: false,
            recognized: true,
            truncated_from: None,
        }
    }

    fn equil() -> KeywordSchema {
        KeywordSchema::new("EQUIL", KeywordSize::Fixed(1)).with_items(vec![
            ItemSchema::double("DATUM_DEPTH").with_dimension("Length"),
            ItemSchema::double("DATUM_PRESSURE")
                .with_dimension("Pressure")
                .with_default(Value::Double(10.0)),
            ItemSchema::int("OWC_FLAG"),
        ])
    }

    fn run(
        schema: &KeywordSchema,
        raw: &RawKeyword,
        ctx: &ParseContext,
    ) -> (Result<DeckKeyword, DeckError>, ErrorGuard) {
        let registry = SchemaRegistry::intrinsic();
        let deck = Deck::default();
        let mut guard = ErrorGuard::new();
        let result = Assembler::new(&registry, &deck, ctx).assemble(raw, schema, &mut guard);
        (result, guard)
    }

    #[test]
    fn trailing_items_default_independently() {
        let (kw, _) = run(&equil(), &raw("EQUIL", &["5"]), &ParseContext::new());
        let kw = kw.unwrap();
        let rec = kw.record(0).unwrap();

        let depth = rec.item("DATUM_DEPTH").unwrap();
        assert!(depth.has_value() && !depth.defaulted());
        assert_eq!(depth.get_double().unwrap(), 5.0);

        let pressure = rec.item("DATUM_PRESSURE").unwrap();
        assert!(pressure.has_value() && pressure.defaulted());
        assert_eq!(pressure.get_double().unwrap(), 10.0);
        assert_eq!(pressure.get_si().unwrap(), 1.0e6);

        let flag = rec.item("OWC_FLAG").unwrap();
        assert!(!flag.has_value() && flag.defaulted());
        assert_eq!(flag.get_int().unwrap_err().kind, ErrorKind::NoValue);
    }

    #[test]
    fn placeholder_defaults_interior_item() {
        let (kw, _) = run(&equil(), &raw("EQUIL", &["5 * 1"]), &ParseContext::new());
        let kw = kw.unwrap();
        let rec = kw.record(0).unwrap();
        assert!(rec.item("DATUM_PRESSURE").unwrap().defaulted());
        assert_eq!(rec.item("OWC_FLAG").unwrap().get_int().unwrap(), 1);
    }

    #[test]
    fn pressure_converted_with_active_units() {
        let (kw, _) = run(&equil(), &raw("EQUIL", &["2000 200"]), &ParseContext::new());
        let kw = kw.unwrap();
        let item = kw.record(0).unwrap().item("DATUM_PRESSURE").unwrap();
        assert_eq!(item.get_double().unwrap(), 200.0);
        assert_eq!(item.get_si().unwrap(), 20_000_000.0);
    }

    #[test]
    fn repeat_count_feeds_all_item() {
        let poro = KeywordSchema::new("PORO", KeywordSize::Fixed(1)).with_items(vec![
            ItemSchema::double("data").with_arity(ItemArity::All),
        ]);
        let (kw, _) = run(&poro, &raw("PORO", &["3*2.5"]), &ParseContext::new());
        let kw = kw.unwrap();
        let rec = kw.record(0).unwrap();
        assert_eq!(rec.len(), 3);
        for item in rec.items() {
            assert_eq!(item.get_double().unwrap(), 2.5);
            assert!(item.has_value() && !item.defaulted());
        }
        assert!(kw.is_data_keyword());
    }

    #[test]
    fn type_mismatch_is_returned() {
        for token in ["333.2", "100X", "astring"] {
            let schema = KeywordSchema::new("DIMENS", KeywordSize::Fixed(1))
                .with_items(vec![ItemSchema::int("NX")]);
            let (result, _) = run(&schema, &raw("DIMENS", &[token]), &ParseContext::new());
            let err = result.unwrap_err();
            assert_eq!(err.kind, ErrorKind::TypeMismatch, "{}", token);
            assert_eq!(err.location.unwrap().keyword, "DIMENS");
        }
    }

    #[test]
    fn overflow_throws_by_default_and_drops_when_warned() {
        let schema = KeywordSchema::new("DIMENS", KeywordSize::Fixed(1))
            .with_items(vec![ItemSchema::int("NX"), ItemSchema::int("NY")]);
        let input = raw("DIMENS", &["1 2 3"]);

        let (result, _) = run(&schema, &input, &ParseContext::new());
        assert_eq!(result.unwrap_err().kind, ErrorKind::ArityMismatch);

        let ctx = ParseContext::with_action(InputErrorAction::Warn);
        let (result, guard) = run(&schema, &input, &ctx);
        assert_eq!(result.unwrap().record(0).unwrap().len(), 2);
        assert_eq!(guard.warnings()[0].kind, ErrorKind::ArityMismatch);
    }

    #[test]
    fn underflow_of_counted_item() {
        let schema = KeywordSchema::new("COMPS", KeywordSize::Fixed(1)).with_items(vec![
            ItemSchema::int("N"),
            ItemSchema::double("V").with_arity(ItemArity::FromItem("N".into())),
        ]);
        let (result, _) = run(&schema, &raw("COMPS", &["3 1.0 2.0"]), &ParseContext::new());
        assert_eq!(result.unwrap_err().kind, ErrorKind::ArityMismatch);

        let ctx = ParseContext::with_action(InputErrorAction::Ignore);
        let (result, guard) = run(&schema, &raw("COMPS", &["3 1.0 2.0"]), &ctx);
        let kw = result.unwrap();
        let rec = kw.record(0).unwrap();
        assert_eq!(rec.doubles("V").unwrap(), vec![1.0, 2.0]);
        assert_eq!(rec.len(), 3);
        assert_eq!(guard.warnings().len(), 1);

        let (result, _) = run(&schema, &raw("COMPS", &["2"]), &ParseContext::new());
        assert_eq!(result.unwrap_err().kind, ErrorKind::ArityMismatch);
        let (result, _) = run(&schema, &raw("COMPS", &["0"]), &ParseContext::new());
        assert_eq!(result.unwrap().record(0).unwrap().len(), 1);
    }

    #[test]
    fn huge_declared_count_only_keeps_supplied_values() {
        let schema = KeywordSchema::new("COMPS", KeywordSize::Fixed(1)).with_items(vec![
            ItemSchema::int("N"),
            ItemSchema::double("V").with_arity(ItemArity::FromItem("N".into())),
        ]);
        let ctx = ParseContext::with_action(InputErrorAction::Warn);
        let (result, guard) = run(&schema, &raw("COMPS", &["5000000 0.5"]), &ctx);
        let kw = result.unwrap();
        assert_eq!(kw.record(0).unwrap().len(), 2);
        assert_eq!(guard.warnings().len(), 1);
        assert!(guard.warnings()[0].message.contains("5000000"));

        let (result, _) = run(&schema, &raw("COMPS", &["-3"]), &ParseContext::new());
        assert_eq!(result.unwrap().record(0).unwrap().len(), 1);
    }

    #[test]
    fn schema_fixed_count_still_defaults_missing_slots() {
        let schema = KeywordSchema::new("BOX", KeywordSize::Fixed(1)).with_items(vec![
            ItemSchema::int("I")
                .with_arity(ItemArity::Fixed(3))
                .with_default(Value::Int(7)),
        ]);
        let (result, guard) = run(&schema, &raw("BOX", &["1"]), &ParseContext::new());
        let kw = result.unwrap();
        assert_eq!(kw.record(0).unwrap().ints("I").unwrap(), vec![1, 7, 7]);
        assert!(guard.is_empty());
    }

    #[test]
    fn fixed_arity_consumes_exact_count() {
        let schema = KeywordSchema::new("BOX", KeywordSize::Fixed(1)).with_items(vec![
            ItemSchema::int("I").with_arity(ItemArity::Fixed(2)),
            ItemSchema::int("J"),
        ]);
        let (result, _) = run(&schema, &raw("BOX", &["1 2 3"]), &ParseContext::new());
        let kw = result.unwrap();
        let rec = kw.record(0).unwrap();
        assert_eq!(rec.ints("I").unwrap(), vec![1, 2]);
        assert_eq!(rec.item("J").unwrap().get_int().unwrap(), 3);
    }

    #[test]
    fn dimension_cycles_over_table_columns() {
        let schema = KeywordSchema::new("PVDG", KeywordSize::Fixed(1)).with_items(vec![
            ItemSchema::double("table")
                .with_arity(ItemArity::All)
                .with_dimension("Pressure")
                .with_dimension("1"),
        ]);
        let (result, _) = run(&schema, &raw("PVDG", &["1 0.5 2 0.25"]), &ParseContext::new());
        let kw = result.unwrap();
        let si = kw.record(0).unwrap().si_doubles("table").unwrap();
        assert_eq!(si, vec![1e5, 0.5, 2e5, 0.25]);
    }

    #[test]
    fn unknown_dimension_is_an_error() {
        let schema = KeywordSchema::new("ODD", KeywordSize::Fixed(1))
            .with_items(vec![ItemSchema::double("X").with_dimension("Luminosity")]);
        let (result, _) = run(&schema, &raw("ODD", &["1"]), &ParseContext::new());
        assert_eq!(result.unwrap_err().kind, ErrorKind::UnknownDimension);
    }

    #[test]
    fn malformed_dimension_expression_is_invalid_dimension() {
        let schema = KeywordSchema::new("ODD", KeywordSize::Fixed(1))
            .with_items(vec![ItemSchema::double("X").with_dimension("Length/Time/Time")]);
        let (result, _) = run(&schema, &raw("ODD", &["1"]), &ParseContext::new());
        assert_eq!(result.unwrap_err().kind, ErrorKind::InvalidDimension);
    }

    #[test]
    fn quoted_and_bare_strings() {
        let schema = KeywordSchema::new("WELSPECS", KeywordSize::SlashTerminated).with_items(vec![
            ItemSchema::string("WELL"),
            ItemSchema::string("GROUP"),
        ]);
        let (result, _) = run(&schema, &raw("WELSPECS", &["'PROD 1' G1"]), &ParseContext::new());
        let kw = result.unwrap();
        let rec = kw.record(0).unwrap();
        assert_eq!(rec.item("WELL").unwrap().get_string().unwrap(), "PROD 1");
        assert_eq!(rec.item("GROUP").unwrap().get_string().unwrap(), "G1");
        assert!(kw.is_slash_terminated());
    }

    #[test]
    fn missing_sizing_keyword_uses_schema_default() {
        let registry = SchemaRegistry::builder()
            .add(
                KeywordSchema::new("TABDIMS", KeywordSize::Fixed(1)).with_items(vec![
                    ItemSchema::int("NTSFUN").with_default(Value::Int(2)),
                ]),
            )
            .unwrap()
            .build()
            .unwrap();
        let schema = KeywordSchema::new("SATS", KeywordSize::Fixed(1)).with_items(vec![
            ItemSchema::double("V").with_arity(ItemArity::FromDeck {
                keyword: "TABDIMS".into(),
                item: "NTSFUN".into(),
            }),
        ]);
        let deck = Deck::default();
        let mut ctx = ParseContext::new();
        ctx.update(ErrorKind::MissingDimsKeyword, InputErrorAction::Warn);
        let mut guard = ErrorGuard::new();

        let kw = Assembler::new(&registry, &deck, &ctx)
            .assemble(&raw("SATS", &["0.1 0.2"]), &schema, &mut guard)
            .unwrap();
        assert_eq!(kw.record(0).unwrap().doubles("V").unwrap(), vec![0.1, 0.2]);
        assert_eq!(guard.warnings()[0].kind, ErrorKind::MissingDimsKeyword);
    }

    fn sized_by_tabdims() -> (SchemaRegistry, KeywordSchema) {
        let registry = SchemaRegistry::builder()
            .add(
                KeywordSchema::new("TABDIMS", KeywordSize::Fixed(1)).with_items(vec![
                    ItemSchema::int("NTSFUN").with_default(Value::Int(2)),
                    ItemSchema::int("NTPVT"),
                ]),
            )
            .unwrap()
            .build()
            .unwrap();
        let schema = KeywordSchema::new("SATS", KeywordSize::Fixed(1)).with_items(vec![
            ItemSchema::double("V").with_arity(ItemArity::FromDeck {
                keyword: "TABDIMS".into(),
                item: "NTPVT".into(),
            }),
        ]);
        (registry, schema)
    }

    fn deck_with(registry: &SchemaRegistry, tabdims: &str) -> Deck {
        let mut deck = Deck::default();
        let schema = registry.lookup("TABDIMS").unwrap();
        let ctx = ParseContext::new();
        let mut guard = ErrorGuard::new();
        let kw = Assembler::new(registry, &deck, &ctx)
            .assemble(&raw("TABDIMS", &[tabdims]), schema, &mut guard)
            .unwrap();
        deck.append(kw);
        deck
    }

    #[test]
    fn deck_driven_count_beyond_supplied_values() {
        let (registry, schema) = sized_by_tabdims();
        let deck = deck_with(&registry, "1 9223372036854775807");
        let ctx = ParseContext::with_action(InputErrorAction::Warn);
        let mut guard = ErrorGuard::new();
        let kw = Assembler::new(&registry, &deck, &ctx)
            .assemble(&raw("SATS", &["0.1 0.2"]), &schema, &mut guard)
            .unwrap();
        assert_eq!(kw.record(0).unwrap().doubles("V").unwrap(), vec![0.1, 0.2]);
        assert_eq!(guard.warnings().len(), 1);
        assert_eq!(guard.warnings()[0].kind, ErrorKind::ArityMismatch);
    }

    #[test]
    fn shift_overflow_in_deck_count_goes_through_policy() {
        let (registry, _) = sized_by_tabdims();
        let deck = deck_with(&registry, "1 9223372036854775807");
        let loc = KeywordLocation::new("SATS", "t.data", 1);
        let mut guard = ErrorGuard::new();

        let ctx = ParseContext::new();
        let err = Assembler::new(&registry, &deck, &ctx)
            .count_from_deck(&loc, "TABDIMS", "NTPVT", 1, &mut guard)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
        assert_eq!(err.location.unwrap().keyword, "SATS");

        let ctx = ParseContext::with_action(InputErrorAction::Ignore);
        let n = Assembler::new(&registry, &deck, &ctx)
            .count_from_deck(&loc, "TABDIMS", "NTPVT", 1, &mut guard)
            .unwrap();
        assert_eq!(n, 0);
        let n = Assembler::new(&registry, &deck, &ctx)
            .count_from_deck(&loc, "TABDIMS", "NTSFUN", i64::MIN, &mut guard)
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn valueless_driver_reports_no_value() {
        let (registry, schema) = sized_by_tabdims();
        let deck = deck_with(&registry, "1 1*");
        let mut guard = ErrorGuard::new();
        let err = Assembler::new(&registry, &deck, &ParseContext::new())
            .assemble(&raw("SATS", &[""]), &schema, &mut guard)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoValue);
        assert!(err.message.contains("NTPVT"));
    }

    #[test]
    fn string_item_kind_is_checked_on_read() {
        let schema = KeywordSchema::new("NAME", KeywordSize::Fixed(1))
            .with_items(vec![ItemSchema::new("N", ValueKind::String)]);
        let (result, _) = run(&schema, &raw("NAME", &["42"]), &ParseContext::new());
        let kw = result.unwrap();
        let item = kw.record(0).unwrap().item("N").unwrap();
        assert_eq!(item.get_string().unwrap(), "42");
        assert_eq!(item.get_int().unwrap_err().kind, ErrorKind::TypeMismatch);
    }
}

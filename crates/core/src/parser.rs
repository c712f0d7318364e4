//! The deck parser: reads keyword blocks from the root input and its
//! includes, assembles them against the schema registry and appends them
//! to a [`Deck`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ecldeck_units::{UnitSystem, UnitType};

use crate::assemble::{resolve_deck_count, Assembler};
use crate::deck::{Deck, DeckKeyword};
use crate::error::{DeckError, ErrorKind, KeywordLocation};
use crate::error_guard::ErrorGuard;
use crate::lexer::{
    KeywordShape, KeywordSizing, RawKeyword, RawKeywordReader, RecordCount, MAX_KEYWORD_LENGTH,
};
use crate::parse_context::ParseContext;
use crate::schema::{KeywordSchema, KeywordSize, SchemaRegistry, UNIT_SYSTEM_KEYWORDS};
use crate::source::{FileSystemProvider, SourceProvider};

/// File name reported for decks parsed from a string.
pub const STRING_INPUT_NAME: &str = "<string>";

/// Parses deck text into a [`Deck`].
///
/// A parser holds only shared, read-only state and can be used from many
/// threads at once; every call to [`parse_string`](Self::parse_string) or
/// [`parse_file`](Self::parse_file) builds its own deck.
pub struct DeckParser {
    registry: Arc<SchemaRegistry>,
    unit_type: UnitType,
    provider: Box<dyn SourceProvider>,
}

impl DeckParser {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        DeckParser {
            registry,
            unit_type: UnitType::Metric,
            provider: Box::new(FileSystemProvider),
        }
    }

    /// The unit system in effect until the deck selects another one.
    pub fn with_unit_system(mut self, unit_type: UnitType) -> Self {
        self.unit_type = unit_type;
        self
    }

    pub fn with_provider(mut self, provider: Box<dyn SourceProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Parse deck text. Relative includes resolve against the current
    /// directory.
    pub fn parse_string(
        &self,
        text: &str,
        context: &ParseContext,
        guard: &mut ErrorGuard,
    ) -> Result<Deck, DeckError> {
        let reader = RawKeywordReader::new(text, STRING_INPUT_NAME);
        ParseState::new(self, reader, PathBuf::from("."), None).run(context, guard)
    }

    /// Parse a deck file and everything it includes.
    pub fn parse_file(
        &self,
        path: &Path,
        context: &ParseContext,
        guard: &mut ErrorGuard,
    ) -> Result<Deck, DeckError> {
        let io_error = |e: std::io::Error| {
            DeckError::new(
                ErrorKind::Io,
                format!("cannot read deck {}: {}", path.display(), e),
            )
        };
        let canonical = self.provider.canonicalize(path).map_err(io_error)?;
        let text = self.provider.read_source(&canonical).map_err(io_error)?;
        let dir = canonical
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let reader = RawKeywordReader::new(text, canonical.display().to_string());
        let mut state = ParseState::new(self, reader, dir, Some(canonical.clone()));
        state.deck.set_data_file(canonical.display().to_string());
        state.run(context, guard)
    }
}

struct InputFrame {
    reader: RawKeywordReader,
    dir: PathBuf,
    path: Option<PathBuf>,
}

struct ParseState<'p> {
    parser: &'p DeckParser,
    stack: Vec<InputFrame>,
    deck: Deck,
    path_aliases: HashMap<String, String>,
}

impl<'p> ParseState<'p> {
    fn new(
        parser: &'p DeckParser,
        reader: RawKeywordReader,
        dir: PathBuf,
        path: Option<PathBuf>,
    ) -> Self {
        ParseState {
            parser,
            stack: vec![InputFrame { reader, dir, path }],
            deck: Deck::new(parser.unit_type),
            path_aliases: HashMap::new(),
        }
    }

    fn run(mut self, context: &ParseContext, guard: &mut ErrorGuard) -> Result<Deck, DeckError> {
        let parser: &'p DeckParser = self.parser;
        let registry: &SchemaRegistry = &parser.registry;

        loop {
            let Some(frame) = self.stack.last_mut() else {
                break;
            };
            let mut sizer = DeckSizer {
                registry,
                deck: &self.deck,
                pending: Vec::new(),
            };
            let next = frame.reader.next_keyword(&mut sizer);
            let pending = std::mem::take(&mut sizer.pending);

            let Some(next) = next else {
                self.stack.pop();
                continue;
            };
            let location = match &next {
                Ok(raw) => Some(&raw.location),
                Err(other) => other.location.as_ref(),
            };
            for err in pending {
                let err = match location {
                    Some(loc) => err.with_location(loc),
                    None => err,
                };
                context.handle_error(guard, err)?;
            }
            let raw = match next {
                Ok(raw) => raw,
                Err(err) => {
                    context.handle_error(guard, err)?;
                    continue;
                }
            };

            tracing::debug!(
                keyword = %raw.name,
                file = %raw.location.file,
                line = raw.location.line,
                "Reading {} in {} line {}",
                raw.name,
                raw.location.file,
                raw.location.line
            );

            if !raw.recognized {
                context.handle_error(
                    guard,
                    DeckError::at(
                        ErrorKind::UnknownKeyword,
                        &raw.location,
                        format!("unknown keyword {}", raw.name),
                    ),
                )?;
                continue;
            }
            if let Some(long) = &raw.truncated_from {
                context.handle_error(
                    guard,
                    DeckError::at(
                        ErrorKind::LongKeyword,
                        &raw.location,
                        format!(
                            "keyword {} is longer than {} characters, read as {}",
                            long, MAX_KEYWORD_LENGTH, raw.name
                        ),
                    ),
                )?;
            }

            match raw.name.as_str() {
                "END" => break,
                "ENDINC" => {
                    if self.stack.len() > 1 {
                        self.stack.pop();
                    }
                    continue;
                }
                _ => {}
            }

            let Some(schema) = registry.lookup(&raw.name) else {
                continue;
            };
            let assembled = Assembler::new(registry, &self.deck, context).assemble(&raw, schema, guard);
            let keyword = match assembled {
                Ok(keyword) => keyword,
                Err(err) => {
                    context.handle_error(guard, err)?;
                    continue;
                }
            };

            match raw.name.as_str() {
                "INCLUDE" => {
                    self.open_include(&raw, &keyword, context, guard)?;
                    continue;
                }
                "PATHS" => {
                    self.register_paths(&keyword)?;
                    continue;
                }
                name if UNIT_SYSTEM_KEYWORDS.contains(&name) => {
                    let system = UnitSystem::from_name(name)?;
                    tracing::info!(unit_system = system.name(), "Switching unit system to {}", name);
                    self.deck.set_active_unit_system(system.clone());
                }
                _ => {}
            }

            check_combinations(schema, &self.deck, &raw.location, context, guard)?;
            self.deck.append(keyword);
        }

        Ok(self.deck)
    }

    fn register_paths(&mut self, keyword: &DeckKeyword) -> Result<(), DeckError> {
        for record in keyword.records() {
            let name = first_string(record.item_at(0), keyword)?;
            let value = first_string(record.item_at(1), keyword)?;
            self.path_aliases.insert(name, value);
        }
        Ok(())
    }

    /// Replace each `$NAME` with the value registered by `PATHS`.
    ///
    /// `NAME` is the longest run of alphanumerics and underscores after the
    /// `$`. A name with no registered value is an error.
    fn expand_aliases(&self, path: &str) -> Result<String, String> {
        let mut expanded = String::with_capacity(path.len());
        let mut rest = path;
        while let Some(start) = rest.find('$') {
            expanded.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            let name = &after[..end];
            match self.path_aliases.get(name) {
                Some(value) => expanded.push_str(value),
                None => return Err(name.to_string()),
            }
            rest = &after[end..];
        }
        expanded.push_str(rest);
        Ok(expanded)
    }

    fn open_include(
        &mut self,
        raw: &RawKeyword,
        keyword: &DeckKeyword,
        context: &ParseContext,
        guard: &mut ErrorGuard,
    ) -> Result<(), DeckError> {
        let record = keyword.record(0)?;
        let file = first_string(record.item_at(0), keyword)?;
        let file = match self.expand_aliases(&file) {
            Ok(file) => file,
            Err(alias) => {
                return context.handle_error(
                    guard,
                    DeckError::at(
                        ErrorKind::MissingInclude,
                        &raw.location,
                        format!("path alias ${} in {} is not defined by PATHS", alias, file),
                    ),
                )
            }
        };
        let base = self
            .stack
            .last()
            .map(|f| f.dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        let parser: &'p DeckParser = self.parser;
        let provider = &parser.provider;
        let path = provider.resolve_include(&base, &file);

        let missing = |e: std::io::Error| {
            DeckError::at(
                ErrorKind::MissingInclude,
                &raw.location,
                format!("include file {} not found: {}", path.display(), e),
            )
        };
        let canonical = match provider.canonicalize(&path) {
            Ok(p) => p,
            Err(e) => return context.handle_error(guard, missing(e)),
        };
        if self
            .stack
            .iter()
            .any(|f| f.path.as_deref() == Some(canonical.as_path()))
        {
            return context.handle_error(
                guard,
                DeckError::at(
                    ErrorKind::IncludeCycle,
                    &raw.location,
                    format!("include cycle: {} is already being read", canonical.display()),
                ),
            );
        }
        let text = match provider.read_source(&canonical) {
            Ok(text) => text,
            Err(e) => return context.handle_error(guard, missing(e)),
        };

        tracing::info!(file = %canonical.display(), "Opening include file");
        let dir = canonical
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| base.clone());
        self.stack.push(InputFrame {
            reader: RawKeywordReader::new(text, canonical.display().to_string()),
            dir,
            path: Some(canonical),
        });
        Ok(())
    }
}

fn first_string(
    item: Option<&crate::deck::DeckItem>,
    keyword: &DeckKeyword,
) -> Result<String, DeckError> {
    let item = item.ok_or_else(|| {
        DeckError::at(
            ErrorKind::NoValue,
            keyword.location(),
            "missing string item",
        )
    })?;
    item.get_trimmed_string()
        .map_err(|e| e.with_location(keyword.location()))
}

fn check_combinations(
    schema: &KeywordSchema,
    deck: &Deck,
    location: &KeywordLocation,
    context: &ParseContext,
    guard: &mut ErrorGuard,
) -> Result<(), DeckError> {
    for required in &schema.requires {
        if !deck.has(required) {
            context.handle_error(
                guard,
                DeckError::at(
                    ErrorKind::InvalidKeywordCombination,
                    location,
                    format!("{} requires keyword {} earlier in the deck", schema.name, required),
                ),
            )?;
        }
    }
    for prohibited in &schema.prohibits {
        if deck.has(prohibited) {
            context.handle_error(
                guard,
                DeckError::at(
                    ErrorKind::InvalidKeywordCombination,
                    location,
                    format!("{} cannot be combined with keyword {}", schema.name, prohibited),
                ),
            )?;
        }
    }
    Ok(())
}

/// Answers the reader's sizing questions from the registry and the deck
/// parsed so far.
struct DeckSizer<'a> {
    registry: &'a SchemaRegistry,
    deck: &'a Deck,
    pending: Vec<DeckError>,
}

impl KeywordSizing for DeckSizer<'_> {
    fn is_recognized(&self, name: &str) -> bool {
        self.registry.is_recognized(name)
    }

    fn shape(&mut self, name: &str) -> KeywordShape {
        let registry = self.registry;
        let Some(schema) = registry.lookup(name) else {
            return KeywordShape {
                count: RecordCount::Fixed(0),
                raw: false,
            };
        };
        let count = match &schema.size {
            KeywordSize::Fixed(n) => RecordCount::Fixed(*n),
            KeywordSize::SlashTerminated => RecordCount::SlashTerminated,
            KeywordSize::Unknown => RecordCount::Unknown,
            KeywordSize::Title => RecordCount::Title,
            KeywordSize::FromKeyword {
                keyword,
                item,
                shift,
            } => {
                let (n, problems) =
                    resolve_deck_count(registry, self.deck, name, keyword, item, *shift);
                self.pending.extend(problems);
                RecordCount::Fixed(n)
            }
        };
        KeywordShape {
            count,
            raw: schema.is_raw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_context::InputErrorAction;
    use crate::schema::{ItemArity, ItemSchema};
    use crate::source::InMemoryProvider;
    use crate::value::Value;

    fn registry() -> Arc<SchemaRegistry> {
        let registry = SchemaRegistry::builder()
            .add(KeywordSchema::new("GRID", KeywordSize::Fixed(0)))
            .unwrap()
            .add(
                KeywordSchema::new("PORO", KeywordSize::Fixed(1)).with_items(vec![
                    ItemSchema::double("data")
                        .with_arity(ItemArity::All)
                        .with_dimension("1"),
                ]),
            )
            .unwrap()
            .add(
                KeywordSchema::new("DEPTH", KeywordSize::Fixed(1)).with_items(vec![
                    ItemSchema::double("data")
                        .with_arity(ItemArity::All)
                        .with_dimension("Length"),
                ]),
            )
            .unwrap()
            .add(
                KeywordSchema::new("TABDIMS", KeywordSize::Fixed(1)).with_items(vec![
                    ItemSchema::int("NTSFUN").with_default(Value::Int(1)),
                ]),
            )
            .unwrap()
            .add(
                KeywordSchema::new(
                    "SWFN",
                    KeywordSize::FromKeyword {
                        keyword: "TABDIMS".into(),
                        item: "NTSFUN".into(),
                        shift: 0,
                    },
                )
                .with_items(vec![ItemSchema::double("table").with_arity(ItemArity::All)]),
            )
            .unwrap()
            .add(
                KeywordSchema::new(
                    "SGFN",
                    KeywordSize::FromKeyword {
                        keyword: "TABDIMS".into(),
                        item: "NTSFUN".into(),
                        shift: 1,
                    },
                )
                .with_items(vec![ItemSchema::double("table").with_arity(ItemArity::All)]),
            )
            .unwrap()
            .add(
                KeywordSchema::new("EQLDIMS", KeywordSize::Fixed(1))
                    .with_items(vec![ItemSchema::int("NTEQUL")]),
            )
            .unwrap()
            .add(
                KeywordSchema::new(
                    "EQUIL",
                    KeywordSize::FromKeyword {
                        keyword: "EQLDIMS".into(),
                        item: "NTEQUL".into(),
                        shift: 0,
                    },
                )
                .with_items(vec![ItemSchema::double("DATUM")]),
            )
            .unwrap()
            .add(KeywordSchema::new("NEWTRANS", KeywordSize::Fixed(0)).requiring("GRID"))
            .unwrap()
            .build()
            .unwrap();
        Arc::new(registry)
    }

    fn parse(text: &str, ctx: &ParseContext) -> (Result<Deck, DeckError>, ErrorGuard) {
        let parser = DeckParser::new(registry());
        let mut guard = ErrorGuard::new();
        let result = parser.parse_string(text, ctx, &mut guard);
        (result, guard)
    }

    #[test]
    fn end_stops_parsing() {
        let (deck, _) = parse("GRID\nEND\nPORO\n 1 /\n", &ParseContext::new());
        let deck = deck.unwrap();
        assert_eq!(deck.size(), 1);
        assert!(!deck.has("END"));
    }

    #[test]
    fn unit_keyword_switches_conversion() {
        let (deck, _) = parse("DEPTH\n 1 /\nFIELD\nDEPTH\n 1 /\n", &ParseContext::new());
        let deck = deck.unwrap();
        let metric = deck.get("DEPTH", 0).unwrap().record(0).unwrap();
        let field = deck.get("DEPTH", 1).unwrap().record(0).unwrap();
        assert_eq!(metric.si_doubles("data").unwrap(), vec![1.0]);
        assert!((field.si_doubles("data").unwrap()[0] - 0.3048).abs() < 1e-12);
        assert_eq!(deck.active_unit_system().unit_type(), UnitType::Field);
        assert_eq!(deck.default_unit_system().unit_type(), UnitType::Metric);
        assert!(deck.has("FIELD"));
    }

    #[test]
    fn record_count_from_earlier_keyword() {
        let (deck, _) = parse(
            "TABDIMS\n 2 /\nSWFN\n 0.1 0.2 /\n 0.3 0.4 /\nGRID\n",
            &ParseContext::new(),
        );
        let deck = deck.unwrap();
        assert_eq!(deck.get("SWFN", 0).unwrap().len(), 2);
        assert!(deck.has("GRID"));
    }

    #[test]
    fn missing_sizing_keyword_falls_back_to_default() {
        let mut ctx = ParseContext::new();
        ctx.update(ErrorKind::MissingDimsKeyword, InputErrorAction::Warn);
        let (deck, guard) = parse("SWFN\n 0.1 0.2 /\nGRID\n", &ctx);
        let deck = deck.unwrap();
        assert_eq!(deck.get("SWFN", 0).unwrap().len(), 1);
        assert_eq!(guard.warnings()[0].kind, ErrorKind::MissingDimsKeyword);
        assert_eq!(guard.warnings()[0].location.as_ref().unwrap().keyword, "SWFN");

        let (result, _) = parse("SWFN\n 0.1 0.2 /\n", &ParseContext::new());
        assert_eq!(result.unwrap_err().kind, ErrorKind::MissingDimsKeyword);
    }

    #[test]
    fn shifted_record_count_overflow_is_an_arity_error() {
        let text = "TABDIMS\n 9223372036854775807 /\nSGFN\nGRID\n";
        let (result, _) = parse(text, &ParseContext::new());
        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
        assert_eq!(err.location.unwrap().keyword, "SGFN");

        let mut ctx = ParseContext::new();
        ctx.update(ErrorKind::ArityMismatch, InputErrorAction::Warn);
        let (deck, guard) = parse(text, &ctx);
        let deck = deck.unwrap();
        assert_eq!(deck.get("SGFN", 0).unwrap().len(), 0);
        assert!(deck.has("GRID"));
        assert_eq!(guard.warnings()[0].kind, ErrorKind::ArityMismatch);

        let (deck, _) = parse("TABDIMS\n 1 /\nSGFN\n 1 /\n 2 /\n", &ParseContext::new());
        assert_eq!(deck.unwrap().get("SGFN", 0).unwrap().len(), 2);
    }

    #[test]
    fn negative_record_count_is_clamped_to_zero() {
        let (deck, guard) = parse("TABDIMS\n -5 /\nSGFN\nGRID\n", &ParseContext::new());
        let deck = deck.unwrap();
        assert_eq!(deck.get("SGFN", 0).unwrap().len(), 0);
        assert!(deck.has("GRID"));
        assert!(guard.is_empty());
    }

    #[test]
    fn valueless_sizing_item_names_the_item() {
        let (result, _) = parse("EQLDIMS\n 1* /\nEQUIL\nGRID\n", &ParseContext::new());
        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoValue);
        assert!(err.message.contains("NTEQUL"));
        assert!(err.message.contains("EQLDIMS"));

        let mut ctx = ParseContext::new();
        ctx.update(ErrorKind::NoValue, InputErrorAction::Warn);
        let (deck, guard) = parse("EQLDIMS\n 1* /\nEQUIL\nGRID\n", &ctx);
        let deck = deck.unwrap();
        assert_eq!(deck.get("EQUIL", 0).unwrap().len(), 0);
        assert_eq!(guard.warnings().len(), 1);
        assert_eq!(guard.warnings()[0].kind, ErrorKind::NoValue);
    }

    #[test]
    fn unknown_keyword_throws_or_is_skipped() {
        let text = "GRID\nFOO\n 1 2 /\nPORO\n 0.2 /\n";
        let (result, _) = parse(text, &ParseContext::new());
        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownKeyword);
        assert_eq!(err.location.unwrap().line, 2);

        let mut ctx = ParseContext::new();
        ctx.update(ErrorKind::UnknownKeyword, InputErrorAction::Warn);
        let (deck, guard) = parse(text, &ctx);
        let deck = deck.unwrap();
        let names: Vec<&str> = deck.iter().map(DeckKeyword::name).collect();
        assert_eq!(names, ["GRID", "PORO"]);
        assert_eq!(guard.warnings().len(), 1);
    }

    #[test]
    fn warned_assembly_error_skips_keyword() {
        let mut ctx = ParseContext::new();
        ctx.update(ErrorKind::TypeMismatch, InputErrorAction::Warn);
        let (deck, guard) = parse("PORO\n abc /\nGRID\n", &ctx);
        let deck = deck.unwrap();
        assert!(!deck.has("PORO"));
        assert!(deck.has("GRID"));
        assert_eq!(guard.warnings()[0].kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn delayed_errors_collect_in_guard() {
        let mut ctx = ParseContext::new();
        ctx.update(ErrorKind::RandomText, InputErrorAction::Delayed);
        let (deck, guard) = parse("GRID\n 'junk'\nGRID\n", &ctx);
        assert_eq!(deck.unwrap().count("GRID"), 2);
        assert!(guard.has_errors());
    }

    #[test]
    fn long_keyword_is_truncated_with_warning() {
        let (deck, guard) = parse("GRID\nNEWTRANSX\n", &ParseContext::new());
        let deck = deck.unwrap();
        assert!(deck.has("NEWTRANS"));
        assert_eq!(guard.warnings()[0].kind, ErrorKind::LongKeyword);

        let mut ctx = ParseContext::new();
        ctx.update(ErrorKind::LongKeyword, InputErrorAction::Throw);
        let (result, _) = parse("GRID\nNEWTRANSX\n", &ctx);
        assert_eq!(result.unwrap_err().kind, ErrorKind::LongKeyword);
    }

    #[test]
    fn required_keyword_must_come_first() {
        let (result, _) = parse("NEWTRANS\nGRID\n", &ParseContext::new());
        assert_eq!(result.unwrap_err().kind, ErrorKind::InvalidKeywordCombination);
        let (deck, _) = parse("GRID\nNEWTRANS\n", &ParseContext::new());
        assert!(deck.unwrap().has("NEWTRANS"));
    }

    #[test]
    fn includes_resolve_through_paths_aliases() {
        let provider = InMemoryProvider::default()
            .with_file("/case/CASE.DATA", "PATHS\n 'INC' 'include' /\n/\nGRID\nINCLUDE\n '$INC/poro.inc' /\nGRID\n")
            .with_file("/case/include/poro.inc", "PORO\n 0.25 /\nENDINC\nPORO\n 0.5 /\n");
        let parser = DeckParser::new(registry()).with_provider(Box::new(provider));
        let mut guard = ErrorGuard::new();
        let deck = parser
            .parse_file(Path::new("/case/CASE.DATA"), &ParseContext::new(), &mut guard)
            .unwrap();

        let names: Vec<&str> = deck.iter().map(DeckKeyword::name).collect();
        assert_eq!(names, ["GRID", "PORO", "GRID"]);
        let poro = deck.get("PORO", 0).unwrap();
        assert_eq!(poro.location().file, "/case/include/poro.inc");
        assert_eq!(poro.location().line, 1);
        assert_eq!(deck.data_file(), Some("/case/CASE.DATA"));
    }

    #[test]
    fn missing_include_and_cycle() {
        let provider = InMemoryProvider::default()
            .with_file("/a/ROOT.DATA", "INCLUDE\n 'missing.inc' /\nINCLUDE\n 'loop.inc' /\nGRID\n")
            .with_file("/a/loop.inc", "INCLUDE\n 'loop.inc' /\nPORO\n 1 /\n");
        let parser = DeckParser::new(registry()).with_provider(Box::new(provider));

        let mut guard = ErrorGuard::new();
        let err = parser
            .parse_file(Path::new("/a/ROOT.DATA"), &ParseContext::new(), &mut guard)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingInclude);

        let ctx = ParseContext::with_action(InputErrorAction::Warn);
        let mut guard = ErrorGuard::new();
        let deck = parser
            .parse_file(Path::new("/a/ROOT.DATA"), &ctx, &mut guard)
            .unwrap();
        let kinds: Vec<ErrorKind> = guard.warnings().iter().map(|w| w.kind).collect();
        assert_eq!(kinds, [ErrorKind::MissingInclude, ErrorKind::IncludeCycle]);
        assert_eq!(deck.count("PORO"), 1);
        assert!(deck.has("GRID"));
    }

    #[test]
    fn unreadable_root_is_fatal() {
        let parser = DeckParser::new(registry()).with_provider(Box::new(InMemoryProvider::default()));
        let mut guard = ErrorGuard::new();
        let err = parser
            .parse_file(Path::new("/nowhere.DATA"), &ParseContext::with_action(InputErrorAction::Ignore), &mut guard)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }
}

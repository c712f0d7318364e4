use std::path::Path;
use std::sync::Arc;

use ecldeck_core::{Deck, DeckError, DeckParser, ErrorGuard, ParseContext, SchemaRegistry};

#[allow(dead_code)]
pub fn fixture_registry() -> Arc<SchemaRegistry> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/keywords");
    Arc::new(
        SchemaRegistry::from_dir(&dir)
            .unwrap_or_else(|e| panic!("failed to load fixtures from {}: {}", dir.display(), e)),
    )
}

#[allow(dead_code)]
pub fn parse(text: &str) -> Deck {
    let mut guard = ErrorGuard::new();
    let deck = DeckParser::new(fixture_registry())
        .parse_string(text, &ParseContext::new(), &mut guard)
        .unwrap_or_else(|e| panic!("parse failed:\n{}", e));
    assert!(guard.is_empty(), "unexpected diagnostics:\n{}", guard.dump());
    deck
}

#[allow(dead_code)]
pub fn parse_with(text: &str, context: &ParseContext) -> (Result<Deck, DeckError>, ErrorGuard) {
    let mut guard = ErrorGuard::new();
    let result = DeckParser::new(fixture_registry()).parse_string(text, context, &mut guard);
    (result, guard)
}

//! One registry shared by parsers on several threads.

mod common;

use std::sync::Arc;
use std::thread;

use common::fixture_registry;
use ecldeck_core::{DeckParser, ErrorGuard, ParseContext};

#[test]
fn parsers_share_one_registry_across_threads() {
    let registry = fixture_registry();

    let handles: Vec<_> = (1..=8)
        .map(|n| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let parser = DeckParser::new(registry);
                let text = format!("DIMENS\n {} 1 1 /\nGRID\nPORO\n {}*0.2 /\n", n, n);
                let mut guard = ErrorGuard::new();
                let deck = parser
                    .parse_string(&text, &ParseContext::new(), &mut guard)
                    .unwrap();
                let nx = deck
                    .get("DIMENS", 0)
                    .unwrap()
                    .record(0)
                    .unwrap()
                    .item("NX")
                    .unwrap()
                    .get_int()
                    .unwrap();
                let cells = deck.get("PORO", 0).unwrap().record(0).unwrap().len();
                (n, nx, cells)
            })
        })
        .collect();

    for handle in handles {
        let (n, nx, cells) = handle.join().unwrap();
        assert_eq!(nx, n as i64);
        assert_eq!(cells, n);
    }
    assert_eq!(Arc::strong_count(&registry), 1);
}

use crate::error::DeckError;

/// Accumulates the non-fatal errors of a parse.
///
/// Errors escalated as `Warn` or `Ignore` land in [`warnings`], errors
/// escalated as `Delayed` land in [`errors`]. After a parse the caller
/// inspects the guard and decides what to do with a deck that produced
/// delayed errors.
///
/// [`warnings`]: ErrorGuard::warnings
/// [`errors`]: ErrorGuard::errors
#[derive(Debug, Clone, Default)]
pub struct ErrorGuard {
    warnings: Vec<DeckError>,
    errors: Vec<DeckError>,
}

impl ErrorGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, error: DeckError) {
        self.warnings.push(error);
    }

    pub fn add_error(&mut self, error: DeckError) {
        self.errors.push(error);
    }

    pub fn warnings(&self) -> &[DeckError] {
        &self.warnings
    }

    pub fn errors(&self) -> &[DeckError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    pub fn clear(&mut self) {
        self.warnings.clear();
        self.errors.clear();
    }

    /// One line per entry, errors first, in the form `KIND: message`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (label, list) in [("error", &self.errors), ("warning", &self.warnings)] {
            for err in list {
                let location = err
                    .location
                    .as_ref()
                    .map(|l| format!(" [{} {}:{}]", l.keyword, l.file, l.line))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "{} {}{}: {}\n",
                    label,
                    err.kind.key(),
                    location,
                    err.message
                ));
            }
        }
        out
    }
}

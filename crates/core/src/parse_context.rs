use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use serde::Serialize;

use crate::error::{DeckError, ErrorKind};
use crate::error_guard::ErrorGuard;

/// What to do when a given kind of error is encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InputErrorAction {
    /// Abort the parse with the error.
    Throw,
    /// Log, record as a warning and continue.
    Warn,
    /// Record as a warning without logging and continue.
    Ignore,
    /// Log, record as an error and continue; the caller decides afterwards.
    Delayed,
}

/// Environment variables read by [`ParseContext::from_env`], in the order
/// they are applied.
pub const ENV_OVERRIDES: [(&str, InputErrorAction); 4] = [
    ("DECK_ERRORS_THROW", InputErrorAction::Throw),
    ("DECK_ERRORS_WARN", InputErrorAction::Warn),
    ("DECK_ERRORS_IGNORE", InputErrorAction::Ignore),
    ("DECK_ERRORS_DELAYED", InputErrorAction::Delayed),
];

/// Per-error-kind escalation policy injected into every parse.
#[derive(Debug, Clone)]
pub struct ParseContext {
    actions: BTreeMap<ErrorKind, InputErrorAction>,
    ignored_keywords: BTreeSet<String>,
}

impl Default for ParseContext {
    fn default() -> Self {
        let actions = ErrorKind::ALL
            .into_iter()
            .map(|kind| {
                let action = match kind {
                    ErrorKind::LongKeyword => InputErrorAction::Warn,
                    _ => InputErrorAction::Throw,
                };
                (kind, action)
            })
            .collect();
        ParseContext {
            actions,
            ignored_keywords: BTreeSet::new(),
        }
    }
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context with every kind mapped to `action`.
    pub fn with_action(action: InputErrorAction) -> Self {
        let mut ctx = Self::default();
        ctx.update_all(action);
        ctx
    }

    /// Defaults overridden by the `DECK_ERRORS_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with an injected variable lookup.
    ///
    /// Each variable holds keys separated by `:` or `|`; keys containing
    /// `*` are patterns. Unknown keys are ignored.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut ctx = Self::default();
        for (var, action) in ENV_OVERRIDES {
            let Some(value) = lookup(var) else { continue };
            for key in value.split([':', '|']).map(str::trim).filter(|k| !k.is_empty()) {
                ctx.update_pattern(key, action);
            }
        }
        ctx
    }

    pub fn update(&mut self, kind: ErrorKind, action: InputErrorAction) {
        self.actions.insert(kind, action);
    }

    pub fn update_all(&mut self, action: InputErrorAction) {
        for value in self.actions.values_mut() {
            *value = action;
        }
    }

    /// Apply `action` to every kind whose key matches `pattern`, where `*`
    /// matches any run of characters. Returns the number of kinds updated.
    pub fn update_pattern(&mut self, pattern: &str, action: InputErrorAction) -> usize {
        if !pattern.contains('*') {
            return match ErrorKind::from_key(pattern) {
                Some(kind) => {
                    self.update(kind, action);
                    1
                }
                None => 0,
            };
        }

        let source = format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"));
        let Ok(re) = Regex::new(&source) else {
            return 0;
        };
        let mut updated = 0;
        for (kind, value) in self.actions.iter_mut() {
            if re.is_match(kind.key()) {
                *value = action;
                updated += 1;
            }
        }
        updated
    }

    pub fn action(&self, kind: ErrorKind) -> InputErrorAction {
        self.actions
            .get(&kind)
            .copied()
            .unwrap_or(InputErrorAction::Throw)
    }

    /// Silence unknown-keyword errors for one keyword name.
    pub fn ignore_keyword(&mut self, name: &str) {
        self.ignored_keywords.insert(name.trim().to_ascii_uppercase());
    }

    pub fn is_keyword_ignored(&self, name: &str) -> bool {
        self.ignored_keywords.contains(name)
    }

    /// Escalate `error` according to the configured action.
    ///
    /// Returns `Err` only when the action is `Throw`; every other action
    /// records the error in `guard` and lets the caller continue.
    pub fn handle_error(&self, guard: &mut ErrorGuard, error: DeckError) -> Result<(), DeckError> {
        if error.kind == ErrorKind::UnknownKeyword {
            if let Some(loc) = &error.location {
                if self.is_keyword_ignored(&loc.keyword) {
                    return Ok(());
                }
            }
        }

        match self.action(error.kind) {
            InputErrorAction::Throw => Err(error),
            InputErrorAction::Warn => {
                tracing::warn!(kind = error.kind.key(), "{}", error);
                guard.add_warning(error);
                Ok(())
            }
            InputErrorAction::Ignore => {
                guard.add_warning(error);
                Ok(())
            }
            InputErrorAction::Delayed => {
                tracing::error!(kind = error.kind.key(), "{}", error);
                guard.add_error(error);
                Ok(())
            }
        }
    }
}

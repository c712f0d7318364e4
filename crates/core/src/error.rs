use serde::Serialize;

use ecldeck_units::UnitError;

/// Classification of everything that can go wrong while reading a deck.
///
/// Each kind has a stable key (`PARSE_UNKNOWN_KEYWORD`, ...) used by
/// [`ParseContext`](crate::ParseContext) configuration and in messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ErrorKind {
    UnknownKeyword,
    MalformedRecord,
    ArityMismatch,
    TypeMismatch,
    NoValue,
    UnknownDimension,
    InvalidDimension,
    UnknownUnitSystem,
    DuplicateDimension,
    UnitConversion,
    InvalidRepeatCount,
    LongKeyword,
    RandomText,
    RandomSlash,
    MissingDimsKeyword,
    MissingInclude,
    IncludeCycle,
    InvalidKeywordCombination,
    Io,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 19] = [
        ErrorKind::UnknownKeyword,
        ErrorKind::MalformedRecord,
        ErrorKind::ArityMismatch,
        ErrorKind::TypeMismatch,
        ErrorKind::NoValue,
        ErrorKind::UnknownDimension,
        ErrorKind::InvalidDimension,
        ErrorKind::UnknownUnitSystem,
        ErrorKind::DuplicateDimension,
        ErrorKind::UnitConversion,
        ErrorKind::InvalidRepeatCount,
        ErrorKind::LongKeyword,
        ErrorKind::RandomText,
        ErrorKind::RandomSlash,
        ErrorKind::MissingDimsKeyword,
        ErrorKind::MissingInclude,
        ErrorKind::IncludeCycle,
        ErrorKind::InvalidKeywordCombination,
        ErrorKind::Io,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ErrorKind::UnknownKeyword => "PARSE_UNKNOWN_KEYWORD",
            ErrorKind::MalformedRecord => "PARSE_MALFORMED_RECORD",
            ErrorKind::ArityMismatch => "PARSE_ARITY_MISMATCH",
            ErrorKind::TypeMismatch => "PARSE_TYPE_MISMATCH",
            ErrorKind::NoValue => "PARSE_NO_VALUE",
            ErrorKind::UnknownDimension => "UNIT_UNKNOWN_DIMENSION",
            ErrorKind::InvalidDimension => "UNIT_INVALID_DIMENSION",
            ErrorKind::UnknownUnitSystem => "UNIT_UNKNOWN_SYSTEM",
            ErrorKind::DuplicateDimension => "UNIT_DUPLICATE_DIMENSION",
            ErrorKind::UnitConversion => "UNIT_CONVERSION_ERROR",
            ErrorKind::InvalidRepeatCount => "PARSE_INVALID_REPEAT_COUNT",
            ErrorKind::LongKeyword => "PARSE_LONG_KEYWORD",
            ErrorKind::RandomText => "PARSE_RANDOM_TEXT",
            ErrorKind::RandomSlash => "PARSE_RANDOM_SLASH",
            ErrorKind::MissingDimsKeyword => "PARSE_MISSING_DIMS_KEYWORD",
            ErrorKind::MissingInclude => "PARSE_MISSING_INCLUDE",
            ErrorKind::IncludeCycle => "PARSE_INCLUDE_CYCLE",
            ErrorKind::InvalidKeywordCombination => "PARSE_INVALID_KEYWORD_COMBINATION",
            ErrorKind::Io => "PARSE_IO_ERROR",
        }
    }

    pub fn from_key(key: &str) -> Option<ErrorKind> {
        ErrorKind::ALL.into_iter().find(|k| k.key() == key)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Where a keyword starts: its name, the file it was read from and the
/// line of the keyword name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct KeywordLocation {
    pub keyword: String,
    pub file: String,
    pub line: u32,
}

impl KeywordLocation {
    pub fn new(keyword: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        KeywordLocation {
            keyword: keyword.into(),
            file: file.into(),
            line,
        }
    }
}

/// A reported deck error: a kind, the keyword location if one is known,
/// and a human-readable message.
///
/// Parse-time errors are routed through [`ParseContext::handle_error`]
/// which decides whether they abort the parse.
///
/// [`ParseContext::handle_error`]: crate::ParseContext::handle_error
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{}{message}", header(.location))]
pub struct DeckError {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<KeywordLocation>,
    pub message: String,
}

fn header(location: &Option<KeywordLocation>) -> String {
    match location {
        Some(loc) => format!(
            "Problem with keyword {}\nIn {} line {}\n",
            loc.keyword, loc.file, loc.line
        ),
        None => String::new(),
    }
}

impl DeckError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        DeckError {
            kind,
            location: None,
            message: message.into(),
        }
    }

    pub fn at(kind: ErrorKind, location: &KeywordLocation, message: impl Into<String>) -> Self {
        DeckError {
            kind,
            location: Some(location.clone()),
            message: message.into(),
        }
    }

    /// Attach a location unless one is already present.
    pub fn with_location(mut self, location: &KeywordLocation) -> Self {
        if self.location.is_none() {
            self.location = Some(location.clone());
        }
        self
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "kind":     self.kind.key(),
            "keyword":  self.location.as_ref().map(|l| l.keyword.as_str()),
            "file":     self.location.as_ref().map(|l| l.file.as_str()),
            "line":     self.location.as_ref().map(|l| l.line),
            "message":  self.message,
        })
    }
}

impl From<UnitError> for DeckError {
    fn from(err: UnitError) -> Self {
        let kind = match &err {
            UnitError::UnknownDimension { .. } => ErrorKind::UnknownDimension,
            UnitError::InvalidDimension { .. } => ErrorKind::InvalidDimension,
            UnitError::UnknownSystem(_) => ErrorKind::UnknownUnitSystem,
            UnitError::DuplicateDimension { .. } => ErrorKind::DuplicateDimension,
        };
        DeckError::new(kind, err.to_string())
    }
}

/// Failures while building a [`SchemaRegistry`](crate::SchemaRegistry).
///
/// These are initialization errors and never pass through the parse
/// error policy.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid keyword definition JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read keyword definitions from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("keyword {keyword}: item {item}: {reason}")]
    InvalidItem {
        keyword: String,
        item: String,
        reason: String,
    },

    #[error("keyword {keyword}: {reason}")]
    InvalidKeyword { keyword: String, reason: String },

    #[error("keyword {keyword}: invalid deck_name_regex: {source}")]
    InvalidRegex {
        keyword: String,
        #[source]
        source: regex::Error,
    },

    #[error("keyword {0} is defined more than once")]
    DuplicateKeyword(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_round_trips_through_its_key() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(ErrorKind::from_key("PARSE_NOTHING"), None);
    }

    #[test]
    fn unit_errors_keep_their_own_kind() {
        let cases = [
            (
                UnitError::UnknownDimension {
                    system: "Metric".into(),
                    dimension: "Luminosity".into(),
                },
                ErrorKind::UnknownDimension,
            ),
            (
                UnitError::InvalidDimension {
                    expression: "Length//Time".into(),
                    reason: "empty factor".into(),
                },
                ErrorKind::InvalidDimension,
            ),
            (UnitError::UnknownSystem("IMPERIAL".into()), ErrorKind::UnknownUnitSystem),
            (
                UnitError::DuplicateDimension {
                    system: "Metric".into(),
                    dimension: "Length".into(),
                },
                ErrorKind::DuplicateDimension,
            ),
        ];
        for (unit_error, kind) in cases {
            let message = unit_error.to_string();
            let err = DeckError::from(unit_error);
            assert_eq!(err.kind, kind);
            assert_eq!(err.message, message);
        }
        assert_eq!(ErrorKind::UnknownUnitSystem.key(), "UNIT_UNKNOWN_SYSTEM");
    }

    #[test]
    fn display_includes_location_header() {
        let loc = KeywordLocation::new("EQUIL", "CASE.DATA", 12);
        let err = DeckError::at(ErrorKind::TypeMismatch, &loc, "expected integer");
        assert_eq!(
            err.to_string(),
            "Problem with keyword EQUIL\nIn CASE.DATA line 12\nexpected integer"
        );
        assert_eq!(
            DeckError::new(ErrorKind::NoValue, "no value").to_string(),
            "no value"
        );
    }

    #[test]
    fn with_location_keeps_existing() {
        let first = KeywordLocation::new("A", "f", 1);
        let second = KeywordLocation::new("B", "g", 2);
        let err = DeckError::at(ErrorKind::RandomText, &first, "x").with_location(&second);
        assert_eq!(err.location, Some(first));
    }

    #[test]
    fn json_value_shape() {
        let loc = KeywordLocation::new("PORO", "a.data", 3);
        let err = DeckError::at(ErrorKind::ArityMismatch, &loc, "too many items");
        let json = err.to_json_value();
        assert_eq!(json["kind"], "PARSE_ARITY_MISMATCH");
        assert_eq!(json["line"], 3);
        assert_eq!(json["keyword"], "PORO");
    }
}

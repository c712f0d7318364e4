//! Line-oriented deck lexer.
//!
//! [`RawKeywordReader`] walks the input a keyword at a time, grouping the
//! lines that follow a keyword name into `/`-terminated [`RawRecord`]s.
//! Records keep their text; [`RawRecord::tokenize`] splits a record into
//! [`Token`]s and expands repeat counts when the assembler asks for them.

use std::sync::Arc;

use crate::error::{DeckError, ErrorKind, KeywordLocation};

/// Significant characters of a keyword name in legacy decks.
pub const MAX_KEYWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Unquoted literal, kept as written.
    Word(String),
    /// Quoted string literal (content without the quotes).
    Quoted(String),
    /// A default-requested slot: `*`, or one copy of `N*`.
    Default,
}

impl Token {
    pub fn text(&self) -> Option<&str> {
        match self {
            Token::Word(s) | Token::Quoted(s) => Some(s),
            Token::Default => None,
        }
    }
}

/// The text of one record, without its terminating `/`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    text: String,
    line: u32,
    verbatim: bool,
}

impl RawRecord {
    pub fn new(text: impl Into<String>, line: u32) -> Self {
        RawRecord {
            text: text.into(),
            line,
            verbatim: false,
        }
    }

    /// A record whose whole text is one token.
    pub fn verbatim(text: impl Into<String>, line: u32) -> Self {
        RawRecord {
            text: text.into(),
            line,
            verbatim: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Line on which the record starts.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Split the record into tokens.
    ///
    /// In raw mode every chunk is kept verbatim, quotes included, and `*`
    /// has no special meaning.
    pub fn tokenize(&self, raw: bool) -> Result<Vec<Token>, DeckError> {
        if self.verbatim {
            return Ok(vec![Token::Word(self.text.trim().to_string())]);
        }

        let chars: Vec<char> = self.text.chars().collect();
        let mut tokens = Vec::new();
        let mut pos = 0usize;

        while pos < chars.len() {
            let c = chars[pos];
            if c.is_whitespace() {
                pos += 1;
                continue;
            }

            if is_quote(c) {
                let (content, next) = self.read_quoted(&chars, pos)?;
                pos = next;
                tokens.push(if raw {
                    Token::Word(format!("{}{}{}", c, content, c))
                } else {
                    Token::Quoted(content)
                });
                continue;
            }

            let start = pos;
            while pos < chars.len() && !chars[pos].is_whitespace() && !is_quote(chars[pos]) {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            let Some((count, value)) = word.split_once('*').filter(|_| !raw) else {
                tokens.push(Token::Word(word));
                continue;
            };

            // `3*'OIL'`: the repeated value is the quoted string that follows.
            let repeated = if value.is_empty() && pos < chars.len() && is_quote(chars[pos]) {
                let (content, next) = self.read_quoted(&chars, pos)?;
                pos = next;
                Some(Token::Quoted(content))
            } else if value.is_empty() {
                None
            } else {
                Some(Token::Word(value.to_string()))
            };

            if count.is_empty() {
                if repeated.is_some() {
                    return Err(self.repeat_error(&word, "a value requires a repeat count"));
                }
                tokens.push(Token::Default);
                continue;
            }

            let n = parse_repeat_count(count)
                .ok_or_else(|| self.repeat_error(&word, "count must be a positive integer"))?;
            let token = repeated.unwrap_or(Token::Default);
            tokens.extend(std::iter::repeat(token).take(n));
        }

        Ok(tokens)
    }

    fn read_quoted(&self, chars: &[char], open: usize) -> Result<(String, usize), DeckError> {
        let quote = chars[open];
        let mut pos = open + 1;
        let mut content = String::new();
        while pos < chars.len() {
            if chars[pos] == quote {
                return Ok((content, pos + 1));
            }
            if chars[pos] == '\n' {
                break;
            }
            content.push(chars[pos]);
            pos += 1;
        }
        Err(DeckError::new(
            ErrorKind::MalformedRecord,
            format!("unterminated quoted string in record starting at line {}", self.line),
        ))
    }

    fn repeat_error(&self, word: &str, reason: &str) -> DeckError {
        DeckError::new(
            ErrorKind::InvalidRepeatCount,
            format!(
                "invalid repeat count in '{}' at line {}: {}",
                word, self.line, reason
            ),
        )
    }
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

fn parse_repeat_count(count: &str) -> Option<usize> {
    if !count.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    count.parse::<usize>().ok().filter(|n| *n > 0)
}

/// Discard a trailing `--` comment, unless the marker is inside quotes.
pub fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let bytes = line.as_bytes();
    for (i, c) in line.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if is_quote(c) => quote = Some(c),
            None if c == '-' && bytes.get(i + 1) == Some(&b'-') => return &line[..i],
            None => {}
        }
    }
    line
}

/// Byte offset of the first `/` outside quotes.
pub fn find_terminator(line: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if is_quote(c) => quote = Some(c),
            None if c == '/' => return Some(i),
            None => {}
        }
    }
    None
}

/// A keyword name starts with an ASCII letter and continues with ASCII
/// letters, digits, `_`, `-` or `+`.
pub fn is_valid_keyword_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+'))
}

/// The first word of a line, up to whitespace or `/`.
fn keyword_candidate(line: &str) -> &str {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(line.len());
    &line[..end]
}

/// How the records following a keyword name are delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordCount {
    Fixed(usize),
    SlashTerminated,
    Unknown,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordShape {
    pub count: RecordCount,
    pub raw: bool,
}

/// Supplies keyword knowledge to the reader as it advances.
///
/// Record counts can depend on keywords parsed earlier, so the reader asks
/// for the shape of each keyword at the moment its name is read.
pub trait KeywordSizing {
    fn is_recognized(&self, name: &str) -> bool;

    /// Called only for recognised names.
    fn shape(&mut self, name: &str) -> KeywordShape;
}

/// A keyword block as read from the input, before schema assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct RawKeyword {
    pub name: String,
    pub location: KeywordLocation,
    pub records: Vec<RawRecord>,
    pub raw: bool,
    /// False for a name the sizing did not recognise; its block has been
    /// skipped up to the next recognised keyword.
    pub recognized: bool,
    /// The name as written, when it was longer than
    /// [`MAX_KEYWORD_LENGTH`] and truncated to a recognised keyword.
    pub truncated_from: Option<String>,
}

/// Lazy reader over one input buffer, yielding one [`RawKeyword`] per step.
///
/// Cloning a reader captures its position; [`rewind`](Self::rewind) returns
/// to the start of the buffer. After an error the reader has moved past the
/// offending input, so the caller may continue.
#[derive(Debug, Clone)]
pub struct RawKeywordReader {
    text: Arc<str>,
    file: Arc<str>,
    pos: usize,
    line: u32,
    skipping: bool,
}

impl RawKeywordReader {
    pub fn new(text: impl Into<Arc<str>>, file: impl Into<Arc<str>>) -> Self {
        RawKeywordReader {
            text: text.into(),
            file: file.into(),
            pos: 0,
            line: 0,
            skipping: false,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Number of the last line consumed.
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub fn rewind(&mut self) {
        self.pos = 0;
        self.line = 0;
        self.skipping = false;
    }

    /// Read the next keyword block. Returns `None` at end of input.
    pub fn next_keyword(
        &mut self,
        sizing: &mut dyn KeywordSizing,
    ) -> Option<Result<RawKeyword, DeckError>> {
        let text = Arc::clone(&self.text);
        loop {
            let (start, end, line_no) = self.advance_line()?;
            let line = strip_comment(&text[start..end]).trim();
            if line.is_empty() {
                continue;
            }

            let upper = keyword_candidate(line).to_ascii_uppercase();
            if self.skipping {
                if upper == "ENDSKIP" {
                    self.skipping = false;
                }
                continue;
            }

            if upper.is_empty() {
                let here = KeywordLocation::new("/", &*self.file, line_no);
                return Some(Err(DeckError::at(
                    ErrorKind::RandomSlash,
                    &here,
                    "extra '/' detected outside of a keyword",
                )));
            }
            if !is_valid_keyword_name(&upper) {
                let here = KeywordLocation::new(upper, &*self.file, line_no);
                return Some(Err(DeckError::at(
                    ErrorKind::RandomText,
                    &here,
                    format!("unrecognized text '{}' outside of a keyword", line),
                )));
            }

            let Some((name, truncated_from)) = resolve_name(&upper, &*sizing) else {
                self.skip_unknown_block(&text, &*sizing);
                return Some(Ok(RawKeyword {
                    location: KeywordLocation::new(&upper, &*self.file, line_no),
                    name: upper,
                    records: Vec::new(),
                    raw: false,
                    recognized: false,
                    truncated_from: None,
                }));
            };

            match name.as_str() {
                "SKIP" => {
                    self.skipping = true;
                    continue;
                }
                "ENDSKIP" => continue,
                _ => {}
            }

            let shape = sizing.shape(&name);
            let location = KeywordLocation::new(&name, &*self.file, line_no);
            return Some(
                self.read_records(&text, &location, shape, &*sizing)
                    .map(|records| RawKeyword {
                        name,
                        location,
                        records,
                        raw: shape.raw,
                        recognized: true,
                        truncated_from,
                    }),
            );
        }
    }

    fn read_records(
        &mut self,
        text: &str,
        location: &KeywordLocation,
        shape: KeywordShape,
        sizing: &dyn KeywordSizing,
    ) -> Result<Vec<RawRecord>, DeckError> {
        let unterminated =
            || DeckError::at(ErrorKind::MalformedRecord, location, "keyword is not properly terminated");
        let mut records = Vec::new();

        match shape.count {
            RecordCount::Fixed(0) => {}
            RecordCount::Title => loop {
                let (start, end, line_no) = self.advance_line().ok_or_else(unterminated)?;
                let line = strip_comment(&text[start..end]).trim();
                if !line.is_empty() {
                    records.push(RawRecord::verbatim(line, line_no));
                    break;
                }
            },
            count => {
                let mut pending = String::new();
                let mut pending_line = 0;
                loop {
                    if count == RecordCount::Unknown {
                        match self.line_bounds(self.pos) {
                            Some((start, end, _)) if is_keyword_line(&text[start..end], sizing) => {
                                break
                            }
                            _ => {}
                        }
                    }

                    let Some((start, end, line_no)) = self.advance_line() else {
                        if count != RecordCount::Unknown {
                            return Err(unterminated());
                        }
                        if !pending.trim().is_empty() {
                            records.push(RawRecord::new(pending, pending_line));
                        }
                        break;
                    };

                    let line = strip_comment(&text[start..end]);
                    if line.trim().is_empty() {
                        continue;
                    }
                    if pending.is_empty() {
                        pending_line = line_no;
                    }

                    let Some(idx) = find_terminator(line) else {
                        pending.push_str(line);
                        pending.push('\n');
                        continue;
                    };

                    let before = &line[..idx];
                    if count == RecordCount::SlashTerminated
                        && pending.trim().is_empty()
                        && before.trim().is_empty()
                    {
                        break;
                    }
                    pending.push_str(before);
                    records.push(RawRecord::new(std::mem::take(&mut pending), pending_line));
                    if count == RecordCount::Fixed(records.len()) {
                        break;
                    }
                }
            }
        }

        Ok(records)
    }

    fn skip_unknown_block(&mut self, text: &str, sizing: &dyn KeywordSizing) {
        while let Some((start, end, _)) = self.line_bounds(self.pos) {
            if is_keyword_line(&text[start..end], sizing) {
                break;
            }
            self.advance_line();
        }
    }

    /// `(start, end, next)` byte offsets of the line starting at `from`,
    /// excluding the line break.
    fn line_bounds(&self, from: usize) -> Option<(usize, usize, usize)> {
        if from >= self.text.len() {
            return None;
        }
        let rest = &self.text[from..];
        let (len, advance) = match rest.find('\n') {
            Some(i) => (i, i + 1),
            None => (rest.len(), rest.len()),
        };
        let mut end = from + len;
        if self.text[from..end].ends_with('\r') {
            end -= 1;
        }
        Some((from, end, from + advance))
    }

    fn advance_line(&mut self) -> Option<(usize, usize, u32)> {
        let (start, end, next) = self.line_bounds(self.pos)?;
        self.pos = next;
        self.line += 1;
        Some((start, end, self.line))
    }
}

fn resolve_name(name: &str, sizing: &dyn KeywordSizing) -> Option<(String, Option<String>)> {
    if sizing.is_recognized(name) {
        return Some((name.to_string(), None));
    }
    if name.len() > MAX_KEYWORD_LENGTH {
        let short = &name[..MAX_KEYWORD_LENGTH];
        if sizing.is_recognized(short) {
            return Some((short.to_string(), Some(name.to_string())));
        }
    }
    None
}

fn is_keyword_line(line: &str, sizing: &dyn KeywordSizing) -> bool {
    let line = strip_comment(line).trim();
    let upper = keyword_candidate(line).to_ascii_uppercase();
    is_valid_keyword_name(&upper) && resolve_name(&upper, sizing).is_some()
}

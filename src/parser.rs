//! TOML text to syntax events.
//!
//! This module provides the [`Parser`], a single-pass cursor over the input
//! that yields one [`Event`] per key/value line or table header. Inline
//! tables and arrays are resolved on the spot and arrive inside
//! [`Event::KeyValue`].
//!
//! ## Overview
//!
//! - **Single pass**: no backtracking beyond a few characters of lookahead
//! - **Lazy**: events are produced on demand ([`Parser::next_event`] or the
//!   `Iterator` impl), so the tree builder can fail fast
//! - **Error reporting**: every error carries line and column
//!
//! ## Usage
//!
//! Most users should use [`from_str`](crate::from_str). Driving the parser
//! by hand looks like this:
//!
//! ```rust
//! use toml_codec::{Event, Parser};
//!
//! let mut parser = Parser::new("[server]\nport = 8080\n");
//! let first = parser.next_event().unwrap().unwrap();
//! assert!(matches!(first, Event::Table { .. }));
//! let second = parser.next_event().unwrap().unwrap();
//! assert!(matches!(second, Event::KeyValue { .. }));
//! assert!(parser.next_event().unwrap().is_none());
//! ```

use crate::builder::insert_dotted;
use crate::{Error, Event, KeyPath, ParseOptions, Position, Result, TomlTable, TomlValue};
use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
use std::collections::HashSet;

/// The TOML event parser.
///
/// Created via [`Parser::new`] or [`Parser::with_options`].
pub struct Parser<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
    depth: usize,
    options: ParseOptions,
    finished: bool,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    pub fn with_options(input: &'a str, options: ParseOptions) -> Self {
        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
        Parser {
            input,
            position: 0,
            line: 1,
            column: 1,
            depth: 0,
            options,
            finished: false,
        }
    }

    /// Returns the next event, or `None` at the end of the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] on malformed input, or [`Error::Build`] when
    /// an inline table defines the same key twice in incompatible ways.
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        loop {
            self.skip_whitespace();
            match self.peek_char() {
                None => return Ok(None),
                Some('#') => {
                    self.skip_comment()?;
                    self.expect_line_end()?;
                }
                Some('\n') | Some('\r') => self.expect_newline()?,
                Some('[') => {
                    let event = self.parse_header()?;
                    self.expect_line_end()?;
                    return Ok(Some(event));
                }
                Some(_) => {
                    let event = self.parse_key_value()?;
                    self.expect_line_end()?;
                    return Ok(Some(event));
                }
            }
        }
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn error(&self, msg: &str) -> Error {
        Error::syntax(self.line, self.column, msg)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn advance(&mut self, count: usize) {
        for _ in 0..count {
            self.next_char();
        }
    }

    fn expect_char(&mut self, expected: char, what: &str) -> Result<()> {
        if self.peek_char() == Some(expected) {
            self.next_char();
            Ok(())
        } else {
            Err(self.error(&format!("expected {}", what)))
        }
    }

    /// Skips spaces and tabs on the current line.
    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t') = self.peek_char() {
            self.next_char();
        }
    }

    fn skip_comment(&mut self) -> Result<()> {
        self.next_char(); // '#'
        while let Some(ch) = self.peek_char() {
            match ch {
                '\n' | '\r' => break,
                '\t' => {}
                c if c.is_control() => {
                    return Err(self.error("control character in comment"));
                }
                _ => {}
            }
            self.next_char();
        }
        Ok(())
    }

    fn expect_newline(&mut self) -> Result<()> {
        match self.peek_char() {
            Some('\n') => {
                self.next_char();
                Ok(())
            }
            Some('\r') if self.peek_nth(1) == Some('\n') => {
                self.advance(2);
                Ok(())
            }
            _ => Err(self.error("expected a newline")),
        }
    }

    /// After a key/value or header only a comment may follow on the same line.
    fn expect_line_end(&mut self) -> Result<()> {
        self.skip_whitespace();
        if self.peek_char() == Some('#') {
            self.skip_comment()?;
        }
        match self.peek_char() {
            None => Ok(()),
            Some('\n' | '\r') => self.expect_newline(),
            Some(_) => Err(self.error("expected a newline after the value")),
        }
    }

    /// Skips whitespace, newlines and comments between array elements.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace();
            match self.peek_char() {
                Some('#') => self.skip_comment()?,
                Some('\n' | '\r') => self.expect_newline()?,
                _ => return Ok(()),
            }
        }
    }

    fn parse_header(&mut self) -> Result<Event> {
        let position = self.here();
        self.next_char(); // '['
        let is_array = self.peek_char() == Some('[');
        if is_array {
            self.next_char();
        }
        self.skip_whitespace();
        let path = self.parse_key()?;
        self.skip_whitespace();
        self.expect_char(']', "']' to close the table header")?;
        if is_array {
            self.expect_char(']', "']]' to close the array-of-tables header")?;
            Ok(Event::ArrayTable { path, position })
        } else {
            Ok(Event::Table { path, position })
        }
    }

    fn parse_key_value(&mut self) -> Result<Event> {
        let position = self.here();
        let key = self.parse_key()?;
        self.skip_whitespace();
        self.expect_char('=', "'=' after the key")?;
        self.skip_whitespace();
        let value = self.parse_value()?;
        Ok(Event::KeyValue {
            key,
            value,
            position,
        })
    }

    /// Parses a possibly dotted key: `a."b.c".'d'`.
    fn parse_key(&mut self) -> Result<KeyPath> {
        let mut path = KeyPath::root();
        loop {
            path.push(self.parse_simple_key()?);
            self.skip_whitespace();
            if self.peek_char() != Some('.') {
                return Ok(path);
            }
            self.next_char();
            self.skip_whitespace();
        }
    }

    fn parse_simple_key(&mut self) -> Result<String> {
        match self.peek_char() {
            Some('"') => {
                if self.rest().starts_with("\"\"\"") {
                    return Err(self.error("multi-line strings cannot be keys"));
                }
                self.parse_basic_string()
            }
            Some('\'') => {
                if self.rest().starts_with("'''") {
                    return Err(self.error("multi-line strings cannot be keys"));
                }
                self.parse_literal_string()
            }
            _ => {
                let start = self.position;
                while let Some(ch) = self.peek_char() {
                    if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                        self.next_char();
                    } else {
                        break;
                    }
                }
                if start == self.position {
                    return Err(self.error("expected a key"));
                }
                Ok(self.input[start..self.position].to_string())
            }
        }
    }

    fn parse_value(&mut self) -> Result<TomlValue> {
        match self.peek_char() {
            Some('"') => {
                if self.rest().starts_with("\"\"\"") {
                    self.parse_multiline_basic_string().map(TomlValue::String)
                } else {
                    self.parse_basic_string().map(TomlValue::String)
                }
            }
            Some('\'') => {
                if self.rest().starts_with("'''") {
                    self.parse_multiline_literal_string().map(TomlValue::String)
                } else {
                    self.parse_literal_string().map(TomlValue::String)
                }
            }
            Some('t') => self.parse_keyword("true", TomlValue::Bool(true)),
            Some('f') => self.parse_keyword("false", TomlValue::Bool(false)),
            Some('[') => self.parse_array(),
            Some('{') => self.parse_inline_table(),
            Some(ch) if ch.is_ascii_digit() && self.looks_like_datetime() => {
                self.parse_datetime()
            }
            Some(ch) if ch.is_ascii_digit() || matches!(ch, '+' | '-' | 'i' | 'n') => {
                self.parse_number()
            }
            Some('\n' | '\r') | None => Err(self.error("expected a value")),
            Some(ch) => Err(self.error(&format!("unexpected character '{}'", ch))),
        }
    }

    fn parse_keyword(&mut self, keyword: &str, value: TomlValue) -> Result<TomlValue> {
        if !self.rest().starts_with(keyword) {
            return Err(self.error("expected a value"));
        }
        self.advance(keyword.len());
        Ok(value)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(self.error(&format!(
                "nesting deeper than {} levels",
                self.options.max_depth
            )));
        }
        Ok(())
    }

    fn parse_array(&mut self) -> Result<TomlValue> {
        self.enter()?;
        self.next_char(); // '['
        let mut elements = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek_char() == Some(']') {
                self.next_char();
                break;
            }
            elements.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek_char() {
                Some(',') => {
                    self.next_char();
                }
                Some(']') => {
                    self.next_char();
                    break;
                }
                _ => return Err(self.error("expected ',' or ']' in array")),
            }
        }
        self.depth -= 1;
        Ok(TomlValue::Array(elements))
    }

    fn parse_inline_table(&mut self) -> Result<TomlValue> {
        self.enter()?;
        self.next_char(); // '{'
        let mut table = TomlTable::new();
        let no_array_tables = HashSet::new();
        self.skip_whitespace();
        if self.peek_char() == Some('}') {
            self.next_char();
            self.depth -= 1;
            return Ok(TomlValue::Table(table));
        }
        loop {
            let position = self.here();
            let key = self.parse_key()?;
            self.skip_whitespace();
            self.expect_char('=', "'=' after the key")?;
            self.skip_whitespace();
            let value = self.parse_value()?;
            insert_dotted(
                &mut table,
                &KeyPath::root(),
                &key,
                value,
                position,
                &no_array_tables,
            )?;
            self.skip_whitespace();
            match self.peek_char() {
                Some(',') => {
                    self.next_char();
                    self.skip_whitespace();
                }
                Some('}') => {
                    self.next_char();
                    break;
                }
                _ => return Err(self.error("expected ',' or '}' in inline table")),
            }
        }
        self.depth -= 1;
        Ok(TomlValue::Table(table))
    }

    fn parse_basic_string(&mut self) -> Result<String> {
        self.next_char(); // opening quote
        let mut result = String::new();
        loop {
            match self.next_char() {
                None | Some('\n') => return Err(self.error("unterminated string")),
                Some('"') => return Ok(result),
                Some('\\') => result.push(self.parse_escape()?),
                Some(ch) if is_forbidden_control(ch) => {
                    return Err(self.error("control character in string"))
                }
                Some(ch) => result.push(ch),
            }
        }
    }

    fn parse_multiline_basic_string(&mut self) -> Result<String> {
        self.advance(3);
        self.trim_leading_newline();
        let mut result = String::new();
        loop {
            match self.peek_char() {
                None => return Err(self.error("unterminated multi-line string")),
                Some('"') => {
                    if self.close_multiline('"', &mut result)? {
                        return Ok(result);
                    }
                }
                Some('\\') => {
                    self.next_char();
                    if self.at_line_ending_backslash() {
                        self.skip_whitespace();
                        self.expect_newline()?;
                        self.skip_blank_lines()?;
                    } else {
                        result.push(self.parse_escape()?);
                    }
                }
                Some('\r') => {
                    self.expect_newline()?;
                    result.push('\n');
                }
                Some(ch) if ch != '\n' && is_forbidden_control(ch) => {
                    return Err(self.error("control character in string"))
                }
                Some(ch) => {
                    self.next_char();
                    result.push(ch);
                }
            }
        }
    }

    fn parse_literal_string(&mut self) -> Result<String> {
        self.next_char(); // opening quote
        let start = self.position;
        loop {
            match self.peek_char() {
                None | Some('\n') => return Err(self.error("unterminated literal string")),
                Some('\'') => {
                    let content = self.input[start..self.position].to_string();
                    self.next_char();
                    return Ok(content);
                }
                Some(ch) if is_forbidden_control(ch) => {
                    return Err(self.error("control character in string"))
                }
                Some(_) => {
                    self.next_char();
                }
            }
        }
    }

    fn parse_multiline_literal_string(&mut self) -> Result<String> {
        self.advance(3);
        self.trim_leading_newline();
        let mut result = String::new();
        loop {
            match self.peek_char() {
                None => return Err(self.error("unterminated multi-line literal string")),
                Some('\'') => {
                    if self.close_multiline('\'', &mut result)? {
                        return Ok(result);
                    }
                }
                Some('\r') => {
                    self.expect_newline()?;
                    result.push('\n');
                }
                Some(ch) if ch != '\n' && is_forbidden_control(ch) => {
                    return Err(self.error("control character in string"))
                }
                Some(ch) => {
                    self.next_char();
                    result.push(ch);
                }
            }
        }
    }

    /// Handles a run of quote characters inside a multi-line string. Up to two
    /// quotes may sit right before the closing delimiter.
    fn close_multiline(&mut self, quote: char, result: &mut String) -> Result<bool> {
        let run = self.rest().chars().take_while(|&c| c == quote).count();
        if run < 3 {
            self.advance(run);
            result.extend(std::iter::repeat(quote).take(run));
            return Ok(false);
        }
        if run > 5 {
            return Err(self.error("too many quotes in multi-line string"));
        }
        result.extend(std::iter::repeat(quote).take(run - 3));
        self.advance(run);
        Ok(true)
    }

    fn trim_leading_newline(&mut self) {
        if self.rest().starts_with('\n') {
            self.advance(1);
        } else if self.rest().starts_with("\r\n") {
            self.advance(2);
        }
    }

    fn at_line_ending_backslash(&self) -> bool {
        let after = self.rest().trim_start_matches([' ', '\t']);
        after.starts_with('\n') || after.starts_with("\r\n")
    }

    fn skip_blank_lines(&mut self) -> Result<()> {
        loop {
            match self.peek_char() {
                Some(' ' | '\t') => {
                    self.next_char();
                }
                Some('\n' | '\r') => self.expect_newline()?,
                _ => return Ok(()),
            }
        }
    }

    /// Parses the character after a backslash.
    fn parse_escape(&mut self) -> Result<char> {
        match self.next_char() {
            Some('b') => Ok('\u{0008}'),
            Some('t') => Ok('\t'),
            Some('n') => Ok('\n'),
            Some('f') => Ok('\u{000C}'),
            Some('r') => Ok('\r'),
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('u') => self.parse_unicode_escape(4),
            Some('U') => self.parse_unicode_escape(8),
            _ => Err(self.error("invalid escape sequence")),
        }
    }

    fn parse_unicode_escape(&mut self, digits: usize) -> Result<char> {
        let mut hex = String::with_capacity(digits);
        for _ in 0..digits {
            match self.next_char() {
                Some(ch) if ch.is_ascii_hexdigit() => hex.push(ch),
                _ => {
                    return Err(self.error(&format!(
                        "invalid unicode escape sequence (expected {} hex digits)",
                        digits
                    )))
                }
            }
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error("invalid unicode code point"))
    }

    /// `1979-05-27...` or `07:32:00...`
    fn looks_like_datetime(&self) -> bool {
        let bytes = self.rest().as_bytes();
        let digits = |range: std::ops::Range<usize>| {
            bytes.len() >= range.end && bytes[range].iter().all(u8::is_ascii_digit)
        };
        (digits(0..4) && bytes.get(4) == Some(&b'-')) || (digits(0..2) && bytes.get(2) == Some(&b':'))
    }

    fn parse_datetime(&mut self) -> Result<TomlValue> {
        let position = self.here();
        let invalid = |what: &str| Error::syntax(position.line, position.column, what);

        if self.rest().as_bytes().get(2) == Some(&b':') {
            let time = self.take_while(|c| c.is_ascii_digit() || c == ':' || c == '.');
            return parse_time(time)
                .map(TomlValue::LocalTime)
                .ok_or_else(|| invalid("invalid local time"));
        }

        let date_text = self.take_while(|c| c.is_ascii_digit() || c == '-');
        let date = parse_date(date_text).ok_or_else(|| invalid("invalid date"))?;

        let has_time = match (self.peek_char(), self.peek_nth(1)) {
            (Some('T' | 't'), _) => true,
            (Some(' '), Some(next)) => next.is_ascii_digit(),
            _ => false,
        };
        if !has_time {
            return Ok(TomlValue::LocalDate(date));
        }
        self.next_char();

        let time_text = self.take_while(|c| c.is_ascii_digit() || c == ':' || c == '.');
        let time = parse_time(time_text).ok_or_else(|| invalid("invalid time"))?;
        let local = date.and_time(time);

        let offset = match self.peek_char() {
            Some('Z' | 'z') => {
                self.next_char();
                FixedOffset::east_opt(0)
            }
            Some(sign @ ('+' | '-')) => {
                self.next_char();
                let text = self.take_while(|c| c.is_ascii_digit() || c == ':');
                parse_offset(sign, text)
            }
            _ => return Ok(TomlValue::LocalDateTime(local)),
        };
        offset
            .and_then(|offset| offset.from_local_datetime(&local).single())
            .map(TomlValue::OffsetDateTime)
            .ok_or_else(|| invalid("invalid offset date-time"))
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let start = self.position;
        while let Some(ch) = self.peek_char() {
            if !accept(ch) {
                break;
            }
            self.next_char();
        }
        &self.input[start..self.position]
    }

    fn parse_number(&mut self) -> Result<TomlValue> {
        let position = self.here();
        let token = self.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-' | '.'));
        parse_number_token(token).ok_or_else(|| {
            Error::syntax(
                position.line,
                position.column,
                &format!("invalid number '{}'", token),
            )
        })
    }
}

impl Iterator for Parser<'_> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_event() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

fn is_forbidden_control(ch: char) -> bool {
    (ch.is_control() && ch != '\t') || ch == '\u{7F}'
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let year = text.get(0..4)?.parse().ok()?;
    let month = text.get(5..7)?.parse().ok()?;
    let day = text.get(8..10)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    let (clock, fraction) = match text.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (text, None),
    };
    let bytes = clock.as_bytes();
    if bytes.len() != 8 || bytes[2] != b':' || bytes[5] != b':' {
        return None;
    }
    let hour = clock.get(0..2)?.parse().ok()?;
    let minute = clock.get(3..5)?.parse().ok()?;
    let second = clock.get(6..8)?.parse().ok()?;
    let nanos = match fraction {
        None => 0,
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            // Precision beyond nanoseconds is truncated.
            let kept: String = digits.chars().chain(std::iter::repeat('0')).take(9).collect();
            kept.parse().ok()?
        }
        Some(_) => return None,
    };
    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
}

fn parse_offset(sign: char, text: &str) -> Option<FixedOffset> {
    let bytes = text.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    let hours: i32 = text.get(0..2)?.parse().ok()?;
    let minutes: i32 = text.get(3..5)?.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    let seconds = hours * 3600 + minutes * 60;
    if sign == '-' {
        FixedOffset::west_opt(seconds)
    } else {
        FixedOffset::east_opt(seconds)
    }
}

/// Checks that every `_` in `digits` sits between two characters accepted by `is_digit`.
fn underscores_ok(digits: &str, is_digit: impl Fn(char) -> bool) -> bool {
    let chars: Vec<char> = digits.chars().collect();
    chars.iter().enumerate().all(|(i, &c)| {
        c != '_'
            || (i > 0
                && i + 1 < chars.len()
                && is_digit(chars[i - 1])
                && is_digit(chars[i + 1]))
    })
}

fn parse_number_token(token: &str) -> Option<TomlValue> {
    let (sign, unsigned) = match token.as_bytes().first() {
        Some(b'+') => ("", &token[1..]),
        Some(b'-') => ("-", &token[1..]),
        _ => ("", token),
    };
    let has_sign = unsigned.len() != token.len();

    match unsigned {
        "inf" => {
            let value = if sign == "-" { f64::NEG_INFINITY } else { f64::INFINITY };
            return Some(TomlValue::Float(value));
        }
        "nan" => return Some(TomlValue::Float(f64::NAN)),
        _ => {}
    }

    let radix = match unsigned.get(0..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        if has_sign {
            return None;
        }
        let digits = &unsigned[2..];
        let is_digit = |c: char| c.is_digit(radix);
        if digits.is_empty() || !underscores_ok(digits, is_digit) {
            return None;
        }
        let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
        if !cleaned.chars().all(is_digit) {
            return None;
        }
        return i64::from_str_radix(&cleaned, radix).ok().map(TomlValue::Integer);
    }

    if !unsigned.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if !underscores_ok(unsigned, |c| c.is_ascii_digit()) {
        return None;
    }
    let cleaned: String = unsigned.chars().filter(|&c| c != '_').collect();
    let integer_part: &str = cleaned
        .split(|c: char| c == '.' || c == 'e' || c == 'E')
        .next()
        .unwrap_or_default();
    if integer_part.len() > 1 && integer_part.starts_with('0') {
        return None;
    }

    if cleaned.contains(['.', 'e', 'E']) {
        if !valid_float(&cleaned) {
            return None;
        }
        return format!("{}{}", sign, cleaned)
            .parse::<f64>()
            .ok()
            .map(TomlValue::Float);
    }

    if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    format!("{}{}", sign, cleaned)
        .parse::<i64>()
        .ok()
        .map(TomlValue::Integer)
}

/// `digits [. digits] [(e|E) [+|-] digits]`, underscores already removed.
fn valid_float(text: &str) -> bool {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(at) => (&text[..at], Some(&text[at + 1..])),
        None => (text, None),
    };
    let mantissa_ok = match mantissa.split_once('.') {
        Some((whole, fraction)) => all_digits(whole) && all_digits(fraction),
        None => all_digits(mantissa),
    };
    let exponent_ok = match exponent {
        None => true,
        Some(exp) => all_digits(exp.strip_prefix(['+', '-']).unwrap_or(exp)),
    };
    mantissa_ok && exponent_ok
}

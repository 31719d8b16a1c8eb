//! Syntax events: the boundary between the grammar and the tree builder.
//!
//! A grammar (the bundled [`Parser`](crate::Parser) or any other front end)
//! hands the [`TreeBuilder`](crate::TreeBuilder) an ordered stream of
//! [`Event`]s. Scalars arrive with their primitive value already resolved and
//! inline tables/arrays arrive as complete [`TomlValue`]s; the builder never
//! re-validates lexical details.
//!
//! ```rust
//! use toml_codec::{from_events, Event, KeyPath, Position, TomlValue};
//!
//! let events = vec![
//!     Event::Table { path: KeyPath::from(["server"]), position: Position::new(1, 1) },
//!     Event::KeyValue {
//!         key: KeyPath::from(["port"]),
//!         value: TomlValue::from(8080),
//!         position: Position::new(2, 1),
//!     },
//! ];
//! let root = from_events(events).unwrap();
//! assert!(root.get("server").is_some());
//! ```

use crate::value::write_key;
use crate::TomlValue;
use std::fmt;

/// A 1-based line/column location in the source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An ordered sequence of key segments, e.g. `a."b.c".d`.
///
/// The empty path denotes the root table.
#[derive(Clone, Debug, PartialEq, Eq, Default, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        KeyPath(segments)
    }

    #[must_use]
    pub fn root() -> Self {
        KeyPath(Vec::new())
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn join(&self, segment: &str) -> Self {
        let mut joined = self.clone();
        joined.push(segment);
        joined
    }

    /// Splits off the last segment: `a.b.c` becomes (`c`, `a.b`).
    #[must_use]
    pub fn split_last(&self) -> Option<(&String, &[String])> {
        self.0.split_last()
    }

    /// Returns `true` if `prefix` is a (non-strict) prefix of this path.
    #[must_use]
    pub fn starts_with(&self, prefix: &KeyPath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write_key(f, segment)?;
        }
        Ok(())
    }
}

impl From<Vec<String>> for KeyPath {
    fn from(segments: Vec<String>) -> Self {
        KeyPath(segments)
    }
}

impl<const N: usize> From<[&str; N]> for KeyPath {
    fn from(segments: [&str; N]) -> Self {
        KeyPath(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[&str]> for KeyPath {
    fn from(segments: &[&str]) -> Self {
        KeyPath(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl FromIterator<String> for KeyPath {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        KeyPath(iter.into_iter().collect())
    }
}

/// One syntax node, in document order.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// `a.b.c = value`, relative to the current table.
    KeyValue {
        key: KeyPath,
        value: TomlValue,
        position: Position,
    },
    /// `[a.b]`
    Table { path: KeyPath, position: Position },
    /// `[[a.b]]`
    ArrayTable { path: KeyPath, position: Position },
}

impl Event {
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Event::KeyValue { position, .. }
            | Event::Table { position, .. }
            | Event::ArrayTable { position, .. } => *position,
        }
    }
}

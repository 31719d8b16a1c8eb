//! Folding syntax events into a single root table.
//!
//! The [`TreeBuilder`] keeps an *insertion point*: the table addressed by the
//! most recent `[header]` or `[[header]]`. Key/value events are merged into
//! the insertion point; headers move it.
//!
//! ## Rules
//!
//! - `a.b.c = v` merges the fragment `{a = {b = {c = v}}}` into the insertion
//!   point. Tables merge key by key; any other pair of values is replaced by
//!   the incoming one.
//! - `[a.b]` walks from the root, creating missing tables. Walking through an
//!   array of tables enters its last element.
//! - `[[a.b]]` appends a fresh table to the array at `a.b` (creating it on
//!   first use) and makes that element the insertion point.
//! - Replacing a table with a non-table (or the reverse), reusing an inline
//!   array as an array of tables, or walking through a scalar is a
//!   [`Error::Build`] naming the offending key path.
//!
//! ```rust
//! use toml_codec::{from_str, toml, TomlValue};
//!
//! let root = from_str("[[foo]]\nbar = 1\n[[foo]]\nbar = 2").unwrap();
//! assert_eq!(TomlValue::Table(root), toml!({"foo": [{"bar": 1}, {"bar": 2}]}));
//! ```

use crate::{Error, Event, KeyPath, Position, Result, TomlTable, TomlValue};
use indexmap::map::Entry;
use std::collections::HashSet;
use tracing::trace;

/// Accumulates [`Event`]s into a root [`TomlTable`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    root: TomlTable,
    current: KeyPath,
    /// Paths opened by `[[...]]` headers; only these arrays may grow.
    array_tables: HashSet<KeyPath>,
}

impl TreeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds every event of `events` and returns the finished root table.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::Build`] raised by [`TreeBuilder::push`].
    pub fn build<I>(events: I) -> Result<TomlTable>
    where
        I: IntoIterator<Item = Event>,
    {
        let mut builder = TreeBuilder::new();
        for event in events {
            builder.push(event)?;
        }
        Ok(builder.finish())
    }

    /// Applies one event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Build`] when the event conflicts with the tree built so far.
    pub fn push(&mut self, event: Event) -> Result<()> {
        match event {
            Event::KeyValue {
                key,
                value,
                position,
            } => self.assign(&key, value, position),
            Event::Table { path, position } => self.open_table(path, position),
            Event::ArrayTable { path, position } => self.open_array_table(path, position),
        }
    }

    /// Returns the root table built so far.
    #[must_use]
    pub fn finish(self) -> TomlTable {
        self.root
    }

    fn assign(&mut self, key: &KeyPath, value: TomlValue, position: Position) -> Result<()> {
        let target = descend(
            &mut self.root,
            self.current.segments(),
            &self.array_tables,
            position,
        )?;
        insert_dotted(
            target,
            &self.current,
            key,
            value,
            position,
            &self.array_tables,
        )
    }

    fn open_table(&mut self, path: KeyPath, position: Position) -> Result<()> {
        let Some((last, parents)) = path.split_last() else {
            return Err(Error::build(&path, position.line, position.column, "empty table header"));
        };
        let parent = descend(&mut self.root, parents, &self.array_tables, position)?;
        match parent.get(last) {
            None => {
                parent.insert(last.clone(), TomlValue::Table(TomlTable::new()));
            }
            Some(TomlValue::Table(_)) => {}
            Some(TomlValue::Array(_)) if self.array_tables.contains(&path) => {
                return Err(Error::build(
                    &path,
                    position.line,
                    position.column,
                    "array of tables cannot be reopened as a table",
                ));
            }
            Some(other) => {
                return Err(Error::build(
                    &path,
                    position.line,
                    position.column,
                    &format!("key already holds a {}", other.type_name()),
                ));
            }
        }
        self.current = path;
        Ok(())
    }

    fn open_array_table(&mut self, path: KeyPath, position: Position) -> Result<()> {
        let Some((last, parents)) = path.split_last() else {
            return Err(Error::build(&path, position.line, position.column, "empty table header"));
        };
        let parent = descend(&mut self.root, parents, &self.array_tables, position)?;
        let declared = self.array_tables.contains(&path);
        let existed = parent.contains_key(last);
        let slot = parent
            .entry(last.clone())
            .or_insert_with(|| TomlValue::Array(Vec::new()));
        match slot {
            TomlValue::Array(elements) if declared || !existed => {
                elements.push(TomlValue::Table(TomlTable::new()));
                trace!(path = %path, index = elements.len() - 1, "opened array-of-tables element");
            }
            TomlValue::Array(_) => {
                return Err(Error::build(
                    &path,
                    position.line,
                    position.column,
                    "static array cannot be extended as an array of tables",
                ));
            }
            other => {
                return Err(Error::build(
                    &path,
                    position.line,
                    position.column,
                    &format!("key already holds a {}", other.type_name()),
                ));
            }
        }
        // Arrays of tables declared inside earlier elements do not carry over
        // to the fresh one.
        self.array_tables
            .retain(|declared| declared == &path || !declared.starts_with(&path));
        self.array_tables.insert(path.clone());
        self.current = path;
        Ok(())
    }
}

/// Walks `path` from `table`, creating missing tables. Arrays of tables are
/// entered through their last element.
fn descend<'t>(
    mut table: &'t mut TomlTable,
    path: &[String],
    array_tables: &HashSet<KeyPath>,
    position: Position,
) -> Result<&'t mut TomlTable> {
    for (depth, segment) in path.iter().enumerate() {
        let walked = || KeyPath::new(path[..=depth].to_vec());
        let declared = array_tables.contains(&walked());
        let slot = table
            .entry(segment.clone())
            .or_insert_with(|| TomlValue::Table(TomlTable::new()));
        let kind = slot.type_name();
        let next = match slot {
            TomlValue::Table(inner) => Some(inner),
            TomlValue::Array(elements) if declared => match elements.last_mut() {
                Some(TomlValue::Table(inner)) => Some(inner),
                _ => None,
            },
            _ => None,
        };
        table = match next {
            Some(inner) => inner,
            None if declared => {
                return Err(Error::build(
                    walked(),
                    position.line,
                    position.column,
                    "array of tables has no element to extend",
                ))
            }
            None => {
                return Err(Error::build(
                    walked(),
                    position.line,
                    position.column,
                    &format!("cannot define keys inside a {}", kind),
                ))
            }
        };
    }
    Ok(table)
}

/// Merges `key = value` into `table`, where `table` sits at `prefix`.
pub(crate) fn insert_dotted(
    table: &mut TomlTable,
    prefix: &KeyPath,
    key: &KeyPath,
    value: TomlValue,
    position: Position,
    array_tables: &HashSet<KeyPath>,
) -> Result<()> {
    let Some((last, parents)) = key.split_last() else {
        return Err(Error::build(prefix, position.line, position.column, "empty key"));
    };
    let mut path = prefix.clone();
    let mut target = table;
    for segment in parents {
        path.push(segment.as_str());
        let slot = target
            .entry(segment.clone())
            .or_insert_with(|| TomlValue::Table(TomlTable::new()));
        target = match slot {
            TomlValue::Table(inner) => inner,
            other => {
                return Err(Error::build(
                    &path,
                    position.line,
                    position.column,
                    &format!("key already holds a {}", other.type_name()),
                ))
            }
        };
    }
    path.push(last.as_str());
    match target.entry(last.clone()) {
        Entry::Occupied(mut slot) => {
            merge_checked(slot.get_mut(), value, &path, position, array_tables)
        }
        Entry::Vacant(slot) => {
            slot.insert(value);
            Ok(())
        }
    }
}

/// The builder's view of [`TomlValue::merge`]: same outcome, but a table
/// meeting a non-table is a conflict instead of a silent replacement.
fn merge_checked(
    existing: &mut TomlValue,
    incoming: TomlValue,
    path: &KeyPath,
    position: Position,
    array_tables: &HashSet<KeyPath>,
) -> Result<()> {
    match (existing, incoming) {
        (TomlValue::Table(base), TomlValue::Table(incoming)) => {
            for (key, value) in incoming {
                let child = path.join(&key);
                match base.entry(key) {
                    Entry::Occupied(mut slot) => {
                        merge_checked(slot.get_mut(), value, &child, position, array_tables)?
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(value);
                    }
                }
            }
            Ok(())
        }
        (TomlValue::Table(_), incoming) => Err(Error::build(
            path,
            position.line,
            position.column,
            &format!("table cannot be redefined as a {}", incoming.type_name()),
        )),
        (existing, TomlValue::Table(_)) => Err(Error::build(
            path,
            position.line,
            position.column,
            &format!("{} cannot be redefined as a table", existing.type_name()),
        )),
        (TomlValue::Array(_), _) if array_tables.contains(path) => Err(Error::build(
            path,
            position.line,
            position.column,
            "array of tables cannot be reassigned",
        )),
        (existing, incoming) => {
            *existing = incoming;
            Ok(())
        }
    }
}

//! Key/value table type for TOML documents.
//!
//! This module provides [`TomlTable`], a wrapper around [`IndexMap`] that keeps
//! keys in the order they were first seen in the document. Order is only kept
//! for predictable iteration and output: two tables with the same entries in a
//! different order compare equal.
//!
//! ## Examples
//!
//! ```rust
//! use toml_codec::{TomlTable, TomlValue};
//!
//! let mut table = TomlTable::new();
//! table.insert("name".to_string(), TomlValue::from("Alice"));
//! table.insert("age".to_string(), TomlValue::from(30));
//!
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use crate::TomlValue;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

/// A table of unique string keys to TOML values.
///
/// A full document is always a `TomlTable`.
///
/// # Examples
///
/// ```rust
/// use toml_codec::{TomlTable, TomlValue};
///
/// let mut table = TomlTable::new();
/// table.insert("first".to_string(), TomlValue::from(1));
/// table.insert("second".to_string(), TomlValue::from(2));
///
/// let keys: Vec<_> = table.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TomlTable(IndexMap<String, TomlValue>);

impl TomlTable {
    /// Creates an empty `TomlTable`.
    #[must_use]
    pub fn new() -> Self {
        TomlTable(IndexMap::new())
    }

    /// Creates an empty `TomlTable` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        TomlTable(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    ///
    /// This is a raw overwrite. Document assembly goes through
    /// [`TomlValue::merge`] instead.
    pub fn insert(&mut self, key: String, value: TomlValue) -> Option<TomlValue> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TomlValue> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut TomlValue> {
        self.0.get_mut(key)
    }

    /// Removes `key`, keeping the relative order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<TomlValue> {
        self.0.shift_remove(key)
    }

    /// Returns `true` if the table holds `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, TomlValue> {
        self.0.keys()
    }

    /// Returns an iterator over the values, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, TomlValue> {
        self.0.values()
    }

    /// Returns an iterator over the entries, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, TomlValue> {
        self.0.iter()
    }

    pub(crate) fn entry(&mut self, key: String) -> indexmap::map::Entry<'_, String, TomlValue> {
        self.0.entry(key)
    }
}

impl PartialEq for TomlTable {
    fn eq(&self, other: &Self) -> bool {
        // IndexMap equality ignores order already; spelled out so the contract is visible.
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|theirs| theirs == value))
    }
}

impl From<HashMap<String, TomlValue>> for TomlTable {
    fn from(map: HashMap<String, TomlValue>) -> Self {
        TomlTable(map.into_iter().collect())
    }
}

impl From<BTreeMap<String, TomlValue>> for TomlTable {
    fn from(map: BTreeMap<String, TomlValue>) -> Self {
        TomlTable(map.into_iter().collect())
    }
}

impl From<TomlTable> for HashMap<String, TomlValue> {
    fn from(table: TomlTable) -> Self {
        table.0.into_iter().collect()
    }
}

impl IntoIterator for TomlTable {
    type Item = (String, TomlValue);
    type IntoIter = indexmap::map::IntoIter<String, TomlValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TomlTable {
    type Item = (&'a String, &'a TomlValue);
    type IntoIter = indexmap::map::Iter<'a, String, TomlValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, TomlValue)> for TomlTable {
    fn from_iter<T: IntoIterator<Item = (String, TomlValue)>>(iter: T) -> Self {
        TomlTable(IndexMap::from_iter(iter))
    }
}

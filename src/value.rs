//! Dynamic value representation for TOML documents.
//!
//! This module provides the [`TomlValue`] enum, the tree every parsed document
//! is assembled into and every native value is encoded into. Trees are built
//! once and then treated as immutable: [`merge`] and the codec engines always
//! produce new values.
//!
//! ## Core Types
//!
//! - [`TomlValue`]: string, integer, float, boolean, the four date/time kinds,
//!   table and array
//! - [`merge`]: the structural merge rule used for table re-opening and
//!   dotted-key accumulation
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use toml_codec::{toml, TomlValue};
//!
//! let number = TomlValue::from(42);
//! let text = TomlValue::from("hello");
//!
//! let table = toml!({
//!     "name": "Alice",
//!     "ports": [8080, 8081]
//! });
//! assert!(table.is_table());
//! ```
//!
//! ### Merging
//!
//! ```rust
//! use toml_codec::{merge, toml};
//!
//! let merged = merge(toml!({"x": {"a": 1}}), toml!({"x": {"b": 2}}));
//! assert_eq!(merged, toml!({"x": {"a": 1, "b": 2}}));
//! ```

use crate::TomlTable;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::map::Entry;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Longest rendering kept when a value is quoted inside an error message.
const SUMMARY_LIMIT: usize = 64;

/// A dynamically-typed TOML value.
///
/// # Examples
///
/// ```rust
/// use toml_codec::TomlValue;
///
/// let value = TomlValue::Integer(42);
/// assert!(value.is_integer());
/// assert_eq!(value.as_integer(), Some(42));
/// assert_eq!(value.type_name(), "integer");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum TomlValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// A date-time with a UTC offset, e.g. `1979-05-27T07:32:00Z`.
    OffsetDateTime(DateTime<FixedOffset>),
    /// A date-time without offset, e.g. `1979-05-27T07:32:00`.
    LocalDateTime(NaiveDateTime),
    LocalDate(NaiveDate),
    LocalTime(NaiveTime),
    Table(TomlTable),
    Array(Vec<TomlValue>),
}

impl Default for TomlValue {
    /// The empty table, i.e. the empty document.
    fn default() -> Self {
        TomlValue::Table(TomlTable::new())
    }
}

/// Merges `incoming` into `base`.
///
/// When both sides are tables the result holds the union of their keys and
/// shared keys are merged recursively. In every other case `incoming` wins
/// outright; arrays are never merged element-wise.
///
/// ```rust
/// use toml_codec::{merge, TomlValue};
///
/// assert_eq!(merge(TomlValue::from(1), TomlValue::from("b")), TomlValue::from("b"));
/// ```
#[must_use]
pub fn merge(base: TomlValue, incoming: TomlValue) -> TomlValue {
    base.merge(incoming)
}

impl TomlValue {
    /// Method form of [`merge`].
    #[must_use]
    pub fn merge(self, incoming: TomlValue) -> TomlValue {
        match (self, incoming) {
            (TomlValue::Table(base), TomlValue::Table(incoming)) => {
                TomlValue::Table(merge_tables(base, incoming))
            }
            (_, incoming) => incoming,
        }
    }

    /// Returns a short human-readable name of the variant.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            TomlValue::String(_) => "string",
            TomlValue::Integer(_) => "integer",
            TomlValue::Float(_) => "float",
            TomlValue::Bool(_) => "boolean",
            TomlValue::OffsetDateTime(_) => "offset date-time",
            TomlValue::LocalDateTime(_) => "local date-time",
            TomlValue::LocalDate(_) => "local date",
            TomlValue::LocalTime(_) => "local time",
            TomlValue::Table(_) => "table",
            TomlValue::Array(_) => "array",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, TomlValue::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, TomlValue::Integer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, TomlValue::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, TomlValue::Bool(_))
    }

    /// Returns `true` for any of the four date/time variants.
    #[inline]
    #[must_use]
    pub const fn is_datetime(&self) -> bool {
        matches!(
            self,
            TomlValue::OffsetDateTime(_)
                | TomlValue::LocalDateTime(_)
                | TomlValue::LocalDate(_)
                | TomlValue::LocalTime(_)
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, TomlValue::Table(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, TomlValue::Array(_))
    }

    /// If the value is a string, returns it. Otherwise returns `None`.
    ///
    /// ```rust
    /// use toml_codec::TomlValue;
    ///
    /// assert_eq!(TomlValue::from("hello").as_str(), Some("hello"));
    /// assert_eq!(TomlValue::from(42).as_str(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TomlValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an integer, returns it. Floats are not converted.
    #[inline]
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            TomlValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            TomlValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            TomlValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_table(&self) -> Option<&TomlTable> {
        match self {
            TomlValue::Table(table) => Some(table),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<TomlValue>> {
        match self {
            TomlValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_offset_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            TomlValue::OffsetDateTime(dt) => Some(dt),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_local_datetime(&self) -> Option<&NaiveDateTime> {
        match self {
            TomlValue::LocalDateTime(dt) => Some(dt),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_local_date(&self) -> Option<&NaiveDate> {
        match self {
            TomlValue::LocalDate(d) => Some(d),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_local_time(&self) -> Option<&NaiveTime> {
        match self {
            TomlValue::LocalTime(t) => Some(t),
            _ => None,
        }
    }

    /// Inline rendering clipped for use inside error messages.
    pub(crate) fn summary(&self) -> String {
        let rendered = self.to_string();
        if rendered.chars().count() <= SUMMARY_LIMIT {
            return rendered;
        }
        let mut clipped: String = rendered.chars().take(SUMMARY_LIMIT).collect();
        clipped.push_str("...");
        clipped
    }
}

fn merge_tables(mut base: TomlTable, incoming: TomlTable) -> TomlTable {
    for (key, value) in incoming {
        match base.entry(key) {
            Entry::Occupied(mut slot) => {
                let existing = std::mem::take(slot.get_mut());
                *slot.get_mut() = existing.merge(value);
            }
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
        }
    }
    base
}

/// Writes `key` bare when TOML allows it and as a basic string otherwise.
pub(crate) fn write_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        f.write_str(key)
    } else {
        write_basic_string(f, key)
    }
}

fn write_basic_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{0008}' => f.write_str("\\b")?,
            '\u{000C}' => f.write_str("\\f")?,
            c if c.is_control() => write!(f, "\\u{:04X}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        f.write_str("nan")
    } else if value.is_infinite() {
        f.write_str(if value > 0.0 { "inf" } else { "-inf" })
    } else {
        // Debug keeps a fractional part ("1.0"), which TOML needs to stay a float.
        write!(f, "{:?}", value)
    }
}

/// Renders the value as inline TOML.
impl fmt::Display for TomlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TomlValue::String(s) => write_basic_string(f, s),
            TomlValue::Integer(i) => write!(f, "{}", i),
            TomlValue::Float(fl) => write_float(f, *fl),
            TomlValue::Bool(b) => write!(f, "{}", b),
            TomlValue::OffsetDateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            TomlValue::LocalDateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            TomlValue::LocalDate(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            TomlValue::LocalTime(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            TomlValue::Array(arr) => {
                f.write_str("[")?;
                for (i, element) in arr.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                f.write_str("]")
            }
            TomlValue::Table(table) => {
                if table.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (key, value)) in table.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_key(f, key)?;
                    write!(f, " = {}", value)?;
                }
                f.write_str(" }")
            }
        }
    }
}

impl Serialize for TomlValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TomlValue::String(s) => serializer.serialize_str(s),
            TomlValue::Integer(i) => serializer.serialize_i64(*i),
            TomlValue::Float(f) => serializer.serialize_f64(*f),
            TomlValue::Bool(b) => serializer.serialize_bool(*b),
            TomlValue::OffsetDateTime(_)
            | TomlValue::LocalDateTime(_)
            | TomlValue::LocalDate(_)
            | TomlValue::LocalTime(_) => serializer.collect_str(self),
            TomlValue::Array(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            TomlValue::Table(table) => table.serialize(serializer),
        }
    }
}

impl Serialize for TomlTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TomlValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct TomlValueVisitor;

        impl<'de> Visitor<'de> for TomlValueVisitor {
            type Value = TomlValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any value representable in TOML")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(TomlValue::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(TomlValue::Integer(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(TomlValue::Integer)
                    .map_err(|_| E::custom(format!("integer {} is out of range for TOML", value)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(TomlValue::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(TomlValue::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(TomlValue::String(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Err(E::custom("TOML has no null value"))
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Err(E::custom("TOML has no null value"))
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(TomlValue::Array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = TomlTable::new();
                while let Some((key, value)) = map.next_entry()? {
                    values.insert(key, value);
                }
                Ok(TomlValue::Table(values))
            }
        }

        deserializer.deserialize_any(TomlValueVisitor)
    }
}

// TryFrom implementations for extracting values from TomlValue
impl TryFrom<TomlValue> for i64 {
    type Error = crate::Error;

    fn try_from(value: TomlValue) -> crate::Result<Self> {
        match value {
            TomlValue::Integer(i) => Ok(i),
            other => Err(crate::Error::custom(format!(
                "expected integer, found {}",
                other.type_name()
            ))),
        }
    }
}

impl TryFrom<TomlValue> for f64 {
    type Error = crate::Error;

    fn try_from(value: TomlValue) -> crate::Result<Self> {
        match value {
            TomlValue::Float(f) => Ok(f),
            TomlValue::Integer(i) => Ok(i as f64),
            other => Err(crate::Error::custom(format!(
                "expected float, found {}",
                other.type_name()
            ))),
        }
    }
}

impl TryFrom<TomlValue> for bool {
    type Error = crate::Error;

    fn try_from(value: TomlValue) -> crate::Result<Self> {
        match value {
            TomlValue::Bool(b) => Ok(b),
            other => Err(crate::Error::custom(format!(
                "expected boolean, found {}",
                other.type_name()
            ))),
        }
    }
}

impl TryFrom<TomlValue> for String {
    type Error = crate::Error;

    fn try_from(value: TomlValue) -> crate::Result<Self> {
        match value {
            TomlValue::String(s) => Ok(s),
            other => Err(crate::Error::custom(format!(
                "expected string, found {}",
                other.type_name()
            ))),
        }
    }
}

impl From<bool> for TomlValue {
    fn from(value: bool) -> Self {
        TomlValue::Bool(value)
    }
}

macro_rules! from_lossless_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for TomlValue {
                fn from(value: $ty) -> Self {
                    TomlValue::Integer(i64::from(value))
                }
            }
        )*
    };
}

from_lossless_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for TomlValue {
    fn from(value: f32) -> Self {
        TomlValue::Float(f64::from(value))
    }
}

impl From<f64> for TomlValue {
    fn from(value: f64) -> Self {
        TomlValue::Float(value)
    }
}

impl From<String> for TomlValue {
    fn from(value: String) -> Self {
        TomlValue::String(value)
    }
}

impl From<&str> for TomlValue {
    fn from(value: &str) -> Self {
        TomlValue::String(value.to_string())
    }
}

impl From<DateTime<FixedOffset>> for TomlValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        TomlValue::OffsetDateTime(value)
    }
}

impl From<NaiveDateTime> for TomlValue {
    fn from(value: NaiveDateTime) -> Self {
        TomlValue::LocalDateTime(value)
    }
}

impl From<NaiveDate> for TomlValue {
    fn from(value: NaiveDate) -> Self {
        TomlValue::LocalDate(value)
    }
}

impl From<NaiveTime> for TomlValue {
    fn from(value: NaiveTime) -> Self {
        TomlValue::LocalTime(value)
    }
}

impl From<Vec<TomlValue>> for TomlValue {
    fn from(value: Vec<TomlValue>) -> Self {
        TomlValue::Array(value)
    }
}

impl From<TomlTable> for TomlValue {
    fn from(value: TomlTable) -> Self {
        TomlValue::Table(value)
    }
}

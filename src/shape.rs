//! Requested-shape descriptors.
//!
//! A [`Shape`] describes the native type a decode call is aiming for,
//! including its type arguments ("list of integer", "map of string to any").
//! Every [`Decode`](crate::Decode) type reports its shape, the engine hands it
//! to registered converters so they can recurse correctly, and decoding errors
//! carry it to name the target.

use crate::record::{Constants, Record};
use std::fmt;

/// A small recursive description of a native target type.
///
/// ```rust
/// use toml_codec::{Decode, Shape};
///
/// assert_eq!(<Vec<i64>>::shape(), Shape::sequence(Shape::Integer));
/// assert_eq!(<Vec<i64>>::shape().to_string(), "list<integer>");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Untyped request: every value decodes to its natural structural form.
    Any,
    Bool,
    Integer,
    Float,
    String,
    Char,
    OffsetDateTime,
    LocalDateTime,
    LocalDate,
    LocalTime,
    Sequence(Box<Shape>),
    /// A sequence that drops duplicate elements.
    Set(Box<Shape>),
    Map {
        key: Box<Shape>,
        value: Box<Shape>,
    },
    Optional(Box<Shape>),
    /// An enumerated-constant type, matched by constant name.
    Constants {
        name: &'static str,
        names: &'static [&'static str],
    },
    /// A composite type built from named field slots.
    Record {
        name: &'static str,
        fields: &'static [&'static str],
    },
    /// A type with no structural rule; only registered converters apply.
    Opaque(&'static str),
}

impl Shape {
    #[must_use]
    pub fn sequence(element: Shape) -> Self {
        Shape::Sequence(Box::new(element))
    }

    #[must_use]
    pub fn set(element: Shape) -> Self {
        Shape::Set(Box::new(element))
    }

    /// A string-keyed map with values of shape `value`.
    #[must_use]
    pub fn map(value: Shape) -> Self {
        Shape::Map {
            key: Box::new(Shape::String),
            value: Box::new(value),
        }
    }

    #[must_use]
    pub fn optional(inner: Shape) -> Self {
        Shape::Optional(Box::new(inner))
    }

    #[must_use]
    pub fn record<R: Record>() -> Self {
        Shape::Record {
            name: R::NAME,
            fields: R::FIELDS,
        }
    }

    #[must_use]
    pub fn constants<C: Constants>() -> Self {
        Shape::Constants {
            name: C::NAME,
            names: C::NAMES,
        }
    }

    /// An opaque shape named after `T`, without its module path.
    #[must_use]
    pub fn opaque<T: ?Sized>() -> Self {
        Shape::Opaque(short_type_name::<T>())
    }

    /// The type arguments of this shape, outermost first.
    ///
    /// ```rust
    /// use toml_codec::Shape;
    ///
    /// let shape = Shape::map(Shape::sequence(Shape::Bool));
    /// assert_eq!(shape.arguments(), vec![&Shape::String, &Shape::sequence(Shape::Bool)]);
    /// ```
    #[must_use]
    pub fn arguments(&self) -> Vec<&Shape> {
        match self {
            Shape::Sequence(element) | Shape::Set(element) | Shape::Optional(element) => {
                vec![element.as_ref()]
            }
            Shape::Map { key, value } => vec![key.as_ref(), value.as_ref()],
            _ => Vec::new(),
        }
    }

    /// The element shape of a sequence, set or optional; the value shape of a map.
    #[must_use]
    pub fn element(&self) -> Option<&Shape> {
        match self {
            Shape::Sequence(element) | Shape::Set(element) | Shape::Optional(element) => {
                Some(element.as_ref())
            }
            Shape::Map { value, .. } => Some(value.as_ref()),
            _ => None,
        }
    }
}

/// `std::any::type_name` without module paths, e.g. `Vec<Point>`.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    // Generic types keep their full name; trimming inside brackets would need allocation.
    if full.contains('<') {
        return full;
    }
    full.rsplit("::").next().unwrap_or(full)
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Any => f.write_str("any"),
            Shape::Bool => f.write_str("boolean"),
            Shape::Integer => f.write_str("integer"),
            Shape::Float => f.write_str("float"),
            Shape::String => f.write_str("string"),
            Shape::Char => f.write_str("char"),
            Shape::OffsetDateTime => f.write_str("offset date-time"),
            Shape::LocalDateTime => f.write_str("local date-time"),
            Shape::LocalDate => f.write_str("local date"),
            Shape::LocalTime => f.write_str("local time"),
            Shape::Sequence(element) => write!(f, "list<{}>", element),
            Shape::Set(element) => write!(f, "set<{}>", element),
            Shape::Map { key, value } => write!(f, "map<{}, {}>", key, value),
            Shape::Optional(inner) => write!(f, "optional<{}>", inner),
            Shape::Constants { name, .. } => write!(f, "enum {}", name),
            Shape::Record { name, .. } => write!(f, "record {}", name),
            Shape::Opaque(name) => f.write_str(name),
        }
    }
}

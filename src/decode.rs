//! Type-directed decoding from [`TomlValue`] trees into native values.
//!
//! Decoding a value into `T` first offers it to every converter registered
//! for `T`, in registration order. A converter either produces the value or
//! [declines](Conversion::Declined); when all decline (or none exist) the
//! structural rule of `T` applies ([`Decode::decode`]).
//!
//! ## Examples
//!
//! ```rust
//! use toml_codec::{from_str, Conversion, DecoderBuilder, TomlValue};
//!
//! // Accept "yes"/"no" for booleans, leave everything else to the built-in rule.
//! let decoder = DecoderBuilder::new()
//!     .with_decoder::<bool, _>(|_, _, value| {
//!         Ok(match value.as_str() {
//!             Some("yes") => Conversion::Converted(true),
//!             Some("no") => Conversion::Converted(false),
//!             _ => Conversion::Declined,
//!         })
//!     })
//!     .build();
//!
//! assert!(decoder.decode::<bool>(&TomlValue::from("yes")).unwrap());
//! assert!(!decoder.decode::<bool>(&TomlValue::from(false)).unwrap());
//! assert!(decoder.decode::<bool>(&TomlValue::from("maybe")).is_err());
//!
//! let root = from_str("[server]\nports = [80, 443]").unwrap();
//! let ports: Option<Vec<u16>> = decoder.get(&root, &["server", "ports"]).unwrap();
//! assert_eq!(ports, Some(vec![80, 443]));
//! ```

use crate::record::{FieldReader, Record};
use crate::registry::{Conversion, NameMapping, Registry};
use crate::traverse::{project, TraversalMode};
use crate::{Error, Result, Shape, TomlTable, TomlValue};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, trace};

/// A type-erased decode converter.
type DecodeFn =
    Arc<dyn Fn(&Decoder, &Shape, &TomlValue) -> Result<Conversion<Box<dyn Any>>> + Send + Sync>;

/// A native type that can be decoded from a [`TomlValue`].
pub trait Decode: Sized + 'static {
    /// The shape requested when decoding into this type.
    fn shape() -> Shape;

    /// The structural rule, applied after every registered converter declined.
    ///
    /// Types without a structural rule keep the default body, which reports
    /// that no conversion applies.
    fn decode(value: &TomlValue, decoder: &Decoder) -> Result<Self> {
        let _ = decoder;
        Err(Error::no_conversion(value, &Self::shape()))
    }

    /// The value of a record slot of this type that nothing supplies.
    ///
    /// `None` marks the type as required. Nullable types return `Some`.
    fn absent() -> Option<Self> {
        None
    }
}

/// An immutable decode engine.
///
/// Cloning is cheap; clones share their registrations. `with_*` methods
/// return a new engine and leave `self` untouched.
#[derive(Clone, Default)]
pub struct Decoder {
    registry: Registry<DecodeFn>,
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("converters", &self.registry.converter_count())
            .field("mappings", &self.registry.mapping_count())
            .field("defaults", &self.registry.default_count())
            .finish()
    }
}

impl Decoder {
    /// A decoder with no registrations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `value` into `T`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a converter, or the error of the
    /// structural rule once every converter declined.
    pub fn decode<T: Decode>(&self, value: &TomlValue) -> Result<T> {
        let shape = T::shape();
        match self.try_converters::<T>(&shape, value)? {
            Some(converted) => Ok(converted),
            None => T::decode(value, self),
        }
    }

    /// Decodes `value` into a type without a structural rule, using only the
    /// converters registered for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decoding`] when every converter declines.
    pub fn convert<T: 'static>(&self, shape: &Shape, value: &TomlValue) -> Result<T> {
        self.try_converters::<T>(shape, value)?
            .ok_or_else(|| Error::no_conversion(value, shape))
    }

    /// Builds the record `R` from `table`, bypassing converters for `R` itself.
    ///
    /// # Errors
    ///
    /// Returns the first slot error raised while reading.
    pub fn decode_record<R: Record>(&self, table: &TomlTable) -> Result<R> {
        let type_id = TypeId::of::<R>();
        let reader = FieldReader::new(
            R::NAME,
            table,
            self.registry.mapping(type_id),
            self.registry.default_fields(type_id),
            self,
        );
        R::read(&reader)
    }

    /// Decodes the value at `path`, flattening nested array fan-outs.
    ///
    /// Returns `Ok(None)` when the path does not exist.
    ///
    /// # Errors
    ///
    /// Returns a decoding error when the addressed value does not fit `T`.
    pub fn get<T: Decode>(&self, root: &TomlTable, path: &[&str]) -> Result<Option<T>> {
        self.project_into(root, path, TraversalMode::Flattened)
    }

    /// Like [`Decoder::get`], but keeps one level of nesting per array crossed.
    ///
    /// # Errors
    ///
    /// Returns a decoding error when the addressed value does not fit `T`.
    pub fn get_grouped<T: Decode>(&self, root: &TomlTable, path: &[&str]) -> Result<Option<T>> {
        self.project_into(root, path, TraversalMode::Grouped)
    }

    /// Returns a new engine with `converter` tried after the existing ones for `T`.
    #[must_use]
    pub fn with_decoder<T, F>(&self, converter: F) -> Decoder
    where
        T: 'static,
        F: Fn(&Decoder, &Shape, &TomlValue) -> Result<Conversion<T>> + Send + Sync + 'static,
    {
        self.to_builder().with_decoder(converter).build()
    }

    /// Returns a new engine with a name mapping for `R`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid mappings.
    pub fn with_mapping<R: Record>(&self, pairs: &[(&str, &str)]) -> Result<Decoder> {
        Ok(self.to_builder().with_mapping::<R>(pairs)?.build())
    }

    /// Returns a new engine with a default instance for `R`.
    #[must_use]
    pub fn with_default<R>(&self, prototype: &R) -> Decoder
    where
        R: Record + Clone + Send + Sync,
    {
        self.to_builder().with_default(prototype).build()
    }

    /// A builder seeded with this engine's registrations.
    #[must_use]
    pub fn to_builder(&self) -> DecoderBuilder {
        DecoderBuilder {
            registry: self.registry.clone(),
        }
    }

    fn try_converters<T: 'static>(&self, shape: &Shape, value: &TomlValue) -> Result<Option<T>> {
        let converters = self.registry.converters(TypeId::of::<T>());
        for (index, converter) in converters.iter().enumerate() {
            match converter(self, shape, value)? {
                Conversion::Converted(boxed) => {
                    return boxed.downcast::<T>().map(|typed| Some(*typed)).map_err(|_| {
                        Error::custom(format!("converter for {} returned another type", shape))
                    });
                }
                Conversion::Declined => {
                    trace!(shape = %shape, index, "converter declined");
                }
            }
        }
        if !converters.is_empty() {
            debug!(shape = %shape, "all converters declined, applying structural rules");
        }
        Ok(None)
    }

    fn project_into<T: Decode>(
        &self,
        root: &TomlTable,
        path: &[&str],
        mode: TraversalMode,
    ) -> Result<Option<T>> {
        project(root, path, mode)
            .map(|value| self.decode(&value))
            .transpose()
    }
}

/// Accumulates registrations for a [`Decoder`].
///
/// ```rust
/// use toml_codec::{toml, toml_record, DecoderBuilder};
///
/// toml_record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Point { pub x: i64, pub y: i64 }
/// }
///
/// let decoder = DecoderBuilder::new()
///     .with_default(&Point { x: 0, y: 0 })
///     .build();
/// let point: Point = decoder.decode(&toml!({"x": 42})).unwrap();
/// assert_eq!(point, Point { x: 42, y: 0 });
/// ```
#[derive(Clone, Default)]
pub struct DecoderBuilder {
    registry: Registry<DecodeFn>,
}

impl fmt::Debug for DecoderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderBuilder")
            .field("converters", &self.registry.converter_count())
            .field("mappings", &self.registry.mapping_count())
            .field("defaults", &self.registry.default_count())
            .finish()
    }
}

impl DecoderBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `converter` for `T`, after any converters already registered.
    #[must_use]
    pub fn with_decoder<T, F>(mut self, converter: F) -> Self
    where
        T: 'static,
        F: Fn(&Decoder, &Shape, &TomlValue) -> Result<Conversion<T>> + Send + Sync + 'static,
    {
        let erased: DecodeFn = Arc::new(move |decoder: &Decoder, shape: &Shape, value: &TomlValue| {
            Ok(converter(decoder, shape, value)?.map(|typed| Box::new(typed) as Box<dyn Any>))
        });
        self.registry.push(TypeId::of::<T>(), erased);
        debug!(
            target_type = std::any::type_name::<T>(),
            "registered decode converter"
        );
        self
    }

    /// Registers `(document name, native name)` pairs for `R`, replacing any
    /// earlier mapping for `R`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a pair names an unknown field or two
    /// fields would read the same document key.
    pub fn with_mapping<R: Record>(mut self, pairs: &[(&str, &str)]) -> Result<Self> {
        let mapping = Arc::new(NameMapping::new::<R>(pairs)?);
        Ok(self.with_shared_mapping::<R>(mapping))
    }

    /// Registers a copy of `prototype` as the default instance of `R`.
    ///
    /// Slots missing from a document receive a clone of the prototype's
    /// field as it is; converters do not see it.
    #[must_use]
    pub fn with_default<R>(mut self, prototype: &R) -> Self
    where
        R: Record + Clone + Send + Sync,
    {
        self.registry.set_default(prototype.clone());
        debug!(record = R::NAME, "registered default instance");
        self
    }

    pub(crate) fn with_shared_mapping<R: Record>(mut self, mapping: Arc<NameMapping>) -> Self {
        self.registry.set_mapping(TypeId::of::<R>(), mapping);
        debug!(record = R::NAME, "registered decode name mapping");
        self
    }

    /// Freezes the registrations into a [`Decoder`].
    #[must_use]
    pub fn build(self) -> Decoder {
        Decoder {
            registry: self.registry,
        }
    }
}

impl Decode for bool {
    fn shape() -> Shape {
        Shape::Bool
    }

    fn decode(value: &TomlValue, _: &Decoder) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| Error::no_conversion(value, &Shape::Bool))
    }
}

macro_rules! decode_integer {
    ($($ty:ty),*) => {$(
        impl Decode for $ty {
            fn shape() -> Shape {
                Shape::Integer
            }

            fn decode(value: &TomlValue, _: &Decoder) -> Result<Self> {
                let integer = value
                    .as_integer()
                    .ok_or_else(|| Error::no_conversion(value, &Shape::Integer))?;
                <$ty>::try_from(integer).map_err(|_| {
                    Error::decoding(value, &Shape::Integer, concat!("out of range for ", stringify!($ty)))
                })
            }
        }
    )*};
}

decode_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Decode for f64 {
    fn shape() -> Shape {
        Shape::Float
    }

    /// Integers widen to floats.
    fn decode(value: &TomlValue, _: &Decoder) -> Result<Self> {
        match value {
            TomlValue::Float(f) => Ok(*f),
            TomlValue::Integer(i) => Ok(*i as f64),
            _ => Err(Error::no_conversion(value, &Shape::Float)),
        }
    }
}

impl Decode for f32 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn decode(value: &TomlValue, decoder: &Decoder) -> Result<Self> {
        let float = f64::decode(value, decoder)?;
        if float.is_finite() && float.abs() > f64::from(f32::MAX) {
            return Err(Error::decoding(value, &Shape::Float, "out of range for f32"));
        }
        Ok(float as f32)
    }
}

impl Decode for String {
    fn shape() -> Shape {
        Shape::String
    }

    fn decode(value: &TomlValue, _: &Decoder) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::no_conversion(value, &Shape::String))
    }
}

impl Decode for char {
    fn shape() -> Shape {
        Shape::Char
    }

    fn decode(value: &TomlValue, _: &Decoder) -> Result<Self> {
        let text = value
            .as_str()
            .ok_or_else(|| Error::no_conversion(value, &Shape::Char))?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(Error::decoding(value, &Shape::Char, "expected exactly one character")),
        }
    }
}

macro_rules! decode_datetime {
    ($ty:ty, $shape:ident, $accessor:ident) => {
        impl Decode for $ty {
            fn shape() -> Shape {
                Shape::$shape
            }

            fn decode(value: &TomlValue, _: &Decoder) -> Result<Self> {
                value
                    .$accessor()
                    .copied()
                    .ok_or_else(|| Error::no_conversion(value, &Shape::$shape))
            }
        }
    };
}

decode_datetime!(DateTime<FixedOffset>, OffsetDateTime, as_offset_datetime);
decode_datetime!(NaiveDateTime, LocalDateTime, as_local_datetime);
decode_datetime!(NaiveDate, LocalDate, as_local_date);
decode_datetime!(NaiveTime, LocalTime, as_local_time);

/// The untyped request: every value is returned as it is.
impl Decode for TomlValue {
    fn shape() -> Shape {
        Shape::Any
    }

    fn decode(value: &TomlValue, _: &Decoder) -> Result<Self> {
        Ok(value.clone())
    }
}

impl Decode for TomlTable {
    fn shape() -> Shape {
        Shape::map(Shape::Any)
    }

    fn decode(value: &TomlValue, _: &Decoder) -> Result<Self> {
        value
            .as_table()
            .cloned()
            .ok_or_else(|| Error::no_conversion(value, &Self::shape()))
    }
}

impl<T: Decode> Decode for Option<T> {
    fn shape() -> Shape {
        Shape::optional(T::shape())
    }

    fn decode(value: &TomlValue, decoder: &Decoder) -> Result<Self> {
        decoder.decode::<T>(value).map(Some)
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

impl<T: Decode> Decode for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn decode(value: &TomlValue, decoder: &Decoder) -> Result<Self> {
        decoder.decode::<T>(value).map(Box::new)
    }

    fn absent() -> Option<Self> {
        T::absent().map(Box::new)
    }
}

fn decode_elements<T, C>(value: &TomlValue, decoder: &Decoder, shape: Shape) -> Result<C>
where
    T: Decode,
    C: FromIterator<T>,
{
    match value {
        TomlValue::Array(elements) => elements
            .iter()
            .map(|element| decoder.decode::<T>(element))
            .collect(),
        _ => Err(Error::no_conversion(value, &shape)),
    }
}

fn decode_entries<V, C>(value: &TomlValue, decoder: &Decoder, shape: Shape) -> Result<C>
where
    V: Decode,
    C: FromIterator<(String, V)>,
{
    match value {
        TomlValue::Table(table) => table
            .iter()
            .map(|(key, entry)| Ok((key.clone(), decoder.decode::<V>(entry)?)))
            .collect(),
        _ => Err(Error::no_conversion(value, &shape)),
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }

    fn decode(value: &TomlValue, decoder: &Decoder) -> Result<Self> {
        decode_elements(value, decoder, Self::shape())
    }
}

impl<T: Decode> Decode for VecDeque<T> {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }

    fn decode(value: &TomlValue, decoder: &Decoder) -> Result<Self> {
        decode_elements(value, decoder, Self::shape())
    }
}

impl<T: Decode + Eq + Hash> Decode for HashSet<T> {
    fn shape() -> Shape {
        Shape::set(T::shape())
    }

    fn decode(value: &TomlValue, decoder: &Decoder) -> Result<Self> {
        decode_elements(value, decoder, Self::shape())
    }
}

impl<T: Decode + Ord> Decode for BTreeSet<T> {
    fn shape() -> Shape {
        Shape::set(T::shape())
    }

    fn decode(value: &TomlValue, decoder: &Decoder) -> Result<Self> {
        decode_elements(value, decoder, Self::shape())
    }
}

impl<V: Decode> Decode for HashMap<String, V> {
    fn shape() -> Shape {
        Shape::map(V::shape())
    }

    fn decode(value: &TomlValue, decoder: &Decoder) -> Result<Self> {
        decode_entries(value, decoder, Self::shape())
    }
}

impl<V: Decode> Decode for BTreeMap<String, V> {
    fn shape() -> Shape {
        Shape::map(V::shape())
    }

    fn decode(value: &TomlValue, decoder: &Decoder) -> Result<Self> {
        decode_entries(value, decoder, Self::shape())
    }
}

impl<V: Decode> Decode for IndexMap<String, V> {
    fn shape() -> Shape {
        Shape::map(V::shape())
    }

    fn decode(value: &TomlValue, decoder: &Decoder) -> Result<Self> {
        decode_entries(value, decoder, Self::shape())
    }
}

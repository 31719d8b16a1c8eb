//! Encoding native values into [`TomlValue`] trees.
//!
//! The mirror of [`decode`](crate::decode): converters registered for the
//! native type run first, in registration order, then the type's
//! [`Encode`] impl. TOML has no null, so an absent value (`None`) is dropped
//! from the table or array that contains it.
//!
//! ```rust
//! use toml_codec::{toml, Encoder};
//! use std::collections::BTreeMap;
//!
//! let mut limits = BTreeMap::new();
//! limits.insert("cpu".to_string(), Some(2));
//! limits.insert("memory".to_string(), None);
//!
//! let value = Encoder::new().encode(&limits).unwrap();
//! assert_eq!(value, toml!({"cpu": 2}));
//! ```

use crate::record::{FieldWriter, Record};
use crate::registry::{Conversion, NameMapping, Registry};
use crate::shape::short_type_name;
use crate::{Error, Result, TomlTable, TomlValue};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// A type-erased encode converter.
type EncodeFn = Arc<dyn Fn(&Encoder, &dyn Any) -> Result<Conversion<TomlValue>> + Send + Sync>;

/// A native type that can be encoded into a [`TomlValue`].
pub trait Encode: 'static {
    /// Encodes `self`. `Ok(None)` means the value is absent.
    fn encode(&self, encoder: &Encoder) -> Result<Option<TomlValue>> {
        let _ = encoder;
        Err(Error::encoding(
            format!("value of type `{}`", short_type_name::<Self>()),
            None,
            "no applicable conversion",
        ))
    }
}

/// An immutable encode engine.
#[derive(Clone, Default)]
pub struct Encoder {
    registry: Registry<EncodeFn>,
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("converters", &self.registry.converter_count())
            .field("mappings", &self.registry.mapping_count())
            .finish()
    }
}

impl Encoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes `value`, which must not be absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] when nothing can encode the value or when
    /// it is absent.
    pub fn encode<T: Encode>(&self, value: &T) -> Result<TomlValue> {
        self.encode_optional(value)?.ok_or_else(|| {
            Error::encoding(
                format!("absent value of type `{}`", short_type_name::<T>()),
                None,
                "TOML has no null value",
            )
        })
    }

    /// Encodes `value`, returning `None` when it is absent.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a converter or by the [`Encode`] impl.
    pub fn encode_optional<T: Encode>(&self, value: &T) -> Result<Option<TomlValue>> {
        let converters = self.registry.converters(TypeId::of::<T>());
        for (index, converter) in converters.iter().enumerate() {
            match converter(self, value as &dyn Any)? {
                Conversion::Converted(encoded) => return Ok(Some(encoded)),
                Conversion::Declined => {
                    trace!(source_type = short_type_name::<T>(), index, "converter declined");
                }
            }
        }
        if !converters.is_empty() {
            debug!(
                source_type = short_type_name::<T>(),
                "all converters declined, applying structural rules"
            );
        }
        value.encode(self)
    }

    /// Encodes the record `R` as a table, bypassing converters for `R` itself.
    ///
    /// # Errors
    ///
    /// Returns the first slot error raised while writing.
    pub fn encode_record<R: Record>(&self, record: &R) -> Result<TomlTable> {
        let mut writer = FieldWriter::new(self, self.registry.mapping(TypeId::of::<R>()));
        record.write(&mut writer)?;
        Ok(writer.finish())
    }

    /// Encodes `value` as a document root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] when `value` does not encode to a table.
    pub fn encode_table<T: Encode>(&self, value: &T) -> Result<TomlTable> {
        match self.encode(value)? {
            TomlValue::Table(table) => Ok(table),
            other => Err(Error::encoding(
                other.summary(),
                Some("table"),
                "a document root must be a table",
            )),
        }
    }

    /// Returns a new engine with `converter` tried after the existing ones for `T`.
    #[must_use]
    pub fn with_encoder<T, F>(&self, converter: F) -> Encoder
    where
        T: 'static,
        F: Fn(&Encoder, &T) -> Result<Conversion<TomlValue>> + Send + Sync + 'static,
    {
        self.to_builder().with_encoder(converter).build()
    }

    /// Returns a new engine with a name mapping for `R`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid mappings.
    pub fn with_mapping<R: Record>(&self, pairs: &[(&str, &str)]) -> Result<Encoder> {
        Ok(self.to_builder().with_mapping::<R>(pairs)?.build())
    }

    #[must_use]
    pub fn to_builder(&self) -> EncoderBuilder {
        EncoderBuilder {
            registry: self.registry.clone(),
        }
    }
}

/// Accumulates registrations for an [`Encoder`].
///
/// ```rust
/// use toml_codec::{Conversion, EncoderBuilder, TomlValue};
/// use std::time::Duration;
///
/// let encoder = EncoderBuilder::new()
///     .with_encoder::<Duration, _>(|_, d| {
///         Ok(Conversion::Converted(TomlValue::from(format!("{}s", d.as_secs()))))
///     })
///     .build();
/// assert_eq!(encoder.convert(&Duration::from_secs(90)).unwrap(), TomlValue::from("90s"));
/// ```
#[derive(Clone, Default)]
pub struct EncoderBuilder {
    registry: Registry<EncodeFn>,
}

impl fmt::Debug for EncoderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderBuilder")
            .field("converters", &self.registry.converter_count())
            .field("mappings", &self.registry.mapping_count())
            .finish()
    }
}

impl EncoderBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `converter` for `T`, after any converters already registered.
    #[must_use]
    pub fn with_encoder<T, F>(mut self, converter: F) -> Self
    where
        T: 'static,
        F: Fn(&Encoder, &T) -> Result<Conversion<TomlValue>> + Send + Sync + 'static,
    {
        let erased: EncodeFn = Arc::new(move |encoder: &Encoder, value: &dyn Any| {
            match value.downcast_ref::<T>() {
                Some(typed) => converter(encoder, typed),
                None => Ok(Conversion::Declined),
            }
        });
        self.registry.push(TypeId::of::<T>(), erased);
        debug!(
            source_type = std::any::type_name::<T>(),
            "registered encode converter"
        );
        self
    }

    /// Registers `(document name, native name)` pairs for `R`, replacing any
    /// earlier mapping for `R`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a pair names an unknown field or two
    /// fields would write the same document key.
    pub fn with_mapping<R: Record>(mut self, pairs: &[(&str, &str)]) -> Result<Self> {
        let mapping = Arc::new(NameMapping::new::<R>(pairs)?);
        Ok(self.with_shared_mapping::<R>(mapping))
    }

    pub(crate) fn with_shared_mapping<R: Record>(mut self, mapping: Arc<NameMapping>) -> Self {
        self.registry.set_mapping(TypeId::of::<R>(), mapping);
        debug!(record = R::NAME, "registered encode name mapping");
        self
    }

    #[must_use]
    pub fn build(self) -> Encoder {
        Encoder {
            registry: self.registry,
        }
    }
}

impl Encoder {
    /// Encodes a value of a type without an [`Encode`] impl, using only the
    /// converters registered for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] when every converter declines.
    pub fn convert<T: 'static>(&self, value: &T) -> Result<TomlValue> {
        for converter in self.registry.converters(TypeId::of::<T>()) {
            if let Conversion::Converted(encoded) = converter(self, value as &dyn Any)? {
                return Ok(encoded);
            }
        }
        Err(Error::encoding(
            format!("value of type `{}`", short_type_name::<T>()),
            None,
            "no applicable conversion",
        ))
    }
}

impl Encode for bool {
    fn encode(&self, _: &Encoder) -> Result<Option<TomlValue>> {
        Ok(Some(TomlValue::Bool(*self)))
    }
}

macro_rules! encode_integer {
    ($($ty:ty),*) => {$(
        impl Encode for $ty {
            fn encode(&self, _: &Encoder) -> Result<Option<TomlValue>> {
                i64::try_from(*self).map(|i| Some(TomlValue::Integer(i))).map_err(|_| {
                    Error::encoding(self, Some("integer"), "out of range for a 64-bit signed integer")
                })
            }
        }
    )*};
}

encode_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Encode for f64 {
    fn encode(&self, _: &Encoder) -> Result<Option<TomlValue>> {
        Ok(Some(TomlValue::Float(*self)))
    }
}

impl Encode for f32 {
    fn encode(&self, _: &Encoder) -> Result<Option<TomlValue>> {
        Ok(Some(TomlValue::Float(f64::from(*self))))
    }
}

impl Encode for String {
    fn encode(&self, _: &Encoder) -> Result<Option<TomlValue>> {
        Ok(Some(TomlValue::String(self.clone())))
    }
}

impl Encode for &'static str {
    fn encode(&self, _: &Encoder) -> Result<Option<TomlValue>> {
        Ok(Some(TomlValue::String((*self).to_string())))
    }
}

impl Encode for char {
    fn encode(&self, _: &Encoder) -> Result<Option<TomlValue>> {
        Ok(Some(TomlValue::String(self.to_string())))
    }
}

macro_rules! encode_datetime {
    ($($ty:ty => $variant:ident),*) => {$(
        impl Encode for $ty {
            fn encode(&self, _: &Encoder) -> Result<Option<TomlValue>> {
                Ok(Some(TomlValue::$variant(*self)))
            }
        }
    )*};
}

encode_datetime!(
    DateTime<FixedOffset> => OffsetDateTime,
    NaiveDateTime => LocalDateTime,
    NaiveDate => LocalDate,
    NaiveTime => LocalTime
);

impl Encode for TomlValue {
    fn encode(&self, _: &Encoder) -> Result<Option<TomlValue>> {
        Ok(Some(self.clone()))
    }
}

impl Encode for TomlTable {
    fn encode(&self, _: &Encoder) -> Result<Option<TomlValue>> {
        Ok(Some(TomlValue::Table(self.clone())))
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, encoder: &Encoder) -> Result<Option<TomlValue>> {
        match self {
            Some(value) => encoder.encode_optional(value),
            None => Ok(None),
        }
    }
}

impl<T: Encode> Encode for Box<T> {
    fn encode(&self, encoder: &Encoder) -> Result<Option<TomlValue>> {
        encoder.encode_optional(&**self)
    }
}

fn encode_elements<'a, T, I>(elements: I, encoder: &Encoder) -> Result<Option<TomlValue>>
where
    T: Encode,
    I: IntoIterator<Item = &'a T>,
{
    let mut array = Vec::new();
    for element in elements {
        if let Some(encoded) = encoder.encode_optional(element)? {
            array.push(encoded);
        }
    }
    Ok(Some(TomlValue::Array(array)))
}

fn encode_entries<'a, V, I>(entries: I, encoder: &Encoder) -> Result<Option<TomlValue>>
where
    V: Encode,
    I: IntoIterator<Item = (&'a String, &'a V)>,
{
    let mut table = TomlTable::new();
    for (key, value) in entries {
        if let Some(encoded) = encoder.encode_optional(value)? {
            table.insert(key.clone(), encoded);
        }
    }
    Ok(Some(TomlValue::Table(table)))
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, encoder: &Encoder) -> Result<Option<TomlValue>> {
        encode_elements(self, encoder)
    }
}

impl<T: Encode> Encode for VecDeque<T> {
    fn encode(&self, encoder: &Encoder) -> Result<Option<TomlValue>> {
        encode_elements(self, encoder)
    }
}

impl<T: Encode> Encode for HashSet<T> {
    fn encode(&self, encoder: &Encoder) -> Result<Option<TomlValue>> {
        encode_elements(self, encoder)
    }
}

impl<T: Encode> Encode for BTreeSet<T> {
    fn encode(&self, encoder: &Encoder) -> Result<Option<TomlValue>> {
        encode_elements(self, encoder)
    }
}

impl<V: Encode> Encode for HashMap<String, V> {
    fn encode(&self, encoder: &Encoder) -> Result<Option<TomlValue>> {
        encode_entries(self, encoder)
    }
}

impl<V: Encode> Encode for BTreeMap<String, V> {
    fn encode(&self, encoder: &Encoder) -> Result<Option<TomlValue>> {
        encode_entries(self, encoder)
    }
}

impl<V: Encode> Encode for IndexMap<String, V> {
    fn encode(&self, encoder: &Encoder) -> Result<Option<TomlValue>> {
        encode_entries(self, encoder)
    }
}

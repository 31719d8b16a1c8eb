//! Composite records and enumerated constants.
//!
//! Rust has no constructor introspection, so a record type describes its
//! field slots itself through [`Record`]. Most types get the impl from the
//! [`toml_record!`](crate::toml_record) macro; hand-written impls are fine
//! when a type needs something the macro cannot express.
//!
//! While decoding, [`FieldReader`] resolves each slot in this order:
//!
//! 1. the document key (the native name, or its registered mapping)
//! 2. for slots with a language-level default, that default
//! 3. the field of the registered default instance
//! 4. [`Decode::absent`] (`None` for `Option<T>` slots)
//! 5. otherwise [`Error::MissingField`]
//!
//! ```rust
//! use toml_codec::{decode_str, toml_record};
//!
//! toml_record! {
//!     #[derive(Debug, PartialEq)]
//!     pub struct Server {
//!         pub host: String,
//!         pub port: u16 = 8080,
//!         pub label: Option<String>,
//!     }
//! }
//!
//! let server: Server = decode_str("host = \"example.org\"").unwrap();
//! assert_eq!(server.port, 8080);
//! assert_eq!(server.label, None);
//! ```

use crate::registry::{DefaultFields, NameMapping};
use crate::{Decode, Decoder, Encode, Encoder, Error, Result, Shape, TomlTable, TomlValue};
use std::any::Any;

/// A native composite type made of named field slots.
pub trait Record: Sized + 'static {
    /// Type name used in shapes and error messages.
    const NAME: &'static str;

    /// Native field names, in declaration order.
    const FIELDS: &'static [&'static str];

    /// Builds the record from its slots.
    fn read(reader: &FieldReader<'_>) -> Result<Self>;

    /// Writes every slot of the record.
    fn write(&self, writer: &mut FieldWriter<'_>) -> Result<()>;

    /// A copy of the field `native`, used to backfill slots from a
    /// registered default instance. `None` for unknown names.
    fn clone_field(&self, native: &str) -> Option<Box<dyn Any>>;
}

/// Slot access for [`Record::read`].
pub struct FieldReader<'a> {
    record: &'static str,
    table: &'a TomlTable,
    mapping: Option<&'a NameMapping>,
    defaults: Option<&'a DefaultFields>,
    decoder: &'a Decoder,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(
        record: &'static str,
        table: &'a TomlTable,
        mapping: Option<&'a NameMapping>,
        defaults: Option<&'a DefaultFields>,
        decoder: &'a Decoder,
    ) -> Self {
        FieldReader {
            record,
            table,
            mapping,
            defaults,
            decoder,
        }
    }

    /// Decodes the slot `native`, falling back to a copy of the default
    /// instance's field and then to [`Decode::absent`].
    ///
    /// # Errors
    ///
    /// Returns the decoding error of the slot value, or
    /// [`Error::MissingField`] when nothing supplies a value.
    pub fn field<T: Decode>(&self, native: &str) -> Result<T> {
        if let Some(value) = self.document_value(native) {
            return self.decoder.decode(value);
        }
        if let Some(copy) = self.defaults.and_then(|defaults| defaults(native)) {
            return copy.downcast::<T>().map(|typed| *typed).map_err(|_| {
                Error::custom(format!(
                    "default instance of record {} has another type for field `{}`",
                    self.record, native
                ))
            });
        }
        T::absent().ok_or_else(|| Error::missing_field(self.record, native))
    }

    /// Decodes the slot `native`, or returns `fallback()` when the document
    /// does not contain it. Default instances are not consulted.
    pub fn field_or_else<T: Decode>(&self, native: &str, fallback: impl FnOnce() -> T) -> Result<T> {
        match self.document_value(native) {
            Some(value) => self.decoder.decode(value),
            None => Ok(fallback()),
        }
    }

    pub fn field_or_default<T: Decode + Default>(&self, native: &str) -> Result<T> {
        self.field_or_else(native, T::default)
    }

    /// The raw document value of slot `native`, if present.
    #[must_use]
    pub fn document_value(&self, native: &str) -> Option<&'a TomlValue> {
        let key = self.mapping.map_or(native, |mapping| mapping.document_name(native));
        self.table.get(key)
    }

    #[must_use]
    pub fn decoder(&self) -> &'a Decoder {
        self.decoder
    }
}

/// Slot output for [`Record::write`].
pub struct FieldWriter<'a> {
    encoder: &'a Encoder,
    mapping: Option<&'a NameMapping>,
    table: TomlTable,
}

impl<'a> FieldWriter<'a> {
    pub(crate) fn new(encoder: &'a Encoder, mapping: Option<&'a NameMapping>) -> Self {
        FieldWriter {
            encoder,
            mapping,
            table: TomlTable::new(),
        }
    }

    /// Encodes `value` under the document name of slot `native`. Absent
    /// values (`None`) leave the slot out.
    pub fn field<T: Encode>(&mut self, native: &str, value: &T) -> Result<()> {
        if let Some(encoded) = self.encoder.encode_optional(value)? {
            let key = self.mapping.map_or(native, |mapping| mapping.document_name(native));
            self.table.insert(key.to_string(), encoded);
        }
        Ok(())
    }

    #[must_use]
    pub fn encoder(&self) -> &'a Encoder {
        self.encoder
    }

    pub(crate) fn finish(self) -> TomlTable {
        self.table
    }
}

/// A fieldless enumeration matched by constant name.
pub trait Constants: Sized + 'static {
    const NAME: &'static str;

    /// Every constant name, in declaration order.
    const NAMES: &'static [&'static str];

    /// Case-sensitive lookup.
    fn from_name(name: &str) -> Option<Self>;

    fn name(&self) -> &'static str;
}

/// Structural rule for enumerated constants: a string naming exactly one constant.
///
/// # Errors
///
/// Returns [`Error::Decoding`] for non-strings and unknown names.
pub fn decode_constant<C: Constants>(value: &TomlValue) -> Result<C> {
    let shape = Shape::constants::<C>();
    let name = value
        .as_str()
        .ok_or_else(|| Error::no_conversion(value, &shape))?;
    C::from_name(name).ok_or_else(|| {
        Error::decoding(
            value,
            &shape,
            format!("expected one of {}", C::NAMES.join(", ")),
        )
    })
}

#[must_use]
pub fn encode_constant<C: Constants>(constant: &C) -> TomlValue {
    TomlValue::String(constant.name().to_string())
}

//! A decoder and an encoder that share their record registrations.
//!
//! Name mappings describe one document layout, so a [`Codec`] registers
//! each mapping once and hands the same validated [`NameMapping`] to both
//! directions. Converters stay per direction.
//!
//! ```rust
//! use toml_codec::{toml, toml_record, CodecBuilder};
//!
//! toml_record! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct User { pub id: u64, pub name: String }
//! }
//!
//! let codec = CodecBuilder::new()
//!     .with_mapping::<User>(&[("user-id", "id")])
//!     .unwrap()
//!     .build();
//!
//! let user: User = codec.decode(&toml!({"user-id": 7, "name": "ada"})).unwrap();
//! assert_eq!(codec.encode(&user).unwrap(), toml!({"user-id": 7, "name": "ada"}));
//! ```

use crate::record::Record;
use crate::registry::{Conversion, NameMapping};
use crate::{
    Decode, Decoder, DecoderBuilder, Encode, Encoder, EncoderBuilder, Result, Shape, TomlTable,
    TomlValue,
};
use std::sync::Arc;
use tracing::debug;

/// An immutable pair of engines with shared mappings.
#[derive(Clone, Debug, Default)]
pub struct Codec {
    decoder: Decoder,
    encoder: Encoder,
}

impl Codec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs two existing engines as they are.
    #[must_use]
    pub fn from_parts(decoder: Decoder, encoder: Encoder) -> Self {
        Codec { decoder, encoder }
    }

    #[must_use]
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    #[must_use]
    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// See [`Decoder::decode`].
    ///
    /// # Errors
    ///
    /// Returns the decoding error for `value`.
    pub fn decode<T: Decode>(&self, value: &TomlValue) -> Result<T> {
        self.decoder.decode(value)
    }

    /// See [`Encoder::encode`].
    ///
    /// # Errors
    ///
    /// Returns the encoding error for `value`.
    pub fn encode<T: Encode>(&self, value: &T) -> Result<TomlValue> {
        self.encoder.encode(value)
    }

    /// See [`Decoder::get`].
    ///
    /// # Errors
    ///
    /// Returns a decoding error when the addressed value does not fit `T`.
    pub fn get<T: Decode>(&self, root: &TomlTable, path: &[&str]) -> Result<Option<T>> {
        self.decoder.get(root, path)
    }

    /// See [`Decoder::get_grouped`].
    ///
    /// # Errors
    ///
    /// Returns a decoding error when the addressed value does not fit `T`.
    pub fn get_grouped<T: Decode>(&self, root: &TomlTable, path: &[&str]) -> Result<Option<T>> {
        self.decoder.get_grouped(root, path)
    }

    /// Returns a new codec whose decoder also tries `converter` for `T`.
    #[must_use]
    pub fn with_decoder<T, F>(&self, converter: F) -> Codec
    where
        T: 'static,
        F: Fn(&Decoder, &Shape, &TomlValue) -> Result<Conversion<T>> + Send + Sync + 'static,
    {
        self.to_builder().with_decoder(converter).build()
    }

    /// Returns a new codec whose encoder also tries `converter` for `T`.
    #[must_use]
    pub fn with_encoder<T, F>(&self, converter: F) -> Codec
    where
        T: 'static,
        F: Fn(&Encoder, &T) -> Result<Conversion<TomlValue>> + Send + Sync + 'static,
    {
        self.to_builder().with_encoder(converter).build()
    }

    /// Returns a new codec with a name mapping for `R` in both directions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for invalid mappings.
    pub fn with_mapping<R: Record>(&self, pairs: &[(&str, &str)]) -> Result<Codec> {
        Ok(self.to_builder().with_mapping::<R>(pairs)?.build())
    }

    /// Returns a new codec with a default instance for `R`.
    #[must_use]
    pub fn with_default<R>(&self, prototype: &R) -> Codec
    where
        R: Record + Clone + Send + Sync,
    {
        self.to_builder().with_default(prototype).build()
    }

    #[must_use]
    pub fn to_builder(&self) -> CodecBuilder {
        CodecBuilder {
            decoder: self.decoder.to_builder(),
            encoder: self.encoder.to_builder(),
        }
    }
}

/// Accumulates registrations for a [`Codec`].
#[derive(Clone, Debug, Default)]
pub struct CodecBuilder {
    decoder: DecoderBuilder,
    encoder: EncoderBuilder,
}

impl CodecBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_decoder<T, F>(mut self, converter: F) -> Self
    where
        T: 'static,
        F: Fn(&Decoder, &Shape, &TomlValue) -> Result<Conversion<T>> + Send + Sync + 'static,
    {
        self.decoder = self.decoder.with_decoder(converter);
        self
    }

    #[must_use]
    pub fn with_encoder<T, F>(mut self, converter: F) -> Self
    where
        T: 'static,
        F: Fn(&Encoder, &T) -> Result<Conversion<TomlValue>> + Send + Sync + 'static,
    {
        self.encoder = self.encoder.with_encoder(converter);
        self
    }

    /// Validates `pairs` once and registers the mapping for both directions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for invalid mappings.
    pub fn with_mapping<R: Record>(mut self, pairs: &[(&str, &str)]) -> Result<Self> {
        let mapping = Arc::new(NameMapping::new::<R>(pairs)?);
        debug!(record = R::NAME, "sharing name mapping between decoder and encoder");
        self.decoder = self.decoder.with_shared_mapping::<R>(Arc::clone(&mapping));
        self.encoder = self.encoder.with_shared_mapping::<R>(mapping);
        Ok(self)
    }

    /// Registers a default instance of `R` with the decoder.
    #[must_use]
    pub fn with_default<R>(mut self, prototype: &R) -> Self
    where
        R: Record + Clone + Send + Sync,
    {
        self.decoder = self.decoder.with_default(prototype);
        self
    }

    #[must_use]
    pub fn build(self) -> Codec {
        Codec {
            decoder: self.decoder.build(),
            encoder: self.encoder.build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{toml, toml_record, Error};

    toml_record! {
        #[derive(Debug, Clone, PartialEq)]
        struct Account {
            owner: String,
            balance: i64,
        }
    }

    #[test]
    fn test_one_mapping_serves_both_directions() {
        let codec = CodecBuilder::new()
            .with_mapping::<Account>(&[("account-owner", "owner")])
            .unwrap()
            .build();
        let account = Account { owner: "ada".into(), balance: 12 };

        let encoded = codec.encode(&account).unwrap();
        assert_eq!(encoded, toml!({"account-owner": "ada", "balance": 12}));
        assert_eq!(codec.decode::<Account>(&encoded).unwrap(), account);
    }

    #[test]
    fn test_invalid_mapping_registers_nothing() {
        let err = CodecBuilder::new()
            .with_mapping::<Account>(&[("owner", "missing")])
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_registrations_leave_the_original_untouched() {
        let base = Codec::new();
        let mapped = base.with_mapping::<Account>(&[("who", "owner")]).unwrap();
        let value = toml!({"who": "bob", "balance": 1});

        assert!(base.decode::<Account>(&value).is_err());
        assert_eq!(mapped.decode::<Account>(&value).unwrap().owner, "bob");
        assert_eq!(format!("{:?}", base.to_builder()), format!("{:?}", CodecBuilder::new()));
    }

    #[test]
    fn test_default_instance_fills_decoded_records() {
        let codec = Codec::new().with_default(&Account { owner: "nobody".into(), balance: 0 });
        let account: Account = codec.decode(&toml!({"balance": 3})).unwrap();
        assert_eq!(account, Account { owner: "nobody".into(), balance: 3 });
    }
}

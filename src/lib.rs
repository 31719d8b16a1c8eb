//! # toml_codec
//!
//! A TOML front end with an extensible, type-directed codec between
//! documents and native Rust values.
//!
//! ## What it does
//!
//! Text is parsed into a [`TomlTable`] tree: dotted keys, `[table]` headers
//! and `[[array-of-tables]]` headers are folded into one root table with
//! TOML's conflict rules. That tree is then decoded into native types, or
//! native values are encoded back into a tree, by a [`Decoder`] or
//! [`Encoder`] whose behavior is extended through registrations:
//!
//! - **Converters**: ordered per-type functions that either convert a value
//!   or decline so the next converter (and finally the structural rule) runs
//! - **Name mappings**: document keys that differ from native field names
//! - **Default instances**: a prototype record whose fields fill in slots
//!   missing from a document
//!
//! A [`Codec`] pairs the two engines so one mapping registration covers
//! both directions.
//!
//! ## Key Features
//!
//! - **TOML 1.0 parser**: single pass, line/column error reporting
//! - **No reflection required**: records and enums opt in with
//!   [`toml_record!`] and [`toml_enum!`], or by implementing [`Record`]
//! - **Immutable engines**: every registration yields a new engine; built
//!   engines are `Send + Sync` and cheap to clone
//! - **Traversal**: [`get`] addresses values by key path and fans out across
//!   arrays of tables
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! toml_codec = "0.1"
//! ```
//!
//! ### Decoding a document
//!
//! ```rust
//! use toml_codec::{decode_str, toml_record};
//!
//! toml_record! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct Database {
//!         pub url: String,
//!         pub pool_size: u32 = 10,
//!         pub replicas: Vec<String>,
//!     }
//! }
//!
//! toml_record! {
//!     #[derive(Debug, PartialEq)]
//!     pub struct Config {
//!         pub name: String,
//!         pub database: Database,
//!     }
//! }
//!
//! let config: Config = decode_str(r#"
//! name = "orders"
//!
//! [database]
//! url = "postgres://localhost/orders"
//! replicas = ["r1", "r2"]
//! "#).unwrap();
//!
//! assert_eq!(config.database.pool_size, 10);
//! assert_eq!(config.database.replicas, vec!["r1", "r2"]);
//! ```
//!
//! ### Custom converters and key paths
//!
//! ```rust
//! use toml_codec::{from_str, Conversion, DecoderBuilder};
//! use std::time::Duration;
//!
//! let decoder = DecoderBuilder::new()
//!     .with_decoder::<Duration, _>(|_, _, value| {
//!         Ok(value
//!             .as_integer()
//!             .and_then(|ms| u64::try_from(ms).ok())
//!             .map(Duration::from_millis)
//!             .into())
//!     })
//!     .build();
//!
//! let root = from_str("[[jobs]]\ntimeout = 500\n[[jobs]]\ntimeout = 1500").unwrap();
//! let timeouts: Option<Vec<i64>> = decoder.get(&root, &["jobs", "timeout"]).unwrap();
//! assert_eq!(timeouts, Some(vec![500, 1500]));
//!
//! let first = root.get("jobs").unwrap().as_array().unwrap()[0].as_table().unwrap();
//! let timeout: Duration = decoder
//!     .convert(&toml_codec::Shape::opaque::<Duration>(), first.get("timeout").unwrap())
//!     .unwrap();
//! assert_eq!(timeout, Duration::from_millis(500));
//! ```
//!
//! ### Dynamic values with the toml! macro
//!
//! ```rust
//! use toml_codec::{toml, TomlValue};
//!
//! let value = toml!({
//!     "name": "Alice",
//!     "tags": ["rust", "toml"]
//! });
//!
//! if let TomlValue::Table(table) = value {
//!     assert_eq!(table.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! }
//! ```
//!
//! ## Performance Characteristics
//!
//! - **Parsing**: O(n) single pass over the input
//! - **Tree building**: each event walks only its own key path
//! - **Registrations**: copy-on-extend, so engines share their tables
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Nesting of inline values is bounded ([`ParseOptions::max_depth`])
//! - No panics in public API (except for logic errors that indicate bugs)
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Parse a document and decode it into records
//! - **`custom_decoders.rs`** - Converters, decline chaining, mappings and defaults
//! - **`traversal.rs`** - Key-path lookups across arrays of tables
//! - **`dynamic_values.rs`** - Working with `TomlValue` trees and merge
//!
//! Run any example with: `cargo run --example <name>`

pub mod builder;
pub mod codec;
pub mod decode;
pub mod encode;
pub mod error;
pub mod event;
pub mod macros;
pub mod map;
pub mod options;
pub mod parser;
pub mod record;
pub mod registry;
pub mod shape;
pub mod traverse;
pub mod value;

pub use builder::TreeBuilder;
pub use codec::{Codec, CodecBuilder};
pub use decode::{Decode, Decoder, DecoderBuilder};
pub use encode::{Encode, Encoder, EncoderBuilder};
pub use error::{Error, Result};
pub use event::{Event, KeyPath, Position};
pub use map::TomlTable;
pub use options::{ParseOptions, DEFAULT_MAX_DEPTH};
pub use parser::Parser;
pub use record::{
    decode_constant, encode_constant, Constants, FieldReader, FieldWriter, Record,
};
pub use registry::{Conversion, NameMapping};
pub use shape::Shape;
pub use traverse::{project, TraversalMode};
pub use value::{merge, TomlValue};

use std::io;

/// Parses TOML text into its root table.
///
/// # Examples
///
/// ```rust
/// use toml_codec::from_str;
///
/// let root = from_str("a.b = 1\na.c = 2").unwrap();
/// let a = root.get("a").and_then(|a| a.as_table()).unwrap();
/// assert_eq!(a.len(), 2);
/// ```
///
/// # Errors
///
/// Returns [`Error::Syntax`] for malformed text and [`Error::Build`] for
/// conflicting definitions. Error messages include line and column information.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(s: &str) -> Result<TomlTable> {
    from_str_with_options(s, ParseOptions::default())
}

/// Parses TOML text with custom [`ParseOptions`].
///
/// # Errors
///
/// Same as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options(s: &str, options: ParseOptions) -> Result<TomlTable> {
    let mut parser = Parser::with_options(s, options);
    let mut builder = TreeBuilder::new();
    while let Some(event) = parser.next_event()? {
        builder.push(event)?;
    }
    Ok(builder.finish())
}

/// Parses TOML from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use toml_codec::from_reader;
/// use std::io::Cursor;
///
/// let root = from_reader(Cursor::new(b"x = 1\ny = 2")).unwrap();
/// assert_eq!(root.len(), 2);
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails, otherwise the same as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R>(mut reader: R) -> Result<TomlTable>
where
    R: io::Read,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Parses TOML from UTF-8 bytes.
///
/// # Errors
///
/// Returns [`Error::Io`] if the bytes are not valid UTF-8, otherwise the
/// same as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(v: &[u8]) -> Result<TomlTable> {
    let s = std::str::from_utf8(v).map_err(|e| Error::io(&e.to_string()))?;
    from_str(s)
}

/// Folds syntax events produced by any grammar into a root table.
///
/// # Errors
///
/// Returns [`Error::Build`] for conflicting definitions.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_events<I>(events: I) -> Result<TomlTable>
where
    I: IntoIterator<Item = Event>,
{
    TreeBuilder::build(events)
}

/// Parses TOML text and decodes the root table into `T` with a plain [`Decoder`].
///
/// # Examples
///
/// ```rust
/// use toml_codec::decode_str;
/// use std::collections::BTreeMap;
///
/// let ports: BTreeMap<String, u16> = decode_str("http = 80\nhttps = 443").unwrap();
/// assert_eq!(ports["https"], 443);
/// ```
///
/// # Errors
///
/// Returns parse errors as [`from_str`] does, then decoding errors.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_str<T: Decode>(s: &str) -> Result<T> {
    let root = from_str(s)?;
    decode(&TomlValue::Table(root))
}

/// Decodes `value` into `T` with a plain [`Decoder`].
///
/// # Errors
///
/// Returns [`Error::Decoding`] or [`Error::MissingField`] when `value` does
/// not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode<T: Decode>(value: &TomlValue) -> Result<T> {
    Decoder::default().decode(value)
}

/// Encodes `value` with a plain [`Encoder`].
///
/// # Examples
///
/// ```rust
/// use toml_codec::{encode, toml};
///
/// assert_eq!(encode(&vec![Some(1), None]).unwrap(), toml!([1]));
/// ```
///
/// # Errors
///
/// Returns [`Error::Encoding`] when nothing can encode `value`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode<T: Encode>(value: &T) -> Result<TomlValue> {
    Encoder::default().encode(value)
}

/// Decodes the value at `path` with a plain [`Decoder`], flattening fan-outs.
///
/// # Examples
///
/// ```rust
/// use toml_codec::{from_str, get};
///
/// let root = from_str("[a]\nb = 1").unwrap();
/// assert_eq!(get::<i64>(&root, &["a", "b"]).unwrap(), Some(1));
/// assert_eq!(get::<i64>(&root, &["a", "missing"]).unwrap(), None);
/// ```
///
/// # Errors
///
/// Returns a decoding error when the addressed value does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn get<T: Decode>(root: &TomlTable, path: &[&str]) -> Result<Option<T>> {
    Decoder::default().get(root, path)
}

/// Decodes the value at `path` with a plain [`Decoder`], grouping fan-outs.
///
/// # Errors
///
/// Returns a decoding error when the addressed value does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn get_grouped<T: Decode>(root: &TomlTable, path: &[&str]) -> Result<Option<T>> {
    Decoder::default().get_grouped(root, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{toml, toml_record};

    toml_record! {
        #[derive(Debug, Clone, PartialEq)]
        struct Point {
            x: i64,
            y: i64,
        }
    }

    #[test]
    fn test_from_str_builds_nested_tables() {
        let root = from_str("[a.b]\nc = 1\n[a]\nd = 2").unwrap();
        assert_eq!(
            TomlValue::Table(root),
            toml!({"a": {"b": {"c": 1}, "d": 2}})
        );
    }

    #[test]
    fn test_decode_str_record() {
        let point: Point = decode_str("x = 1\ny = 2").unwrap();
        assert_eq!(point, Point { x: 1, y: 2 });
    }

    #[test]
    fn test_round_trip() {
        let point = Point { x: -3, y: 4 };
        let encoded = encode(&point).unwrap();
        assert_eq!(decode::<Point>(&encoded).unwrap(), point);
    }

    #[test]
    fn test_get_type_mismatch_is_an_error() {
        let root = from_str("[a]\nb = 1").unwrap();
        assert!(get::<String>(&root, &["a"]).is_err());
        assert!(get::<TomlTable>(&root, &["a"]).unwrap().is_some());
    }

    #[test]
    fn test_get_grouped_keeps_nesting() {
        let root = from_str("[[g]]\n[[g.m]]\nn = 1\n[[g.m]]\nn = 2\n[[g]]\n[[g.m]]\nn = 3").unwrap();
        assert_eq!(
            get::<Vec<i64>>(&root, &["g", "m", "n"]).unwrap(),
            Some(vec![1, 2, 3])
        );
        assert_eq!(
            get_grouped::<Vec<Vec<i64>>>(&root, &["g", "m", "n"]).unwrap(),
            Some(vec![vec![1, 2], vec![3]])
        );
    }

    #[test]
    fn test_from_slice_rejects_invalid_utf8() {
        assert!(matches!(from_slice(&[0xff, 0xfe]), Err(Error::Io(_))));
    }

    #[test]
    fn test_syntax_error_position() {
        let err = from_str("a = 1\nb = \"open").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 2, .. }));
    }
}

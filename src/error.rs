//! Error types for parsing, building, decoding and encoding TOML.
//!
//! Every failure is reported immediately to the caller as exactly one
//! [`Error`] describing the deepest point of failure. A converter's decline
//! signal ([`Conversion::Declined`](crate::Conversion::Declined)) is *not* an
//! error and never shows up here.
//!
//! ## Error Categories
//!
//! - **Syntax errors**: malformed text, with line/column information
//! - **Build errors**: well-formed text describing an impossible tree (key
//!   redefinitions, table-array reuse), with the offending key path
//! - **Decoding errors**: no applicable conversion, structural mismatch,
//!   unknown enumerated constant, missing required field
//! - **Encoding errors**: a native value with no conversion and no structural rule
//! - **Configuration errors**: invalid registrations, raised at registration time
//!
//! ## Examples
//!
//! ```rust
//! use toml_codec::{from_str, Error};
//!
//! let err = from_str("a = 1\na.b = 2").unwrap_err();
//! assert!(matches!(err, Error::Build { .. }));
//! assert!(err.to_string().contains("`a`"));
//! ```

use crate::{Shape, TomlValue};
use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by this crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error while reading a document
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed document text
    #[error("Syntax error at line {line}, column {col}: {msg}")]
    Syntax { line: usize, col: usize, msg: String },

    /// Document structure that cannot be assembled into a tree
    #[error("Invalid document at line {line}, column {col}: {msg} (key `{path}`)")]
    Build {
        path: String,
        line: usize,
        col: usize,
        msg: String,
    },

    /// A value could not be turned into the requested shape
    #[error("Cannot decode {} `{}` into {target}: {reason}", .value.type_name(), .value.summary())]
    Decoding {
        value: Box<TomlValue>,
        target: Shape,
        reason: String,
    },

    /// A record field is absent, has no default and is not nullable
    #[error("Missing field `{field}` for record {record}")]
    MissingField { record: String, field: String },

    /// A native value could not be turned into a TOML value
    #[error("Cannot encode {value}{}: {reason}", .target.as_ref().map(|t| format!(" as {}", t)).unwrap_or_default())]
    Encoding {
        value: String,
        target: Option<String>,
        reason: String,
    },

    /// Invalid codec registration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Custom error raised by a user conversion function
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error with line and column information.
    ///
    /// ```rust
    /// use toml_codec::Error;
    ///
    /// let err = Error::syntax(10, 5, "unexpected token");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates a build error for the key path `path`.
    pub fn build(path: impl fmt::Display, line: usize, col: usize, msg: &str) -> Self {
        Error::Build {
            path: path.to_string(),
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates a decoding error carrying the source value and the requested shape.
    ///
    /// ```rust
    /// use toml_codec::{Error, Shape, TomlValue};
    ///
    /// let err = Error::decoding(&TomlValue::from("x"), &Shape::Integer, "not a number");
    /// assert_eq!(err.to_string(), "Cannot decode string `\"x\"` into integer: not a number");
    /// ```
    pub fn decoding(value: &TomlValue, target: &Shape, reason: impl fmt::Display) -> Self {
        Error::Decoding {
            value: Box::new(value.clone()),
            target: target.clone(),
            reason: reason.to_string(),
        }
    }

    /// Creates the error returned when neither a converter nor a structural
    /// rule applies to `value` and `target`.
    pub fn no_conversion(value: &TomlValue, target: &Shape) -> Self {
        Self::decoding(value, target, "no applicable conversion")
    }

    pub fn missing_field(record: &str, field: &str) -> Self {
        Error::MissingField {
            record: record.to_string(),
            field: field.to_string(),
        }
    }

    /// Creates an encoding error for a value described by `value`.
    pub fn encoding(value: impl fmt::Display, target: Option<&str>, reason: &str) -> Self {
        Error::Encoding {
            value: value.to_string(),
            target: target.map(str::to_string),
            reason: reason.to_string(),
        }
    }

    pub fn config(msg: impl fmt::Display) -> Self {
        Error::Config(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// ```rust
    /// use toml_codec::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for the decoding family (`Decoding` and `MissingField`).
    #[must_use]
    pub const fn is_decoding(&self) -> bool {
        matches!(self, Error::Decoding { .. } | Error::MissingField { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Builds a [`TomlValue`](crate::TomlValue) from a JSON-like literal.
///
/// Keys must be string literals. Anything that is not an array or table
/// literal goes through `TomlValue::from`. Inside arrays and tables each
/// element is a single token tree, so negative numbers and other
/// multi-token expressions need parentheses there.
///
/// ```rust
/// use toml_codec::{toml, TomlValue};
///
/// let value = toml!({"name": "demo", "ports": [80, 443], "offset": (-1)});
/// assert_eq!(value.as_table().unwrap().len(), 3);
/// assert_eq!(toml!([]), TomlValue::Array(vec![]));
/// ```
#[macro_export]
macro_rules! toml {
    (true) => {
        $crate::TomlValue::Bool(true)
    };

    (false) => {
        $crate::TomlValue::Bool(false)
    };

    ([]) => {
        $crate::TomlValue::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::TomlValue::Array(vec![$($crate::toml!($elem)),*])
    };

    ({}) => {
        $crate::TomlValue::Table($crate::TomlTable::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut table = $crate::TomlTable::new();
        $(
            table.insert($key.to_string(), $crate::toml!($value));
        )*
        $crate::TomlValue::Table(table)
    }};

    ($other:expr) => {
        $crate::TomlValue::from($other)
    };
}

/// Defines a struct and implements [`Record`](crate::Record),
/// [`Decode`](crate::Decode) and [`Encode`](crate::Encode) for it.
///
/// A field may carry a language-level default with `= expr`; such fields
/// fall back to it when the document lacks them, without consulting a
/// registered default instance. `Option` fields are nullable. Every field
/// type must implement `Clone`.
///
/// ```rust
/// use toml_codec::{decode_str, toml_record};
///
/// toml_record! {
///     #[derive(Debug)]
///     pub struct Retry {
///         pub attempts: u32 = 3,
///         pub backoff_ms: Option<u64>,
///     }
/// }
///
/// let retry: Retry = decode_str("backoff_ms = 250").unwrap();
/// assert_eq!(retry.attempts, 3);
/// assert_eq!(retry.backoff_ms, Some(250));
/// ```
#[macro_export]
macro_rules! toml_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty $(= $default:expr)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            const NAME: &'static str = stringify!($name);
            const FIELDS: &'static [&'static str] = &[$(stringify!($field)),*];

            #[allow(unused_variables)]
            fn read(reader: &$crate::FieldReader<'_>) -> $crate::Result<Self> {
                Ok($name {
                    $(
                        $field: $crate::__toml_read_field!(reader, $field $(, $default)?),
                    )*
                })
            }

            #[allow(unused_variables)]
            fn write(&self, writer: &mut $crate::FieldWriter<'_>) -> $crate::Result<()> {
                $(
                    writer.field(stringify!($field), &self.$field)?;
                )*
                Ok(())
            }

            fn clone_field(&self, native: &str) -> Option<Box<dyn ::std::any::Any>> {
                match native {
                    $(
                        stringify!($field) => {
                            Some(Box::new(::std::clone::Clone::clone(&self.$field)))
                        }
                    )*
                    _ => None,
                }
            }
        }

        impl $crate::Decode for $name {
            fn shape() -> $crate::Shape {
                $crate::Shape::record::<Self>()
            }

            fn decode(
                value: &$crate::TomlValue,
                decoder: &$crate::Decoder,
            ) -> $crate::Result<Self> {
                match value.as_table() {
                    Some(table) => decoder.decode_record(table),
                    None => Err($crate::Error::no_conversion(value, &Self::shape())),
                }
            }
        }

        impl $crate::Encode for $name {
            fn encode(
                &self,
                encoder: &$crate::Encoder,
            ) -> $crate::Result<Option<$crate::TomlValue>> {
                encoder
                    .encode_record(self)
                    .map(|table| Some($crate::TomlValue::Table(table)))
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __toml_read_field {
    ($reader:ident, $field:ident) => {
        $reader.field(stringify!($field))?
    };
    ($reader:ident, $field:ident, $default:expr) => {
        $reader.field_or_else(stringify!($field), || $default)?
    };
}

/// Defines a fieldless enum and implements [`Constants`](crate::Constants),
/// [`Decode`](crate::Decode) and [`Encode`](crate::Encode) for it. Variants
/// are matched by their exact name.
///
/// ```rust
/// use toml_codec::{decode_str, toml_enum, toml_record};
///
/// toml_enum! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub enum Level { Debug, Info, Warn }
/// }
///
/// toml_record! {
///     pub struct Logging { pub level: Level }
/// }
///
/// let logging: Logging = decode_str("level = \"Warn\"").unwrap();
/// assert_eq!(logging.level, Level::Warn);
/// assert!(decode_str::<Logging>("level = \"warn\"").is_err());
/// ```
#[macro_export]
macro_rules! toml_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl $crate::Constants for $name {
            const NAME: &'static str = stringify!($name);
            const NAMES: &'static [&'static str] = &[$(stringify!($variant)),*];

            fn from_name(name: &str) -> Option<Self> {
                $(
                    if name == stringify!($variant) {
                        return Some($name::$variant);
                    }
                )*
                None
            }

            fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant),)*
                }
            }
        }

        impl $crate::Decode for $name {
            fn shape() -> $crate::Shape {
                $crate::Shape::constants::<Self>()
            }

            fn decode(value: &$crate::TomlValue, _: &$crate::Decoder) -> $crate::Result<Self> {
                $crate::decode_constant(value)
            }
        }

        impl $crate::Encode for $name {
            fn encode(
                &self,
                _: &$crate::Encoder,
            ) -> $crate::Result<Option<$crate::TomlValue>> {
                Ok(Some($crate::encode_constant(self)))
            }
        }
    };
}

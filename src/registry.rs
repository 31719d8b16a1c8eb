//! Ordered converter lists, name mappings and default instances.
//!
//! A [`Registry`] is an immutable snapshot. Extending one clones the outer
//! `Arc`s and copies a map only when it is shared (`Arc::make_mut`), so every
//! engine built from a registry keeps seeing exactly the registrations it was
//! built with.

use crate::{Error, Record, Result};
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Outcome of a conversion function.
///
/// `Declined` is not an error: it asks the engine to try the next registered
/// function, then the structural rules.
///
/// ```rust
/// use toml_codec::Conversion;
///
/// let declined: Conversion<i64> = None.into();
/// assert!(declined.is_declined());
/// assert_eq!(Conversion::Converted(2).map(|n| n * 2).into_option(), Some(4));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conversion<T> {
    Converted(T),
    Declined,
}

impl<T> Conversion<T> {
    #[must_use]
    pub const fn is_declined(&self) -> bool {
        matches!(self, Conversion::Declined)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Conversion<U> {
        match self {
            Conversion::Converted(value) => Conversion::Converted(f(value)),
            Conversion::Declined => Conversion::Declined,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Conversion::Converted(value) => Some(value),
            Conversion::Declined => None,
        }
    }
}

impl<T> From<Option<T>> for Conversion<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Conversion::Converted(value),
            None => Conversion::Declined,
        }
    }
}

/// Native field name to document key, for one record type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameMapping {
    to_document: HashMap<String, String>,
}

impl NameMapping {
    /// Validates `pairs` of `(document name, native name)` against `R::FIELDS`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a native name is not a field of `R`, is
    /// mapped twice, or when two fields would share one document key.
    pub fn new<R: Record>(pairs: &[(&str, &str)]) -> Result<Self> {
        let mut to_document = HashMap::with_capacity(pairs.len());
        for &(document, native) in pairs {
            if !R::FIELDS.contains(&native) {
                return Err(Error::config(format!(
                    "record {} has no field `{}` (fields: {})",
                    R::NAME,
                    native,
                    R::FIELDS.join(", ")
                )));
            }
            if to_document
                .insert(native.to_string(), document.to_string())
                .is_some()
            {
                return Err(Error::config(format!(
                    "field `{}` of record {} is mapped twice",
                    native,
                    R::NAME
                )));
            }
        }

        let mapping = NameMapping { to_document };
        let mut seen = HashSet::with_capacity(R::FIELDS.len());
        for field in R::FIELDS {
            let document = mapping.document_name(field);
            if !seen.insert(document) {
                return Err(Error::config(format!(
                    "document key `{}` is used by more than one field of record {}",
                    document,
                    R::NAME
                )));
            }
        }
        Ok(mapping)
    }

    /// The document key for `native`; unmapped fields keep their name.
    #[must_use]
    pub fn document_name<'a>(&'a self, native: &'a str) -> &'a str {
        self.to_document.get(native).map_or(native, String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_document.is_empty()
    }
}

/// Field copies of a registered default instance, keyed by native field name.
pub(crate) type DefaultFields = Arc<dyn Fn(&str) -> Option<Box<dyn Any>> + Send + Sync>;

/// Per-type registrations shared by the decode and encode engines.
pub(crate) struct Registry<F> {
    converters: Arc<HashMap<TypeId, Vec<F>>>,
    mappings: Arc<HashMap<TypeId, Arc<NameMapping>>>,
    defaults: Arc<HashMap<TypeId, DefaultFields>>,
}

impl<F> Default for Registry<F> {
    fn default() -> Self {
        Registry {
            converters: Arc::default(),
            mappings: Arc::default(),
            defaults: Arc::default(),
        }
    }
}

impl<F> Clone for Registry<F> {
    fn clone(&self) -> Self {
        Registry {
            converters: Arc::clone(&self.converters),
            mappings: Arc::clone(&self.mappings),
            defaults: Arc::clone(&self.defaults),
        }
    }
}

impl<F: Clone> Registry<F> {
    /// Appends `converter` after the ones already registered for `type_id`.
    pub(crate) fn push(&mut self, type_id: TypeId, converter: F) {
        Arc::make_mut(&mut self.converters)
            .entry(type_id)
            .or_default()
            .push(converter);
    }
}

impl<F> Registry<F> {
    pub(crate) fn converters(&self, type_id: TypeId) -> &[F] {
        self.converters
            .get(&type_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Replaces the mapping for `type_id`.
    pub(crate) fn set_mapping(&mut self, type_id: TypeId, mapping: Arc<NameMapping>) {
        Arc::make_mut(&mut self.mappings).insert(type_id, mapping);
    }

    pub(crate) fn mapping(&self, type_id: TypeId) -> Option<&NameMapping> {
        self.mappings.get(&type_id).map(Arc::as_ref)
    }

    /// Replaces the default instance of the record `R`.
    pub(crate) fn set_default<R>(&mut self, prototype: R)
    where
        R: Record + Send + Sync,
    {
        let fields: DefaultFields = Arc::new(move |native: &str| prototype.clone_field(native));
        Arc::make_mut(&mut self.defaults).insert(TypeId::of::<R>(), fields);
    }

    pub(crate) fn default_fields(&self, type_id: TypeId) -> Option<&DefaultFields> {
        self.defaults.get(&type_id)
    }

    pub(crate) fn converter_count(&self) -> usize {
        self.converters.values().map(Vec::len).sum()
    }

    pub(crate) fn mapping_count(&self) -> usize {
        self.mappings.len()
    }

    pub(crate) fn default_count(&self) -> usize {
        self.defaults.len()
    }
}

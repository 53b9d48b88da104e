//! Selectors and queries against an index.

use crate::FieldValue;
use serde::{Deserialize, Serialize};

/// An ordered set of `field == value` conditions.
///
/// A selector matches every entity indexed under *any* of its pairs (the
/// match sets are unioned, not intersected). Field order is kept so results
/// come back grouped by the order the fields were given in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    fields: Vec<(String, FieldValue)>,
}

impl Selector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single-field selector.
    #[must_use]
    pub fn by(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new().field(field, value)
    }

    /// Adds a condition. A repeated field replaces the earlier value.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(existing) => existing.1 = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    /// Returns the value selected for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// What a caller passes to a lookup: a bare key or a full selector.
///
/// A bare key is shorthand for `{primary_key: key}`; which field that is
/// depends on the mapper, so normalization happens in [`Query::into_selector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Key(FieldValue),
    Fields(Selector),
}

impl Query {
    /// Normalizes into a selector, expanding a bare key against `primary_key`.
    #[must_use]
    pub fn into_selector(self, primary_key: &str) -> Selector {
        match self {
            Query::Key(value) => Selector::by(primary_key, value),
            Query::Fields(selector) => selector,
        }
    }
}

impl From<Selector> for Query {
    fn from(selector: Selector) -> Self {
        Query::Fields(selector)
    }
}

impl From<FieldValue> for Query {
    fn from(value: FieldValue) -> Self {
        Query::Key(value)
    }
}

macro_rules! key_query_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Query {
                fn from(value: $ty) -> Self {
                    Query::Key(FieldValue::from(value))
                }
            }
        )*
    };
}

key_query_from!(&str, String, &String, bool, i64, i32, u32, usize, f64);

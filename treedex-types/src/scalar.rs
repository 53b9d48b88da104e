//! Leaf values and the index key type derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest integer an `f64` represents exactly.
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

/// A leaf value stored in a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    /// Converts a JSON leaf into a scalar. Arrays and objects return `None`.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Scalar::Null),
            serde_json::Value::Bool(b) => Some(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Scalar::Int)
                .or_else(|| n.as_f64().map(Scalar::Float)),
            serde_json::Value::String(s) => Some(Scalar::String(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Converts back into JSON. Non-finite floats become `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Null => serde_json::Value::Null,
            Scalar::Bool(b) => serde_json::Value::Bool(*b),
            Scalar::Int(i) => serde_json::Value::from(*i),
            Scalar::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Scalar::String(s) => serde_json::Value::String(s.clone()),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The index key for this scalar, or `None` for `Null`.
    #[must_use]
    pub fn field_value(&self) -> Option<FieldValue> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(b) => Some(FieldValue::from(*b)),
            Scalar::Int(i) => Some(FieldValue::from(*i)),
            Scalar::Float(f) => Some(FieldValue::from(*f)),
            Scalar::String(s) => Some(FieldValue::from(s.as_str())),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{}", canonical_float(*x)),
            Scalar::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Int(i64::from(i))
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

/// The key an entity is filed under in an index.
///
/// Field values compare by canonical string form, so `1`, `1.0` and `"1"`
/// all address the same bucket. This mirrors how keyed object stores treat
/// their keys and lets callers look up numeric ids with string input (and
/// the other way round).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValue(String);

impl FieldValue {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty string, which is never a valid primary key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self(b.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        Self(i.to_string())
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        Self(i.to_string())
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        Self(i.to_string())
    }
}

impl From<usize> for FieldValue {
    fn from(i: usize) -> Self {
        Self(i.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        Self(canonical_float(f))
    }
}

/// Integral floats print without a fractional part so they share a key
/// with the equivalent integer.
fn canonical_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT_INT {
        format!("{}", f as i64)
    } else {
        format!("{f}")
    }
}

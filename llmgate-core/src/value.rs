//! Typed tool-argument values.
//!
//! A tool argument may hold any JSON type. [`TypedValue`] keeps the
//! wire-observed type instead of collapsing everything to text, with one
//! deliberate canonicalization: a JSON number without a fractional part is
//! an [`TypedValue::Integer`], so `4` and `4.0` both come back as `4`.
//! Tool backends dispatch on these types (a page index must read `"4"`,
//! never `"4.0"`).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

/// A single argument value, classified by its JSON type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// JSON string.
    String(String),
    /// JSON number with no fractional part that fits in `i64`.
    ///
    /// Integer literals above `i64::MAX` are not coerced; they decode as
    /// [`TypedValue::Structured`] and still print their exact digits.
    Integer(i64),
    /// JSON number with a fractional part, or a whole number outside `i64`.
    Float(f64),
    /// JSON boolean.
    Bool(bool),
    /// JSON `null`.
    Null,
    /// JSON object or array, kept in parsed form for re-serialization.
    ///
    /// Unsigned integers above `i64::MAX` also land here so their digits are
    /// not rounded through `f64`.
    Structured(serde_json::Value),
}

impl TypedValue {
    /// Classify a parsed JSON value.
    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Number(n) => Self::from_number(n),
            other @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                Self::Structured(other)
            }
        }
    }

    fn from_number(n: Number) -> Self {
        if let Some(i) = n.as_i64() {
            return Self::Integer(i);
        }
        if n.is_u64() {
            return Self::Structured(serde_json::Value::Number(n));
        }
        match n.as_f64() {
            Some(f) if is_whole_i64(f) => {
                #[allow(clippy::cast_possible_truncation)]
                let i = f as i64;
                Self::Integer(i)
            }
            Some(f) => Self::Float(f),
            None => Self::Structured(serde_json::Value::Number(n)),
        }
    }

    /// Convert back to a generic JSON value.
    ///
    /// Non-finite floats have no JSON form and become `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Float(f) => Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Null => serde_json::Value::Null,
            Self::Structured(v) => v.clone(),
        }
    }

    /// Borrow the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integer payload, if this is an integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric payload widened to `f64` (integers included).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The boolean payload, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this is JSON `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, for logs and error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
            Self::Null => "null",
            Self::Structured(_) => "structured",
        }
    }
}

/// `f` has no fractional part and survives a round trip through `i64`.
fn is_whole_i64(f: f64) -> bool {
    #[allow(clippy::cast_precision_loss)]
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    f.is_finite() && f.trunc() == f && in_range
}

/// String coercion used by the string accessor on argument maps.
///
/// Integers print without a decimal point, floats in plain positional
/// notation (never exponent form), booleans as `true`/`false`, `null` as the
/// empty string, and structured values as compact JSON.
impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => Ok(()),
            Self::Structured(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for TypedValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::String(s) => serializer.serialize_str(s),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Null => serializer.serialize_unit(),
            Self::Structured(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TypedValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Self::from_json)
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for TypedValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for TypedValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for TypedValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<serde_json::Value> for TypedValue {
    fn from(value: serde_json::Value) -> Self {
        Self::from_json(value)
    }
}

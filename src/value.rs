//! Values a record field can hold.
//!
//! A field is a primitive, a nested [`ImmutableRecord`], an opaque JSON
//! value, or a specialized container implementing [`Settable`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::record::ImmutableRecord;
use crate::settable::Settable;

/// Possible values of a record field.
///
/// # Examples
///
/// ```
/// use irecord::Value;
///
/// let int_val = Value::from(42);
/// let string_val = Value::from("hello");
///
/// assert!(int_val.is_int());
/// assert!(string_val.is_string());
/// assert_eq!(int_val.type_name(), "int");
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Nested record, shared by reference.
    Record(ImmutableRecord),
    /// Opaque JSON (arrays from JSON input land here). Never traversed by `set`.
    Structured(serde_json::Value),
    /// Specialized container with its own update semantics.
    Container(Arc<dyn Settable>),
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    pub const fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float(_))
    }

    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    pub const fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }

    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Container(_))
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub const fn as_record(&self) -> Option<&ImmutableRecord> {
        match self {
            Self::Record(v) => Some(v),
            _ => None,
        }
    }

    pub const fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Structured(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Arc<dyn Settable>> {
        match self {
            Self::Container(v) => Some(v),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Record(_) => "record",
            Self::Structured(_) => "structured",
            Self::Container(c) => c.type_name(),
        }
    }

    /// Reads a direct child of a record or container.
    #[must_use]
    pub fn child(&self, key: &str) -> Option<Value> {
        match self {
            Self::Record(r) => r.get(key),
            Self::Container(c) => c.get(key),
            _ => None,
        }
    }

    /// Records directly reachable from this value, looking through
    /// containers.
    #[must_use]
    pub fn held_records(&self) -> Vec<ImmutableRecord> {
        match self {
            Self::Record(r) => vec![r.clone()],
            Self::Container(c) => c.nested_records(),
            _ => Vec::new(),
        }
    }

    /// JSON-shaped snapshot of this value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(v) => serde_json::Value::Bool(*v),
            Self::Int(v) => serde_json::Value::from(*v),
            Self::Float(v) => serde_json::Value::from(*v),
            Self::String(v) => serde_json::Value::String(v.clone()),
            Self::Record(r) => r.to_json(),
            Self::Structured(v) => v.clone(),
            Self::Container(c) => c.to_json(),
        }
    }

    /// Converts JSON into a value. Objects become records (recursively),
    /// arrays stay opaque.
    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(v) => Self::Bool(v),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if n.is_u64() {
                    // Past i64::MAX: kept exact rather than rounded to f64.
                    Self::Structured(serde_json::Value::Number(n))
                } else {
                    n.as_f64()
                        .map_or_else(|| Self::Structured(serde_json::Value::Number(n)), Self::Float)
                }
            }
            serde_json::Value::String(v) => Self::String(v),
            array @ serde_json::Value::Array(_) => Self::Structured(array),
            serde_json::Value::Object(map) => Self::Record(ImmutableRecord::from_json_map(map)),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::Structured(a), Self::Structured(b)) => a == b,
            (Self::Container(a), Self::Container(b)) => {
                Arc::ptr_eq(a, b) || (a.type_name() == b.type_name() && a.to_json() == b.to_json())
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Record(r) => write!(f, "{r}"),
            Self::Structured(v) => write!(f, "{v}"),
            Self::Container(c) => write!(f, "{}", c.to_json()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::String(v) => serializer.serialize_str(v),
            Self::Record(r) => r.serialize(serializer),
            Self::Structured(v) => v.serialize(serializer),
            Self::Container(c) => c.to_json().serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from_json)
    }
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<ImmutableRecord> for Value {
    fn from(v: ImmutableRecord) -> Self {
        Self::Record(v)
    }
}

impl From<Arc<dyn Settable>> for Value {
    fn from(v: Arc<dyn Settable>) -> Self {
        Self::Container(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::from_json(v)
    }
}

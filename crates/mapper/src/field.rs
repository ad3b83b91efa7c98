//! Conversions between native field types and [`Value`]
//!
//! [`FieldValue`] is the per-type half of the mapping: it declares which
//! value variant a native type maps to ([`FieldKind`]) and converts in both
//! directions. The shape half (which fields a struct has) lives in
//! [`crate::shape`].
//!
//! ## Coercion rules on decode
//!
//! | Stored | Field type | Result |
//! |--------|------------|--------|
//! | `Int` | `f64`, `f32` | widened |
//! | `Double` | `i64`, `i32` | accepted only when integral and in range |
//! | `Null` | `Option<T>` | `None` |
//! | `Null` | anything else | `TypeMismatch` |
//!
//! Every other combination of mismatched variants is a `TypeMismatch`.

use chrono::{DateTime, Utc};
use docmap_core::{Blob, DocumentRef, Error, GeoPoint, MapValue, Result, Timestamp, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Declared semantic type of a mapped field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// `Value::Bool`
    Bool,
    /// `Value::Int`
    Int,
    /// `Value::Double`
    Double,
    /// `Value::String`
    String,
    /// `Value::Timestamp`
    Timestamp,
    /// `Value::Blob`
    Blob,
    /// `Value::GeoPoint`
    GeoPoint,
    /// `Value::Reference`
    Reference,
    /// Any value, stored as-is
    Any,
    /// Untyped nested map
    Map,
    /// `Value::Array` with elements of the inner kind
    Array(Box<FieldKind>),
    /// `Value::Map` with values of the inner kind
    MapOf(Box<FieldKind>),
    /// The inner kind, or `Value::Null`
    Optional(Box<FieldKind>),
    /// A nested structured value with its own plan
    Nested(&'static str),
    /// A native type with no value mapping
    Unsupported(&'static str),
}

impl FieldKind {
    /// Reason this kind cannot be mapped, searching nested kinds
    pub fn unsupported_reason(&self) -> Option<&'static str> {
        match self {
            FieldKind::Unsupported(reason) => Some(reason),
            FieldKind::Array(inner) | FieldKind::MapOf(inner) | FieldKind::Optional(inner) => {
                inner.unsupported_reason()
            }
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Bool => write!(f, "Bool"),
            FieldKind::Int => write!(f, "Int"),
            FieldKind::Double => write!(f, "Double"),
            FieldKind::String => write!(f, "String"),
            FieldKind::Timestamp => write!(f, "Timestamp"),
            FieldKind::Blob => write!(f, "Blob"),
            FieldKind::GeoPoint => write!(f, "GeoPoint"),
            FieldKind::Reference => write!(f, "Reference"),
            FieldKind::Any => write!(f, "Any"),
            FieldKind::Map => write!(f, "Map"),
            FieldKind::Array(inner) => write!(f, "Array<{}>", inner),
            FieldKind::MapOf(inner) => write!(f, "Map<{}>", inner),
            FieldKind::Optional(inner) => write!(f, "Optional<{}>", inner),
            FieldKind::Nested(shape) => write!(f, "Map ({})", shape),
            FieldKind::Unsupported(reason) => write!(f, "Unsupported ({})", reason),
        }
    }
}

/// A native type that converts to and from a single [`Value`]
///
/// Errors from `from_value` carry an empty path; callers prefix the field
/// name with [`Error::within`] as they unwind.
pub trait FieldValue: Sized {
    /// Declared kind, checked once when a plan is built
    fn kind() -> FieldKind;

    /// Convert the native value to its value variant
    fn to_value(&self) -> Result<Value>;

    /// Convert a stored value back to the native type
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch(expected: impl fmt::Display, found: &Value) -> Error {
    Error::type_mismatch("", expected.to_string(), found.type_name())
}

fn unsupported(reason: &'static str) -> Error {
    Error::unsupported_shape("<field>", reason)
}

// ============================================================================
// Scalars
// ============================================================================

impl FieldValue for bool {
    fn kind() -> FieldKind {
        FieldKind::Bool
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch(Self::kind(), &other)),
        }
    }
}

// i64 range as f64: [-2^63, 2^63)
const I64_MIN_F: f64 = -9_223_372_036_854_775_808.0;
const I64_END_F: f64 = 9_223_372_036_854_775_808.0;

impl FieldValue for i64 {
    fn kind() -> FieldKind {
        FieldKind::Int
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::Int(*self))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            Value::Double(d) if d.fract() == 0.0 && (I64_MIN_F..I64_END_F).contains(&d) => {
                Ok(d as i64)
            }
            other => Err(mismatch(Self::kind(), &other)),
        }
    }
}

impl FieldValue for i32 {
    fn kind() -> FieldKind {
        FieldKind::Int
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::Int(*self as i64))
    }

    fn from_value(value: Value) -> Result<Self> {
        let found = value.clone();
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| mismatch("Int (32-bit)", &found))
    }
}

impl FieldValue for f64 {
    fn kind() -> FieldKind {
        FieldKind::Double
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::Double(*self))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Double(d) => Ok(d),
            Value::Int(i) => Ok(i as f64),
            other => Err(mismatch(Self::kind(), &other)),
        }
    }
}

impl FieldValue for f32 {
    fn kind() -> FieldKind {
        FieldKind::Double
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::Double(*self as f64))
    }

    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value).map(|d| d as f32)
    }
}

impl FieldValue for String {
    fn kind() -> FieldKind {
        FieldKind::String
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch(Self::kind(), &other)),
        }
    }
}

// Unsigned 64-bit integers do not fit the signed Int variant.
impl FieldValue for u64 {
    fn kind() -> FieldKind {
        FieldKind::Unsupported("unsigned 64-bit integers are not supported, use i64")
    }

    fn to_value(&self) -> Result<Value> {
        Err(unsupported("unsigned 64-bit integers are not supported, use i64"))
    }

    fn from_value(_value: Value) -> Result<Self> {
        Err(unsupported("unsigned 64-bit integers are not supported, use i64"))
    }
}

impl FieldValue for char {
    fn kind() -> FieldKind {
        FieldKind::Unsupported("characters are not supported, use String")
    }

    fn to_value(&self) -> Result<Value> {
        Err(unsupported("characters are not supported, use String"))
    }

    fn from_value(_value: Value) -> Result<Self> {
        Err(unsupported("characters are not supported, use String"))
    }
}

// ============================================================================
// Domain types
// ============================================================================

impl FieldValue for Timestamp {
    fn kind() -> FieldKind {
        FieldKind::Timestamp
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::Timestamp(*self))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(t) => Ok(t),
            other => Err(mismatch(Self::kind(), &other)),
        }
    }
}

impl FieldValue for DateTime<Utc> {
    fn kind() -> FieldKind {
        FieldKind::Timestamp
    }

    fn to_value(&self) -> Result<Value> {
        Timestamp::from_datetime(self).map(Value::Timestamp)
    }

    fn from_value(value: Value) -> Result<Self> {
        Timestamp::from_value(value).map(|t| t.to_datetime())
    }
}

impl FieldValue for Blob {
    fn kind() -> FieldKind {
        FieldKind::Blob
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::Blob(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(b) => Ok(b),
            other => Err(mismatch(Self::kind(), &other)),
        }
    }
}

impl FieldValue for GeoPoint {
    fn kind() -> FieldKind {
        FieldKind::GeoPoint
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::GeoPoint(*self))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::GeoPoint(p) => Ok(p),
            other => Err(mismatch(Self::kind(), &other)),
        }
    }
}

impl FieldValue for DocumentRef {
    fn kind() -> FieldKind {
        FieldKind::Reference
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::Reference(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Reference(r) => Ok(r),
            other => Err(mismatch(Self::kind(), &other)),
        }
    }
}

impl FieldValue for Value {
    fn kind() -> FieldKind {
        FieldKind::Any
    }

    fn to_value(&self) -> Result<Value> {
        Ok(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FieldValue for MapValue {
    fn kind() -> FieldKind {
        FieldKind::Map
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::Map(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(m) => Ok(m),
            other => Err(mismatch(Self::kind(), &other)),
        }
    }
}

// ============================================================================
// Containers
// ============================================================================

impl<T: FieldValue> FieldValue for Option<T> {
    fn kind() -> FieldKind {
        FieldKind::Optional(Box::new(T::kind()))
    }

    fn to_value(&self) -> Result<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn kind() -> FieldKind {
        FieldKind::Array(Box::new(T::kind()))
    }

    fn to_value(&self) -> Result<Value> {
        self.iter()
            .map(FieldValue::to_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| T::from_value(item).map_err(|e| e.within(&format!("[{}]", i))))
                .collect(),
            other => Err(mismatch(Self::kind(), &other)),
        }
    }
}

fn map_entries_from_value<T: FieldValue>(value: Value) -> Result<Vec<(String, T)>> {
    match value {
        Value::Map(entries) => entries
            .into_iter()
            .map(|(k, v)| match T::from_value(v) {
                Ok(native) => Ok((k, native)),
                Err(e) => Err(e.within(&k)),
            })
            .collect(),
        other => Err(mismatch(FieldKind::MapOf(Box::new(T::kind())), &other)),
    }
}

impl<T: FieldValue> FieldValue for BTreeMap<String, T> {
    fn kind() -> FieldKind {
        FieldKind::MapOf(Box::new(T::kind()))
    }

    fn to_value(&self) -> Result<Value> {
        let mut out = MapValue::new();
        for (k, v) in self {
            out.insert(k.clone(), v.to_value()?);
        }
        Ok(Value::Map(out))
    }

    fn from_value(value: Value) -> Result<Self> {
        map_entries_from_value(value).map(|entries| entries.into_iter().collect())
    }
}

impl<T: FieldValue> FieldValue for HashMap<String, T> {
    fn kind() -> FieldKind {
        FieldKind::MapOf(Box::new(T::kind()))
    }

    fn to_value(&self) -> Result<Value> {
        // Sorted so that encoding the same map twice yields the same order.
        let mut keys: Vec<&String> = self.keys().collect();
        keys.sort();
        let mut out = MapValue::new();
        for k in keys {
            out.insert(k.clone(), self[k].to_value()?);
        }
        Ok(Value::Map(out))
    }

    fn from_value(value: Value) -> Result<Self> {
        map_entries_from_value(value).map(|entries| entries.into_iter().collect())
    }
}

//! Typed value model for document fields
//!
//! This module defines:
//! - Value: closed set of variants a document field can hold
//! - MapValue: insertion-ordered mapping of field name to Value
//!
//! ## Type Rules
//!
//! - No implicit type coercions inside the model
//! - `Int(2) != Double(2.0)`: different variants are NEVER equal
//! - `Blob` is not `String`, `Reference` is not `String`
//! - Double uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`
//! - Map equality ignores key order
//!
//! Coercion between variants and native field types happens in the mapper,
//! never here.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::contract::{Blob, DocumentRef, GeoPoint, Timestamp};
use crate::error::{Error, Result};

/// Value of a single document field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Point in time with nanosecond precision
    Timestamp(Timestamp),
    /// Raw bytes
    Blob(Blob),
    /// Latitude/longitude pair
    GeoPoint(GeoPoint),
    /// Reference to another document
    Reference(DocumentRef),
    /// Ordered list of values
    Array(Vec<Value>),
    /// Nested mapping of field name to value
    Map(MapValue),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // IEEE-754: NaN != NaN, -0.0 == 0.0
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Blob(a), Value::Blob(b)) => a == b,
            (Value::GeoPoint(a), Value::GeoPoint(b)) => a == b,
            (Value::Reference(a), Value::Reference(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Get the variant name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::Timestamp(_) => "Timestamp",
            Value::Blob(_) => "Blob",
            Value::GeoPoint(_) => "GeoPoint",
            Value::Reference(_) => "Reference",
            Value::Array(_) => "Array",
            Value::Map(_) => "Map",
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is a map value
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Check if this is an array value
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Double value
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the timestamp if this is a Timestamp value
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Get the blob if this is a Blob value
    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Get the point if this is a GeoPoint value
    pub fn as_geo_point(&self) -> Option<GeoPoint> {
        match self {
            Value::GeoPoint(p) => Some(*p),
            _ => None,
        }
    }

    /// Get the reference if this is a Reference value
    pub fn as_reference(&self) -> Option<&DocumentRef> {
        match self {
            Value::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Get as &[Value] if this is an Array value
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get as &MapValue if this is a Map value
    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Get as &mut MapValue if this is a Map value
    pub fn as_map_mut(&mut self) -> Option<&mut MapValue> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Calculate the nesting depth of this value
    ///
    /// Returns 0 for scalars and counts nested arrays and maps.
    pub fn nesting_depth(&self) -> usize {
        match self {
            Value::Array(arr) => 1 + arr.iter().map(Value::nesting_depth).max().unwrap_or(0),
            Value::Map(map) => map.nesting_depth(),
            _ => 0,
        }
    }
}

// ============================================================================
// MapValue
// ============================================================================

/// Insertion-ordered mapping of field name to value
///
/// Newtype around `IndexMap` giving:
/// - Direct map access via Deref/DerefMut
/// - Stable iteration in insertion order (the order the encoder wrote fields)
/// - Order-independent equality
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapValue(IndexMap<String, Value>);

impl MapValue {
    /// Create an empty map
    pub fn new() -> Self {
        MapValue(IndexMap::new())
    }

    /// Get the underlying IndexMap
    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.0
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Nesting depth of this map (1 for a flat map of scalars)
    pub fn nesting_depth(&self) -> usize {
        1 + self.0.values().map(Value::nesting_depth).max().unwrap_or(0)
    }

    /// Validate the nesting depth against a limit
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the map nests deeper than `max`.
    pub fn validate_depth(&self, max: usize) -> Result<()> {
        let depth = self.nesting_depth();
        if depth > max {
            Err(Error::invalid_argument(format!(
                "document nesting depth {} exceeds maximum of {} levels",
                depth, max
            )))
        } else {
            Ok(())
        }
    }
}

impl Deref for MapValue {
    type Target = IndexMap<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MapValue {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<(String, Value)> for MapValue {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        MapValue(iter.into_iter().collect())
    }
}

impl IntoIterator for MapValue {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MapValue {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{:?}", d),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Timestamp(t) => write!(f, "{}", t),
            Value::Blob(b) => write!(f, "{}", b),
            Value::GeoPoint(p) => write!(f, "{}", p),
            Value::Reference(r) => write!(f, "Reference({})", r),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => write!(f, "{}", map),
        }
    }
}

impl fmt::Display for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

impl From<Timestamp> for Value {
    fn from(t: Timestamp) -> Self {
        Value::Timestamp(t)
    }
}

impl From<Blob> for Value {
    fn from(b: Blob) -> Self {
        Value::Blob(b)
    }
}

impl From<GeoPoint> for Value {
    fn from(p: GeoPoint) -> Self {
        Value::GeoPoint(p)
    }
}

impl From<DocumentRef> for Value {
    fn from(r: DocumentRef) -> Self {
        Value::Reference(r)
    }
}

impl From<Vec<Value>> for Value {
    fn from(a: Vec<Value>) -> Self {
        Value::Array(a)
    }
}

impl From<MapValue> for Value {
    fn from(m: MapValue) -> Self {
        Value::Map(m)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(m: HashMap<String, Value>) -> Self {
        Value::Map(m.into_iter().collect())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> MapValue {
        MapValue::new()
            .with("number", 1.0)
            .with("str", "a")
            .with("nested", MapValue::new().with("x", 1i64))
    }

    #[test]
    fn test_int_not_equal_double() {
        assert_ne!(Value::Int(2), Value::Double(2.0));
    }

    #[test]
    fn test_blob_not_equal_string() {
        let s = Value::String("hello".to_string());
        let b = Value::Blob(Blob::from_bytes(b"hello"));
        assert_ne!(s, b);
    }

    #[test]
    fn test_reference_not_equal_string() {
        let r = Value::Reference(DocumentRef::new("path/doc1").unwrap());
        assert_ne!(r, Value::String("path/doc1".to_string()));
    }

    #[test]
    fn test_nan_not_equal_nan() {
        assert_ne!(Value::Double(f64::NAN), Value::Double(f64::NAN));
    }

    #[test]
    fn test_negative_zero_equals_zero() {
        assert_eq!(Value::Double(-0.0), Value::Double(0.0));
    }

    #[test]
    fn test_timestamp_equality_compares_nanos() {
        let a = Value::Timestamp(Timestamp::new(123, 123_456_000).unwrap());
        let b = Value::Timestamp(Timestamp::new(123, 123_000_000).unwrap());
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_geo_point_equality() {
        let a = Value::GeoPoint(GeoPoint::new(3.1415, 9.2653).unwrap());
        let b = Value::GeoPoint(GeoPoint::new(3.1415, 9.2653).unwrap());
        let c = Value::GeoPoint(GeoPoint::new(9.2653, 3.1415).unwrap());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_map_equality_key_order_independent() {
        let m1 = MapValue::new().with("a", 1i64).with("b", 2i64);
        let m2 = MapValue::new().with("b", 2i64).with("a", 1i64);
        assert_eq!(Value::Map(m1), Value::Map(m2));
    }

    #[test]
    fn test_map_preserves_insertion_order() {
        let map = sample_map();
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, vec!["number", "str", "nested"]);
    }

    #[test]
    fn test_map_inequality_extra_key() {
        let m1 = MapValue::new().with("a", 1i64);
        let m2 = MapValue::new().with("a", 1i64).with("b", 2i64);
        assert_ne!(m1, m2);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Null.type_name(), "Null");
        assert_eq!(Value::Bool(true).type_name(), "Bool");
        assert_eq!(Value::Int(1).type_name(), "Int");
        assert_eq!(Value::Double(1.0).type_name(), "Double");
        assert_eq!(Value::String(String::new()).type_name(), "String");
        assert_eq!(Value::Timestamp(Timestamp::EPOCH).type_name(), "Timestamp");
        assert_eq!(Value::Blob(Blob::default()).type_name(), "Blob");
        assert_eq!(Value::GeoPoint(GeoPoint::default()).type_name(), "GeoPoint");
        assert_eq!(Value::Array(vec![]).type_name(), "Array");
        assert_eq!(Value::Map(MapValue::new()).type_name(), "Map");
    }

    #[test]
    fn test_as_wrong_type_returns_none() {
        let v = Value::Int(42);
        assert!(v.as_bool().is_none());
        assert!(v.as_double().is_none());
        assert!(v.as_str().is_none());
        assert!(v.as_blob().is_none());
        assert!(v.as_map().is_none());
        assert_eq!(v.as_int(), Some(42));
    }

    #[test]
    fn test_nesting_depth() {
        assert_eq!(Value::Int(1).nesting_depth(), 0);
        assert_eq!(Value::Array(vec![]).nesting_depth(), 1);
        assert_eq!(MapValue::new().nesting_depth(), 1);
        assert_eq!(sample_map().nesting_depth(), 2);
    }

    #[test]
    fn test_validate_depth() {
        let mut deep = Value::Int(0);
        for _ in 0..5 {
            deep = Value::Map(MapValue::new().with("x", deep));
        }
        let doc = MapValue::new().with("root", deep);
        assert!(doc.validate_depth(6).is_ok());
        assert!(doc.validate_depth(5).is_err());
    }

    #[test]
    fn test_display() {
        let map = MapValue::new()
            .with("n", 1.5)
            .with("s", "a")
            .with("list", vec![Value::Int(1), Value::Null]);
        assert_eq!(map.to_string(), r#"{n: 1.5, s: "a", list: [1, null]}"#);
    }

    #[test]
    fn test_value_serialization_roundtrip() {
        let value = Value::Map(
            sample_map()
                .with("ts", Timestamp::new(123, 123_456_000).unwrap())
                .with("blob", Blob::from_bytes(&[3, 1, 4, 1, 5]))
                .with("ref", DocumentRef::new("path/doc1").unwrap()),
        );
        let serialized = serde_json::to_string(&value).unwrap();
        let deserialized: Value = serde_json::from_str(&serialized).unwrap();
        assert_eq!(value, deserialized);
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from("x"), Value::String("x".to_string()));
        assert_eq!(Value::from(()), Value::Null);
        let mut m = HashMap::new();
        m.insert("k".to_string(), Value::Int(1));
        assert_eq!(Value::from(m), Value::Map(MapValue::new().with("k", 1i64)));
    }
}

//! The typed value model stored in documents.
//!
//! Documents are maps of field names to [`Value`]s. Besides the concrete variants,
//! a value may be a [`Sentinel`]: a write-only placeholder that the backend resolves
//! when the write commits. Sentinels never appear in read results.
//!
//! # Example
//!
//! ```ignore
//! use docshim_core::{fields, value::FieldValue};
//!
//! let job = fields! {
//!     "title" => "Plumber",
//!     "views" => 0,
//!     "skills" => vec!["pipes", "valves"],
//!     "createdAt" => FieldValue::server_timestamp_now(),
//! };
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::DeserializeOwned,
    ser::{Error as _, SerializeMap, SerializeSeq},
};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// The field set of a document.
pub type Fields = BTreeMap<String, Value>;

/// A numeric operand, used as the delta of an increment sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Double(f64),
}

impl Number {
    /// Adds two numbers. Integer plus integer saturates at the `i64` bounds,
    /// any double involved produces a double.
    pub fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => Number::Integer(a.saturating_add(b)),
            (a, b) => Number::Double(a.as_f64() + b.as_f64()),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(value) => value as f64,
            Number::Double(value) => value,
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Integer(value as i64)
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number::Integer(value as i64)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Double(value)
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Integer(value) => Value::Integer(value),
            Number::Double(value) => Value::Double(value),
        }
    }
}

/// Write-time placeholders resolved against the store when a write commits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sentinel {
    /// Resolves to the store's clock reading at commit time.
    ServerTimestamp,
    /// Resolves to the field's prior numeric value (or 0) plus the delta.
    Increment(Number),
}

/// A single field value.
///
/// Equality is structural: `Integer(1)` and `Double(1.0)` are different values here,
/// although query filters compare them numerically.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Timestamp(DateTime<Utc>),
    String(String),
    List(Vec<Value>),
    Map(Fields),
    Sentinel(Sentinel),
}

impl Value {
    /// Short type name used in error messages and logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::Timestamp(_) => "timestamp",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Sentinel(_) => "sentinel",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as a float if it is either numeric variant.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Integer(value) => Some(Number::Integer(*value)),
            Value::Double(value) => Some(Number::Double(*value)),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Timestamp(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Value::Map(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_sentinel(&self) -> Option<&Sentinel> {
        match self {
            Value::Sentinel(sentinel) => Some(sentinel),
            _ => None,
        }
    }

    /// Returns `true` if this value is, or transitively contains, a sentinel.
    pub fn contains_sentinel(&self) -> bool {
        match self {
            Value::Sentinel(_) => true,
            Value::List(values) => values.iter().any(Value::contains_sentinel),
            Value::Map(fields) => fields.values().any(Value::contains_sentinel),
            _ => false,
        }
    }

    /// Converts this value to JSON. Timestamps render as RFC 3339 strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the value contains an unresolved sentinel.
    pub fn to_json(&self) -> DocumentStoreResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Constructors for the write-time sentinels.
///
/// Sentinels are only meaningful as values inside a `set` or `update` call.
pub struct FieldValue;

impl FieldValue {
    /// A placeholder that resolves to the store's current time when the write commits.
    pub fn server_timestamp_now() -> Value {
        Value::Sentinel(Sentinel::ServerTimestamp)
    }

    /// A placeholder that adds `delta` to the field's current numeric value
    /// (treating a missing or non-numeric field as 0) when the write commits.
    pub fn increment_by(delta: impl Into<Number>) -> Value {
        Value::Sentinel(Sentinel::Increment(delta.into()))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Fields> for Value {
    fn from(fields: Fields) -> Self {
        Value::Map(fields)
    }
}

impl From<Sentinel> for Value {
    fn from(sentinel: Sentinel) -> Self {
        Value::Sentinel(sentinel)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Boolean(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => Value::Integer(value),
                None => Value::Double(number.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(value) => Value::String(value),
            serde_json::Value::Array(values) => {
                Value::List(values.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(value) => serializer.serialize_bool(*value),
            Value::Integer(value) => serializer.serialize_i64(*value),
            Value::Double(value) => serializer.serialize_f64(*value),
            Value::Timestamp(value) => value.serialize(serializer),
            Value::String(value) => serializer.serialize_str(value),
            Value::List(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Value::Map(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Sentinel(sentinel) => Err(S::Error::custom(format!(
                "unresolved sentinel {sentinel:?} cannot be serialized"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

/// Converts any serializable struct into a document field set.
///
/// # Errors
///
/// Returns [`DocumentStoreError::InvalidDocument`] if `value` does not serialize to
/// a map, or a serialization error if it cannot be serialized at all.
pub fn to_fields<T: Serialize>(value: &T) -> DocumentStoreResult<Fields> {
    match Value::from(serde_json::to_value(value)?) {
        Value::Map(fields) => Ok(fields),
        other => Err(DocumentStoreError::InvalidDocument(format!(
            "expected a map of fields, got {}",
            other.type_name()
        ))),
    }
}

/// Deserializes a document field set into `T`.
pub fn from_fields<T: DeserializeOwned>(fields: &Fields) -> DocumentStoreResult<T> {
    Ok(serde_json::from_value(serde_json::to_value(fields)?)?)
}

/// Builds a [`Fields`] map from `key => value` pairs.
///
/// Values go through `Value::from`, so literals, vectors, nested `fields!` maps and
/// sentinels from [`FieldValue`] can be mixed freely.
#[macro_export]
macro_rules! fields {
    () => {
        $crate::value::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::value::Fields::new();
        $(
            fields.insert(
                ::std::string::String::from($key),
                $crate::value::Value::from($value),
            );
        )+
        fields
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Wallet {
        owner: String,
        balance: i64,
        tags: Vec<String>,
    }

    #[test]
    fn fields_macro_builds_nested_values() {
        let fields = fields! {
            "name" => "Amina",
            "age" => 31,
            "address" => fields! { "city" => "Nairobi" },
            "skills" => vec!["plumbing", "wiring"],
            "nickname" => None::<String>,
        };

        assert_eq!(fields.get("age"), Some(&Value::Integer(31)));
        assert_eq!(
            fields.get("address").and_then(Value::as_map).and_then(|m| m.get("city")),
            Some(&Value::String("Nairobi".into()))
        );
        assert_eq!(fields.get("skills").and_then(Value::as_list).map(<[Value]>::len), Some(2));
        assert_eq!(fields.get("nickname"), Some(&Value::Null));
    }

    #[test]
    fn json_numbers_keep_integer_and_double_apart() {
        let value = Value::from(serde_json::json!({ "a": 1, "b": 1.5 }));
        let map = value.as_map().unwrap();

        assert_eq!(map.get("a"), Some(&Value::Integer(1)));
        assert_eq!(map.get("b"), Some(&Value::Double(1.5)));
    }

    #[test]
    fn sentinels_refuse_to_serialize() {
        let value = Value::List(vec![FieldValue::increment_by(1)]);

        assert!(value.contains_sentinel());
        assert!(value.to_json().is_err());
    }

    #[test]
    fn struct_bridge_through_fields() {
        let wallet = Wallet {
            owner: "user_1".into(),
            balance: 100,
            tags: vec!["primary".into()],
        };

        let fields = to_fields(&wallet).unwrap();
        assert_eq!(fields.get("balance"), Some(&Value::Integer(100)));
        assert_eq!(from_fields::<Wallet>(&fields).unwrap(), wallet);
    }

    #[test]
    fn non_map_structs_are_rejected() {
        assert!(matches!(
            to_fields(&42),
            Err(DocumentStoreError::InvalidDocument(_))
        ));
    }

    #[test]
    fn number_addition_promotes_to_double() {
        assert_eq!(Number::Integer(2).add(Number::Integer(3)), Number::Integer(5));
        assert_eq!(Number::Integer(2).add(Number::Double(0.5)), Number::Double(2.5));
        assert_eq!(
            Number::Integer(i64::MAX).add(Number::Integer(1)),
            Number::Integer(i64::MAX)
        );
    }
}

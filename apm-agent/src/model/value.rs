use std::collections::BTreeMap;

/// A scalar or nested-map value attached to a transaction, span or error.
///
/// Context bags are free-form key/value data supplied by instrumentation call
/// sites; the tagged union keeps them losslessly representable on the wire.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Boolean value
    Bool(bool),
    /// Signed integer value
    I64(i64),
    /// Floating point value
    F64(f64),
    /// String value
    String(String),
    /// Nested map value
    Map(ValueMap),
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I64(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Value::Map(value)
    }
}

/// An ordered string-keyed map of [`Value`]s.
///
/// Merging is shallow: the last write wins per key, and nested maps are
/// replaced wholesale rather than merged recursively.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueMap(BTreeMap<String, Value>);

impl ValueMap {
    /// Create an empty map.
    pub fn new() -> Self {
        ValueMap::default()
    }

    /// Insert or overwrite a single entry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up an entry by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Merge `other` into `self`, overwriting existing keys.
    pub fn merge(&mut self, other: ValueMap) {
        self.0.extend(other.0);
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        ValueMap(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

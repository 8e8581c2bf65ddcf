//! Configuration value representation.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A mapping from key segment to value.
pub type Map = BTreeMap<String, Value>;

/// A parsed configuration value.
#[derive(Clone, PartialEq)]
pub enum Value {
    /// Decimal, octal, or hexadecimal integer.
    Integer(i64),
    /// Duration (milliseconds) or size (bytes).
    WideInteger(i64),
    /// 32-bit floating-point number.
    Float(f32),
    /// Boolean value.
    Bool(bool),
    /// UTF-8 string, also produced by `$NAME` environment references.
    String(String),
    /// `YYYY-MM-DD HH:MM:SS` interpreted as UTC.
    Datetime(DateTime<Utc>),
    /// Homogeneous array.
    Array(Vec<Value>),
    /// Nested mapping created by dotted keys.
    Map(Map),
}

/// The structural tag of a [`Value`], used to keep arrays homogeneous.
///
/// An array's kind carries the kind of its first element, so `[[1], [2]]`
/// and `[[1.0]]` have different kinds. An empty array has no element kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    WideInteger,
    Float,
    Bool,
    String,
    Datetime,
    Array(Option<Box<ValueKind>>),
    Map,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Integer => write!(f, "int"),
            ValueKind::WideInteger => write!(f, "int64"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::String => write!(f, "string"),
            ValueKind::Datetime => write!(f, "datetime"),
            ValueKind::Array(None) => write!(f, "[]"),
            ValueKind::Array(Some(inner)) => write!(f, "[]{}", inner),
            ValueKind::Map => write!(f, "map"),
        }
    }
}

impl Value {
    /// Returns the structural kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::WideInteger(_) => ValueKind::WideInteger,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::String(_) => ValueKind::String,
            Value::Datetime(_) => ValueKind::Datetime,
            Value::Array(items) => ValueKind::Array(items.first().map(|v| Box::new(v.kind()))),
            Value::Map(_) => ValueKind::Map,
        }
    }

    /// The display name of this value's kind, such as `int64` or `[]string`.
    pub fn type_name(&self) -> String {
        self.kind().to_string()
    }

    /// Returns the boolean value if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns any numeric value as `i64`. Floats are truncated toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) | Value::WideInteger(n) => Some(*n),
            Value::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Returns any non-negative numeric value as `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_i64().and_then(|n| u64::try_from(n).ok())
    }

    /// Returns any numeric value as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) | Value::WideInteger(n) => Some(*n as f64),
            Value::Float(f) => Some(widen(*f)),
            _ => None,
        }
    }

    /// Returns the instant if this is a `Datetime`.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Datetime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Returns a reference to the array if this is an `Array`.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Returns a reference to the map if this is a `Map`.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a dotted path such as `http.log.name`.
    ///
    /// Returns `None` if a segment is missing or a non-map value is in the way.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(self, |node, segment| match node {
            Value::Map(map) => map.get(segment),
            _ => None,
        })
    }

    /// Stores `value` at a dotted path, creating intermediate maps.
    ///
    /// Unlike parsing, this overwrites: an existing value at the path is
    /// replaced, and a non-map value in an intermediate position is replaced
    /// by a fresh map. If `self` is not a map it becomes one.
    pub fn set(&mut self, path: &str, value: Value) {
        if !matches!(self, Value::Map(_)) {
            *self = Value::Map(Map::new());
        }
        if let Value::Map(map) = self {
            let segments: Vec<&str> = path.split('.').collect();
            set_path(map, &segments, value);
        }
    }

    /// Mutable counterpart of [`Value::get`].
    pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        path.split('.').try_fold(self, |node, segment| match node {
            Value::Map(map) => map.get_mut(segment),
            _ => None,
        })
    }

    /// Removes and returns the value at a dotted path.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let (parent, last) = match path.rsplit_once('.') {
            Some((parent, last)) => (self.get_mut(parent)?, last),
            None => (self, path),
        };
        match parent {
            Value::Map(map) => map.remove(last),
            _ => None,
        }
    }

    /// Stores any serializable record, map, or scalar at a dotted path.
    ///
    /// Records become nested maps, `None` fields are left out, and a value
    /// that serializes to null removes the path instead.
    pub fn set_serialized<T: Serialize + ?Sized>(
        &mut self,
        path: &str,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        match serde_json::to_value(value)? {
            serde_json::Value::Null => {
                self.remove(path);
            }
            json => self.set(path, Value::try_from(json)?),
        }
        Ok(())
    }

    /// Decodes this value into any deserializable type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(self)?)
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = serde_json::Error;

    /// Integers in `i32` range become `Integer`, other integers
    /// `WideInteger`. Null map entries are dropped; null elsewhere fails.
    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        use serde::de::Error;

        match json {
            serde_json::Value::Null => Err(serde_json::Error::custom("null has no value form")),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(i32::try_from(i).map_or(Value::WideInteger(i), Value::from))
                } else if let Some(f) = n.as_f64().filter(|_| !n.is_u64()) {
                    Ok(Value::Float(f as f32))
                } else {
                    Err(serde_json::Error::custom(format!("{} is out of range", n)))
                }
            }
            serde_json::Value::String(s) => Ok(Value::String(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Value::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            serde_json::Value::Object(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    if !value.is_null() {
                        map.insert(key, Value::try_from(value)?);
                    }
                }
                Ok(Value::Map(map))
            }
        }
    }
}

/// Overwriting path-set on a map. `segments` must be non-empty.
pub(crate) fn set_path(map: &mut Map, segments: &[&str], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut node = map;
    for segment in parents {
        let entry = node
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Map(Map::new()));
        if !matches!(entry, Value::Map(_)) {
            *entry = Value::Map(Map::new());
        }
        node = match entry {
            Value::Map(inner) => inner,
            _ => unreachable!("entry was just made a map"),
        };
    }
    node.insert((*last).to_string(), value);
}

/// Converts an `f32` to the `f64` with the same shortest decimal form,
/// so `0.1f32` becomes `0.1` rather than `0.10000000149011612`.
pub(crate) fn widen(f: f32) -> f64 {
    f.to_string().parse().unwrap_or(f as f64)
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::WideInteger(n) => write!(f, "{}i64", n),
            Value::Float(n) => write!(f, "{:?}f32", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Datetime(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Value::Array(arr) => f.debug_list().entries(arr).finish(),
            Value::Map(map) => f.debug_map().entries(map).finish(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Integer(n) | Value::WideInteger(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(widen(*n)),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::String(s) => serializer.serialize_str(s),
            Value::Datetime(dt) => {
                serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            Value::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for item in arr {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::WideInteger(n)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::Datetime(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        let mut root = Value::Map(Map::new());
        root.set("http.log.name", Value::from("access.log"));
        root.set("http.port", Value::from(8080));
        root.set("timeout", Value::WideInteger(3_000));
        root.set("ratio", Value::Float(0.5));
        root
    }

    #[test]
    fn test_get_dotted_path() {
        let root = sample();
        assert_eq!(root.get("http.log.name").and_then(Value::as_str), Some("access.log"));
        assert_eq!(root.get("http.port").and_then(Value::as_i64), Some(8080));
        assert!(root.get("http.port.number").is_none());
        assert!(root.get("missing").is_none());
    }

    #[test]
    fn test_set_replaces_scalar_with_map() {
        let mut root = sample();
        root.set("http.port.number", Value::from(1));
        assert_eq!(root.get("http.port.number").and_then(Value::as_i64), Some(1));
        assert!(root.get("http.port").and_then(Value::as_map).is_some());
    }

    #[test]
    fn test_numeric_coercion() {
        let root = sample();
        assert_eq!(root.get("timeout").and_then(Value::as_f64), Some(3000.0));
        assert_eq!(root.get("ratio").and_then(Value::as_f64), Some(0.5));
        assert_eq!(root.get("ratio").and_then(Value::as_i64), Some(0));
        assert_eq!(Value::Integer(-1).as_u64(), None);
        assert_eq!(Value::from("x").as_i64(), None);
    }

    #[test]
    fn test_kind_of_nested_arrays() {
        let ints = Value::Array(vec![Value::Integer(1)]);
        let floats = Value::Array(vec![Value::Float(1.0)]);
        assert_ne!(ints.kind(), floats.kind());
        assert_eq!(ints.type_name(), "[]int");
        assert_eq!(Value::WideInteger(1).type_name(), "int64");
        assert_eq!(Value::Array(vec![]).kind(), ValueKind::Array(None));
    }

    #[derive(serde::Serialize)]
    struct Log {
        name: String,
        level: Option<String>,
    }

    #[derive(serde::Serialize)]
    struct Http {
        port: u16,
        timeout: u64,
        hosts: Vec<&'static str>,
        log: Log,
        #[serde(skip)]
        _hook: Option<fn()>,
    }

    #[test]
    fn test_set_serialized_record() {
        let mut root = sample();
        let http = Http {
            port: 443,
            timeout: 5_000_000_000,
            hosts: vec!["a", "b"],
            log: Log {
                name: "error.log".to_string(),
                level: None,
            },
            _hook: None,
        };
        root.set_serialized("prod.http", &http).unwrap();

        assert_eq!(root.get("prod.http.port"), Some(&Value::Integer(443)));
        assert_eq!(
            root.get("prod.http.timeout"),
            Some(&Value::WideInteger(5_000_000_000))
        );
        assert_eq!(
            root.get("prod.http.hosts"),
            Some(&Value::Array(vec![Value::from("a"), Value::from("b")]))
        );
        assert_eq!(root.get("prod.http.log.name"), Some(&Value::from("error.log")));
        assert!(root.get("prod.http.log.level").is_none());
        assert!(root.get("prod.http._hook").is_none());
        assert_eq!(root.get("http.port"), Some(&Value::from(8080)));
    }

    #[test]
    fn test_set_serialized_map_and_scalars() {
        let mut root = Value::Map(Map::new());
        let mut limits = std::collections::HashMap::new();
        limits.insert("upload", 1.5_f64);
        root.set_serialized("limits", &limits).unwrap();
        root.set_serialized("name", "app").unwrap();
        root.set_serialized("enabled", &true).unwrap();
        assert_eq!(root.get("limits.upload"), Some(&Value::Float(1.5)));
        assert_eq!(root.get("name"), Some(&Value::from("app")));
        assert_eq!(root.get("enabled"), Some(&Value::Bool(true)));

        assert!(root.set_serialized("big", &u64::MAX).is_err());
        assert!(root.set_serialized("holes", &vec![Some(1), None]).is_err());
        assert!(root.get("big").is_none());
    }

    #[test]
    fn test_null_removes() {
        let mut root = sample();
        root.set_serialized("http.port", &None::<u16>).unwrap();
        assert!(root.get("http.port").is_none());
        assert_eq!(root.get("http.log.name"), Some(&Value::from("access.log")));

        let mut log = Map::new();
        log.insert("name".to_string(), Value::from("access.log"));
        assert_eq!(root.remove("http.log"), Some(Value::Map(log)));
        assert_eq!(root.remove("http.log"), None);
        assert_eq!(root.remove("timeout.value"), None);
        assert_eq!(root.remove("ratio"), Some(Value::Float(0.5)));
    }

    #[test]
    fn test_float_serializes_shortest() {
        let json = serde_json::to_string(&Value::Float(0.1)).unwrap();
        assert_eq!(json, "0.1");
    }
}

//! YAML output.
//!
//! Mapping:
//!   - Value::Integer / WideInteger -> YAML integer
//!   - Value::Float                 -> YAML float (shortest decimal form)
//!   - Value::Bool                  -> YAML bool
//!   - Value::String                -> YAML string
//!   - Value::Datetime              -> YAML string (RFC 3339, UTC)
//!   - Value::Array                 -> YAML sequence
//!   - Value::Map                   -> YAML mapping

use libcfg::{Map, Value};

/// Encode a document tree as YAML text.
pub fn encode(map: &Map) -> Result<String, String> {
    let yaml_value = map_to_yaml(map);
    serde_yaml::to_string(&yaml_value).map_err(|e| format!("YAML encode error: {}", e))
}

fn map_to_yaml(map: &Map) -> serde_yaml::Value {
    let mut out = serde_yaml::Mapping::new();
    for (k, v) in map {
        out.insert(serde_yaml::Value::String(k.clone()), value_to_yaml(v));
    }
    serde_yaml::Value::Mapping(out)
}

fn value_to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Integer(n) | Value::WideInteger(n) => {
            serde_yaml::Value::Number(serde_yaml::Number::from(*n))
        }
        Value::Float(_) => match value.as_f64() {
            Some(f) => serde_yaml::Value::Number(serde_yaml::Number::from(f)),
            None => serde_yaml::Value::Null,
        },
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::Datetime(dt) => {
            serde_yaml::Value::String(dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        }
        Value::Array(arr) => serde_yaml::Value::Sequence(arr.iter().map(value_to_yaml).collect()),
        Value::Map(map) => map_to_yaml(map),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_serde_yaml() {
        let doc = libcfg::parse(
            "[dev]\nport = 8080\nwait = 2s\nratio = 0.1\nhosts = ['a', 'b']\nat = 2017-10-01 21:00:00\n",
        )
        .unwrap();
        let out = encode(doc.data()).unwrap();
        let back: serde_yaml::Value = serde_yaml::from_str(&out).unwrap();
        let dev = &back["dev"];
        assert_eq!(dev["port"].as_i64(), Some(8080));
        assert_eq!(dev["wait"].as_i64(), Some(2000));
        assert_eq!(dev["ratio"].as_f64(), Some(0.1));
        assert_eq!(dev["hosts"][1].as_str(), Some("b"));
        assert_eq!(dev["at"].as_str(), Some("2017-10-01T21:00:00Z"));
    }
}

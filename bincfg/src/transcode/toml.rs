//! TOML output.
//!
//! Mapping:
//!   - Value::Integer / WideInteger -> TOML integer
//!   - Value::Float                 -> TOML float (shortest decimal form)
//!   - Value::Bool                  -> TOML boolean
//!   - Value::String                -> TOML string
//!   - Value::Datetime              -> TOML offset datetime (UTC)
//!   - Value::Array                 -> TOML array
//!   - Value::Map                   -> TOML table
//!
//! Each mode becomes a top-level table.

use libcfg::{Map, Value};
use toml_edit::{DocumentMut, Formatted, Item, Table};

/// Encode a document tree as TOML text.
pub fn encode(map: &Map) -> Result<String, String> {
    let mut doc = DocumentMut::new();
    for (key, value) in map {
        doc[key.as_str()] = value_to_item(value)?;
    }
    Ok(doc.to_string())
}

fn table(map: &Map) -> Result<Table, String> {
    let mut table = Table::new();
    for (key, value) in map {
        table.insert(key, value_to_item(value)?);
    }
    Ok(table)
}

fn value_to_item(value: &Value) -> Result<Item, String> {
    match value {
        Value::Map(map) => Ok(Item::Table(table(map)?)),
        scalar => Ok(Item::Value(value_to_toml(scalar)?)),
    }
}

fn value_to_toml(value: &Value) -> Result<toml_edit::Value, String> {
    match value {
        Value::Integer(n) | Value::WideInteger(n) => {
            Ok(toml_edit::Value::Integer(Formatted::new(*n)))
        }
        Value::Float(_) => {
            let f = value
                .as_f64()
                .ok_or_else(|| "Internal error: expected float".to_string())?;
            Ok(toml_edit::Value::Float(Formatted::new(f)))
        }
        Value::Bool(b) => Ok(toml_edit::Value::Boolean(Formatted::new(*b))),
        Value::String(s) => Ok(toml_edit::Value::String(Formatted::new(s.clone()))),
        Value::Datetime(dt) => {
            let text = dt.format("%Y-%m-%dT%H:%M:%SZ").to_string();
            let dt = text
                .parse::<toml_edit::Datetime>()
                .map_err(|e| format!("Invalid datetime {}: {}", text, e))?;
            Ok(toml_edit::Value::Datetime(Formatted::new(dt)))
        }
        Value::Array(arr) => {
            let mut toml_arr = toml_edit::Array::new();
            for v in arr {
                toml_arr.push(value_to_toml(v)?);
            }
            Ok(toml_edit::Value::Array(toml_arr))
        }
        Value::Map(map) => {
            let mut inline = toml_edit::InlineTable::new();
            for (k, v) in map {
                inline.insert(k.as_str(), value_to_toml(v)?);
            }
            Ok(toml_edit::Value::InlineTable(inline))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes_become_tables() {
        let doc = libcfg::parse(
            "name = \"app\"\n[prod]\nhttp.port = 443\nratio = 0.1\nat = 2017-10-01 21:00:00\n",
        )
        .unwrap();
        let out = encode(doc.data()).unwrap();
        assert!(out.contains("[_all_]"), "{}", out);
        assert!(out.contains("name = \"app\""), "{}", out);
        assert!(out.contains("[prod.http]"), "{}", out);
        assert!(out.contains("port = 443"), "{}", out);
        assert!(out.contains("ratio = 0.1"), "{}", out);
        assert!(out.contains("at = 2017-10-01T21:00:00Z"), "{}", out);
    }

    #[test]
    fn test_arrays() {
        let doc = libcfg::parse("[a]\nlist = [[1, 2], [3]]\n").unwrap();
        let out = encode(doc.data()).unwrap();
        let back = out.parse::<DocumentMut>().unwrap();
        let list = back["a"]["list"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(1).and_then(|v| v.as_array()).map(|a| a.len()), Some(1));
    }
}

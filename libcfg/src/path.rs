//! Non-overwriting insertion of dotted keys into the document tree.

use crate::error::Fault;
use crate::value::{Map, Value};

/// Store `value` at `mode` + the segments of `key`, creating maps on the way.
///
/// Fails when a non-map value sits on the path or the terminal key is
/// already present.
pub(crate) fn insert(tree: &mut Map, mode: &str, key: &str, value: Value) -> Result<(), Fault> {
    let exists = || Fault::syntax(format!("\"{}\" already exists.", key));

    let mut node = tree;
    let mut segments = std::iter::once(mode).chain(key.split('.')).peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            if node.contains_key(segment) {
                return Err(exists());
            }
            node.insert(segment.to_string(), value);
            return Ok(());
        }
        let entry = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Map(Map::new()));
        node = match entry {
            Value::Map(inner) => inner,
            _ => return Err(exists()),
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_creates_intermediate_maps() {
        let mut tree = Map::new();
        insert(&mut tree, "dev", "http.port", Value::from(80)).unwrap();
        insert(&mut tree, "dev", "http.host", Value::from("localhost")).unwrap();
        let root = Value::Map(tree);
        assert_eq!(root.get("dev.http.port"), Some(&Value::from(80)));
        assert_eq!(root.get("dev.http.host"), Some(&Value::from("localhost")));
    }

    #[test]
    fn test_rejects_duplicates() {
        let mut tree = Map::new();
        insert(&mut tree, "dev", "name", Value::from("a")).unwrap();
        assert_eq!(
            insert(&mut tree, "dev", "name", Value::from("b")),
            Err(Fault::syntax("\"name\" already exists."))
        );
    }

    #[test]
    fn test_rejects_scalar_map_collisions() {
        let mut tree = Map::new();
        insert(&mut tree, "dev", "a.b", Value::from(1)).unwrap();
        assert!(insert(&mut tree, "dev", "a.b.c", Value::from(1)).is_err());
        assert!(insert(&mut tree, "dev", "a", Value::from(1)).is_err());
    }
}

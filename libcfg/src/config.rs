//! Parsed documents, mode merging, and typed loading.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::engine::{self, CATCH_ALL};
use crate::error::{ConfigError, Result};
use crate::value::{self, Map, Value};

/// A parsed configuration: one map per mode at the root.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    data: Map,
}

impl Document {
    pub(crate) fn parse(source: &[u8], mode: Option<&str>) -> Result<Self> {
        let data = engine::parse(source, mode)?;
        Ok(Document { data })
    }

    /// The whole tree, keyed by mode.
    pub fn data(&self) -> &Map {
        &self.data
    }

    pub fn into_data(self) -> Map {
        self.data
    }

    /// The subtree of one mode, if it was declared or received keys.
    pub fn mode(&self, name: &str) -> Option<&Map> {
        self.data.get(name).and_then(Value::as_map)
    }

    /// Keys that appeared before any mode header.
    pub fn catch_all(&self) -> Option<&Map> {
        self.mode(CATCH_ALL)
    }

    /// The catch-all section overlaid with `mode`.
    ///
    /// If only one of the two exists it is returned alone.
    pub fn merged(&self, mode: &str) -> std::result::Result<Map, ConfigError> {
        match (self.catch_all(), self.mode(mode)) {
            (Some(base), Some(overlay)) => {
                let mut base = base.clone();
                merge(&mut base, overlay);
                Ok(base)
            }
            (Some(only), None) | (None, Some(only)) => Ok(only.clone()),
            (None, None) => Err(ConfigError::NoConfiguration),
        }
    }

    /// Merge `mode` over the catch-all section and decode the result.
    pub fn decode<T: DeserializeOwned>(&self, mode: &str) -> std::result::Result<T, ConfigError> {
        decode(&self.merged(mode)?)
    }
}

/// Overlay `overlay` onto `base`, leaf by leaf.
///
/// Maps are merged recursively; every other value replaces what `base`
/// holds at the same path, including a map.
pub fn merge(base: &mut Map, overlay: &Map) {
    let mut path = Vec::new();
    merge_at(base, overlay, &mut path);
}

fn merge_at<'a>(base: &mut Map, overlay: &'a Map, path: &mut Vec<&'a str>) {
    for (key, value) in overlay {
        path.push(key);
        match value {
            Value::Map(inner) => merge_at(base, inner, path),
            leaf => value::set_path(base, path, leaf.clone()),
        }
        path.pop();
    }
}

/// Decode a map into any deserializable type.
pub fn decode<T: DeserializeOwned>(map: &Map) -> std::result::Result<T, ConfigError> {
    let json = serde_json::to_value(map)?;
    Ok(serde_json::from_value(json)?)
}

/// Read `path` permissively, merge `mode` over the catch-all section, and
/// decode the result.
pub fn load<T: DeserializeOwned>(
    path: impl AsRef<Path>,
    mode: &str,
) -> std::result::Result<T, ConfigError> {
    let source = read(path.as_ref())?;
    Document::parse(&source, Some(CATCH_ALL))?.decode(mode)
}

/// Read `path` with the strict entry point, which requires a mode header
/// before any key.
pub fn load_modes(path: impl AsRef<Path>) -> std::result::Result<Document, ConfigError> {
    let source = read(path.as_ref())?;
    Ok(Document::parse(&source, None)?)
}

fn read(path: &Path) -> std::result::Result<Vec<u8>, ConfigError> {
    fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

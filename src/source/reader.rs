//! Source file reading and parsing.

use crate::error::{Error, Result};
use crate::tree::ConfigTree;
use serde_yaml::{Mapping, Value};
use std::io::ErrorKind;
use std::path::Path;

/// Extensions recognized as configuration sources.
pub const SOURCE_EXTENSIONS: &[&str] = &["yml", "yaml", "toml"];

pub fn is_source_file(path: &Path) -> bool {
    extension(path).map(|ext| SOURCE_EXTENSIONS.contains(&ext.as_str())).unwrap_or(false)
}

fn extension(path: &Path) -> Option<String> {
    path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase)
}

/// Read and parse one source file.
///
/// A missing file yields `Ok(None)`; absent sources are skipped, matching
/// the loader's contract. Any other I/O failure, and any parse failure,
/// is an error. An empty file is an explicit null tree.
pub fn read_source(path: &Path) -> Result<Option<ConfigTree>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "source file not found, skipping");
            return Ok(None);
        }
        Err(source) => return Err(Error::Io { path: path.to_path_buf(), source }),
    };
    if content.trim().is_empty() {
        return Ok(Some(Value::Null));
    }
    let tree = match extension(path).as_deref() {
        Some("toml") => toml::from_str::<toml::Value>(&content)
            .map(toml_to_tree)
            .map_err(|e| Error::Parse { path: path.to_path_buf(), message: e.to_string() })?,
        _ => serde_yaml::from_str(&content)
            .map_err(|e| Error::Parse { path: path.to_path_buf(), message: e.to_string() })?,
    };
    Ok(Some(tree))
}

/// Rebuild a TOML document as the common tree type.
fn toml_to_tree(value: toml::Value) -> ConfigTree {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Value::Number(serde_yaml::Number::from(f)),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => {
            Value::Sequence(items.into_iter().map(toml_to_tree).collect())
        }
        toml::Value::Table(table) => {
            let mut map = Mapping::new();
            for (key, value) in table {
                map.insert(Value::String(key), toml_to_tree(value));
            }
            Value::Mapping(map)
        }
    }
}

//! Source aggregation.
//!
//! Turns a list of file and directory paths into a single raw configuration
//! tree. Each file contributes a *source* named after the file (extension
//! stripped); the source whose name equals the configured root is promoted
//! to the base tree and every other source nests under its own name.

use crate::error::{Error, Result};
use crate::tree::ConfigTree;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use walkdir::WalkDir;

pub mod reader;

/// Source consulted when no paths are given.
pub const DEFAULT_SOURCE: &str = "config.yml";

/// Ordered mapping from logical source name to its parsed tree.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    sources: Vec<(String, ConfigTree)>,
}

impl SourceMap {
    fn push(&mut self, name: String, tree: ConfigTree) {
        match self.sources.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = tree,
            None => self.sources.push((name, tree)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Source names in collection order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|(name, _)| name.as_str())
    }

    /// Promote the root-named source to the base tree and nest every other
    /// source under its own name.
    ///
    /// A root source that is not a mapping (an empty file, a bare scalar)
    /// cannot carry nested sources and is replaced by an empty base.
    pub fn into_tree(self, root: &str) -> ConfigTree {
        let mut base = Mapping::new();
        let mut rest = Vec::new();
        for (name, tree) in self.sources {
            if name == root {
                match tree {
                    Value::Mapping(map) => base = map,
                    Value::Null => base = Mapping::new(),
                    other => {
                        tracing::warn!(
                            source = %name,
                            kind = tree_kind(&other),
                            "root source is not a mapping, starting from an empty base"
                        );
                        base = Mapping::new();
                    }
                }
            } else {
                rest.push((name, tree));
            }
        }
        for (name, tree) in rest {
            base.insert(Value::String(name), tree);
        }
        Value::Mapping(base)
    }
}

fn tree_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

/// Collect sources from explicit file paths and one-level directory listings.
///
/// Missing *files* are skipped; a missing or non-directory *directory* path
/// is an error. With no paths at all, a `config.yml` in the current
/// directory is used when present.
pub fn aggregate<P: AsRef<Path>>(paths: &[P]) -> Result<SourceMap> {
    let mut map = SourceMap::default();
    if paths.is_empty() {
        let fallback = Path::new(DEFAULT_SOURCE);
        if fallback.exists() {
            collect_file(&mut map, fallback)?;
        }
        return Ok(map);
    }
    for path in paths {
        let path = path.as_ref();
        if reader::is_source_file(path) {
            collect_file(&mut map, path)?;
        } else {
            collect_dir(&mut map, path)?;
        }
    }
    Ok(map)
}

fn collect_file(map: &mut SourceMap, path: &Path) -> Result<()> {
    if let Some(tree) = reader::read_source(path)? {
        map.push(source_name(path), tree);
    }
    Ok(())
}

fn collect_dir(map: &mut SourceMap, dir: &Path) -> Result<()> {
    let meta = std::fs::metadata(dir)
        .map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
    if !meta.is_dir() {
        return Err(Error::Io {
            path: dir.to_path_buf(),
            source: std::io::Error::other("not a directory"),
        });
    }
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry =
            entry.map_err(|e| Error::Io { path: dir.to_path_buf(), source: e.into() })?;
        if entry.file_type().is_file() && reader::is_source_file(entry.path()) {
            collect_file(map, entry.path())?;
        }
    }
    Ok(())
}

fn source_name(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn aggregate_names_sources_after_their_files() {
        let tmp = TempDir::new().expect("tmp");
        let a = tmp.path().join("alpha.yml");
        let b = tmp.path().join("beta.yaml");
        fs::write(&a, "x: 1\n").expect("write");
        fs::write(&b, "y: 2\n").expect("write");

        let map = aggregate(&[&a, &b]).expect("aggregate");
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["alpha", "beta"]);
    }

    #[test]
    fn aggregate_skips_missing_files() {
        let tmp = TempDir::new().expect("tmp");
        let present = tmp.path().join("here.yml");
        fs::write(&present, "x: 1\n").expect("write");

        let map = aggregate(&[tmp.path().join("gone.yml"), present]).expect("aggregate");
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["here"]);
    }

    #[test]
    fn aggregate_lists_directories_one_level_deep_in_name_order() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("b.yml"), "x: 1\n").expect("write");
        fs::write(tmp.path().join("a.yml"), "y: 2\n").expect("write");
        fs::write(tmp.path().join("notes.txt"), "ignored\n").expect("write");
        let nested = tmp.path().join("sub");
        fs::create_dir(&nested).expect("mkdir");
        fs::write(nested.join("deep.yml"), "z: 3\n").expect("write");

        let map = aggregate(&[tmp.path()]).expect("aggregate");
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn aggregate_errors_on_missing_directory() {
        let tmp = TempDir::new().expect("tmp");
        let result = aggregate(&[tmp.path().join("no_such_dir")]);
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn aggregate_errors_on_unrecognized_file_path() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("config.json");
        fs::write(&path, "{}\n").expect("write");

        // Not a source extension, so it is treated as a directory and fails.
        assert!(matches!(aggregate(&[&path]), Err(Error::Io { .. })));
    }

    #[test]
    fn into_tree_promotes_the_root_source() {
        let mut map = SourceMap::default();
        map.push("config".to_string(), serde_yaml::from_str("a: 1\n").expect("yaml"));
        map.push("extra".to_string(), serde_yaml::from_str("b: 2\n").expect("yaml"));

        let tree = map.into_tree("config");
        assert_eq!(tree.get("a").and_then(Value::as_u64), Some(1));
        assert_eq!(tree.get("extra").and_then(|e| e.get("b")).and_then(Value::as_u64), Some(2));
    }

    #[test]
    fn into_tree_nests_everything_when_no_root_matches() {
        let mut map = SourceMap::default();
        map.push("one".to_string(), serde_yaml::from_str("a: 1\n").expect("yaml"));

        let tree = map.into_tree("config");
        assert!(tree.get("a").is_none());
        assert_eq!(tree.get("one").and_then(|o| o.get("a")).and_then(Value::as_u64), Some(1));
    }

    #[test]
    fn into_tree_keeps_siblings_when_root_arrives_last() {
        let mut map = SourceMap::default();
        map.push("extra".to_string(), serde_yaml::from_str("b: 2\n").expect("yaml"));
        map.push("config".to_string(), serde_yaml::from_str("a: 1\n").expect("yaml"));

        let tree = map.into_tree("config");
        assert_eq!(tree.get("a").and_then(Value::as_u64), Some(1));
        assert_eq!(tree.get("extra").and_then(|e| e.get("b")).and_then(Value::as_u64), Some(2));
    }
}

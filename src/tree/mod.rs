//! Configuration tree helpers.
//!
//! The tree type is [`serde_yaml::Value`]: scalars, sequences, and
//! insertion-ordered mappings. Everything here operates on dotted paths
//! (`server.hosts.0.name`), which traverse mappings by key and sequences by
//! numeric index.

use serde_yaml::Value;

/// A parsed configuration tree.
pub type ConfigTree = Value;

/// Look up a dotted path in a tree.
///
/// Returns `Some` for any present value, including explicit nulls: presence
/// and usability are separate questions (see [`substitutable_string`]).
pub fn lookup<'a>(tree: &'a ConfigTree, path: &str) -> Option<&'a Value> {
    let mut current = tree;
    for segment in path.split('.') {
        current = match current {
            Value::Mapping(_) => current.get(segment)?,
            Value::Sequence(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// The string form of a value for substitution into a string scalar.
///
/// Returns `None` for values the substitution pass treats as missing:
/// null, `false`, zero, the empty string, and any mapping or sequence.
pub fn substitutable_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Total node count, used to budget substitution passes.
pub fn node_count(value: &Value) -> usize {
    match value {
        Value::Mapping(map) => 1 + map.iter().map(|(_, v)| node_count(v)).sum::<usize>(),
        Value::Sequence(items) => 1 + items.iter().map(node_count).sum::<usize>(),
        _ => 1,
    }
}

/// Top-level keys of a mapping tree; empty for any other shape.
pub fn top_level_keys(tree: &ConfigTree) -> Vec<String> {
    match tree {
        Value::Mapping(map) => {
            map.keys().filter_map(Value::as_str).map(str::to_string).collect()
        }
        _ => Vec::new(),
    }
}

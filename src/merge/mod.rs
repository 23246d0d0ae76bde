//! Override merging.
//!
//! Builds the merged tree `{} ← base ← base[envType] ← metadata`: the
//! environment-type layer overrides the base, and the injected metadata
//! (`envId`, `ENVID`, `timestamp`, `args`) overrides everything, so
//! configuration content can never shadow it. Mappings merge recursively;
//! sequences and scalars are replaced wholesale.

use crate::args::ArgSet;
use crate::env::Environment;
use crate::tree::ConfigTree;
use serde_yaml::mapping::Entry;
use serde_yaml::{Mapping, Value};

/// Format of the injected `timestamp` field.
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Deep-merge `overlay` into `base`. Later wins on collision: nested
/// mappings recurse, everything else is replaced.
pub fn deep_merge(base: &mut ConfigTree, overlay: &ConfigTree) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.entry(key.clone()) {
                    Entry::Occupied(mut slot) => deep_merge(slot.get_mut(), value),
                    Entry::Vacant(slot) => {
                        slot.insert(value.clone());
                    }
                }
            }
        }
        (slot, overlay) => *slot = overlay.clone(),
    }
}

/// The metadata layer injected on every load.
///
/// `envId`/`ENVID` appear only when an identifier resolved; `timestamp` and
/// `args` always do.
pub fn metadata(environment: &Environment, args: &ArgSet) -> ConfigTree {
    let mut map = Mapping::new();
    if let Some(id) = &environment.id {
        map.insert(Value::from("envId"), Value::String(id.clone()));
    }
    if let Some(upper) = &environment.id_upper {
        map.insert(Value::from("ENVID"), Value::String(upper.clone()));
    }
    map.insert(
        Value::from("timestamp"),
        Value::String(chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()),
    );
    map.insert(Value::from("args"), args.to_tree());
    Value::Mapping(map)
}

/// Merge the base tree with its environment-type override layer and the
/// metadata layer. An absent environment type means no override layer.
pub fn overlay(base: ConfigTree, environment: &Environment, metadata: ConfigTree) -> ConfigTree {
    let mut merged = Value::Mapping(Mapping::new());
    deep_merge(&mut merged, &base);
    if let Some(env_type) = &environment.env_type {
        if let Some(layer) = base.get(env_type.as_str()) {
            deep_merge(&mut merged, layer);
        }
    }
    deep_merge(&mut merged, &metadata);
    merged
}

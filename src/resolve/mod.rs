//! Placeholder resolution.
//!
//! Rewrites `${dotted.path}` tokens inside string values by looking the
//! path up in the full tree, repeating whole-tree passes until one makes no
//! substitution. Lookups always hit the pass-start snapshot, so chained
//! references resolve one hop per pass. Passes are budgeted by tree size:
//! a reference cycle keeps "succeeding" forever and is reported as
//! [`Resolution::CycleDetected`] once the budget runs out.
//!
//! Lookups that are missing, falsy (null, `false`, `0`, `""`), or
//! non-scalar leave their placeholder verbatim and do not count as
//! substitutions, so they cannot spin the loop.

use crate::error::{Error, Result};
use crate::tree::{self, ConfigTree};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_yaml::{Mapping, Value};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([\w.-]+)\}").expect("valid regex"));

/// Extra passes allowed beyond one hop per node before giving up.
const PASS_SLACK: usize = 8;

/// Outcome of fixed-point resolution.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A full pass made no substitution.
    Resolved { tree: ConfigTree, passes: usize },
    /// Substitutions kept succeeding past the pass budget.
    CycleDetected { tree: ConfigTree, passes: usize },
}

impl Resolution {
    /// The resolved tree, or [`Error::SubstitutionCycle`] when the budget
    /// ran out.
    pub fn into_tree(self) -> Result<ConfigTree> {
        match self {
            Resolution::Resolved { tree, .. } => Ok(tree),
            Resolution::CycleDetected { passes, .. } => Err(Error::SubstitutionCycle { passes }),
        }
    }
}

/// A tree whose top-level entries have each reached their own fixed point
/// (multi-file stage one); cross-source references are still unresolved.
#[derive(Debug, Clone)]
pub struct PerSourceResolved(ConfigTree);

impl PerSourceResolved {
    pub fn into_tree(self) -> ConfigTree {
        self.0
    }
}

/// Resolve a whole tree to its fixed point.
pub fn resolve(tree: ConfigTree) -> Resolution {
    let budget = tree::node_count(&tree) + PASS_SLACK;
    let mut current = tree;
    let mut passes = 0;
    loop {
        let (next, changed) = pass(&current);
        current = next;
        if !changed {
            tracing::debug!(passes, "placeholder resolution reached a fixed point");
            return Resolution::Resolved { tree: current, passes };
        }
        passes += 1;
        if passes >= budget {
            return Resolution::CycleDetected { tree: current, passes };
        }
    }
}

/// Multi-file stage one: resolve each top-level entry against itself only,
/// so sources can self-reference without seeing their siblings.
pub fn resolve_each_source(tree: ConfigTree) -> Result<PerSourceResolved> {
    let Value::Mapping(map) = tree else {
        return Ok(PerSourceResolved(tree));
    };
    let mut resolved = Mapping::new();
    for (key, value) in map {
        let value = resolve(value).into_tree()?;
        resolved.insert(key, value);
    }
    Ok(PerSourceResolved(Value::Mapping(resolved)))
}

/// One full rewrite of the tree, with lookups against the pass-start
/// snapshot.
fn pass(snapshot: &ConfigTree) -> (ConfigTree, bool) {
    let mut next = snapshot.clone();
    let mut changed = false;
    rewrite(&mut next, snapshot, &mut changed);
    (next, changed)
}

fn rewrite(node: &mut Value, snapshot: &ConfigTree, changed: &mut bool) {
    match node {
        Value::String(text) => {
            if let Some(replaced) = substitute(snapshot, text) {
                *text = replaced;
                *changed = true;
            }
        }
        Value::Mapping(map) => {
            for value in map.values_mut() {
                rewrite(value, snapshot, changed);
            }
        }
        Value::Sequence(items) => {
            for item in items {
                rewrite(item, snapshot, changed);
            }
        }
        _ => {}
    }
}

/// Replace every resolvable placeholder in `text`, returning `None` when
/// nothing was substituted.
fn substitute(snapshot: &ConfigTree, text: &str) -> Option<String> {
    let mut substituted = false;
    let replaced = PLACEHOLDER.replace_all(text, |caps: &Captures| {
        match tree::lookup(snapshot, &caps[1]).and_then(tree::substitutable_string) {
            Some(value) => {
                substituted = true;
                value
            }
            None => caps[0].to_string(),
        }
    });
    substituted.then(|| replaced.into_owned())
}

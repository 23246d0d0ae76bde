//! Environment resolution.
//!
//! Decides which environment identifier is active for a load and which
//! environment *type* selects the override layer. The identifier comes from
//! the first non-empty signal in a fixed precedence chain:
//!
//! 1. the explicit `--env` invocation argument;
//! 2. the first argument whose *name* matches a top-level configuration key
//!    (a bare flag doubling as an environment selector);
//! 3. the `ENVIRONMENT_ID` process environment variable;
//! 4. the current source-control branch, optionally rewritten by the
//!    configuration's `branchRegex`, truncated to 13 characters, trailing
//!    dashes trimmed.
//!
//! The type is the identifier itself when it appears in the permitted set
//! (`environments.static`, or the top-level keys when absent), otherwise
//! `environments.default`. An absent type just means no override layer.

use crate::args::ArgSet;
use crate::tree::{self, ConfigTree};
use regex::Regex;
use serde::Deserialize;

pub mod branch;

pub use branch::{BranchSource, GitBranch};

/// Environment variable consulted when no argument selects an environment.
pub const ENV_ID_VAR: &str = "ENVIRONMENT_ID";

/// Branch-derived identifiers are cut to this many characters.
const BRANCH_ID_LENGTH: usize = 13;

/// The `environments` declaration block of a configuration tree.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentsDecl {
    /// Allow-list of environment types; top-level keys stand in when absent.
    #[serde(rename = "static")]
    pub static_types: Option<Vec<String>>,
    /// Fallback type when the identifier matches no permitted type.
    pub default: Option<String>,
}

/// The resolved environment for one load.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub id: Option<String>,
    pub id_upper: Option<String>,
    pub env_type: Option<String>,
}

/// Resolve the active environment for `tree` given the invocation arguments
/// and a branch source.
pub fn resolve(tree: &ConfigTree, args: &ArgSet, branch: &dyn BranchSource) -> Environment {
    let decl = environments_decl(tree);
    let id = env_id(tree, args, branch);
    let types = match &decl.static_types {
        Some(types) => types.clone(),
        None => tree::top_level_keys(tree),
    };
    let env_type = match &id {
        Some(id) if types.iter().any(|t| t == id) => Some(id.clone()),
        _ => decl.default.clone(),
    };
    Environment { id_upper: id.as_ref().map(|s| s.to_uppercase()), id, env_type }
}

fn environments_decl(tree: &ConfigTree) -> EnvironmentsDecl {
    tree.get("environments")
        .cloned()
        .and_then(|value| serde_yaml::from_value(value).ok())
        .unwrap_or_default()
}

fn env_id(tree: &ConfigTree, args: &ArgSet, branch: &dyn BranchSource) -> Option<String> {
    if let Some(value) = args.value_of("env") {
        return Some(value.to_string());
    }
    if let Some(name) = flag_selector(tree, args) {
        return Some(name);
    }
    if let Some(value) = std::env::var(ENV_ID_VAR).ok().filter(|v| !v.is_empty()) {
        return Some(value);
    }
    branch_env_id(tree, branch)
}

/// The first argument whose name matches a top-level key of the raw tree,
/// in argument declaration order.
fn flag_selector(tree: &ConfigTree, args: &ArgSet) -> Option<String> {
    if !tree.is_mapping() {
        return None;
    }
    args.names().find(|name| tree.get(*name).is_some()).map(str::to_string)
}

/// Derive an identifier from the current branch name.
///
/// An invalid `branchRegex` abandons branch derivation entirely rather than
/// using the raw branch name.
fn branch_env_id(tree: &ConfigTree, branch: &dyn BranchSource) -> Option<String> {
    let raw = branch.current_branch()?;
    let rewritten = match branch_regex(tree) {
        Some(Ok(re)) => re.replace(&raw, "$1").into_owned(),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "invalid branchRegex, ignoring branch");
            return None;
        }
        None => raw,
    };
    let truncated: String = rewritten.chars().take(BRANCH_ID_LENGTH).collect();
    let id = truncated.trim_end_matches('-');
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

fn branch_regex(tree: &ConfigTree) -> Option<std::result::Result<Regex, regex::Error>> {
    let pattern = tree.get("branchRegex")?.as_str()?;
    Some(Regex::new(pattern.trim()))
}

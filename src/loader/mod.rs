//! Loader façade.
//!
//! Orchestrates one load: aggregate sources → resolve the environment →
//! (in multi-file mode, resolve each source against itself) → merge the
//! override layer and metadata → resolve placeholders to a fixed point.
//!
//! A [`Loader`] carries the options and the argument/branch seams; the free
//! [`load`] function covers the default case. [`init`] additionally stores
//! the result in a process-wide slot read by [`current`] and [`log`].

use crate::args::ArgSet;
use crate::env::{self, BranchSource, Environment, GitBranch};
use crate::error::{Error, Result};
use crate::merge;
use crate::resolve;
use crate::source;
use crate::tree::{self, ConfigTree};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Recognized loader options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Resolve each source against itself before the cross-source merge.
    pub multi_file: bool,
    /// Logical source name promoted to the top-level base tree.
    pub root: String,
}

impl Default for Options {
    fn default() -> Self {
        Self { multi_file: false, root: "config".to_string() }
    }
}

/// Builder-style loader.
///
/// The defaults read the process arguments and discover the enclosing git
/// repository; both seams are replaceable, which is how the tests drive the
/// precedence chain deterministically.
pub struct Loader {
    options: Options,
    args: ArgSet,
    branch: Box<dyn BranchSource>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            options: Options::default(),
            args: ArgSet::from_env(),
            branch: Box::new(GitBranch::new()),
        }
    }

    /// Resolve each source against itself before the cross-source merge.
    pub fn multi_file(mut self, multi_file: bool) -> Self {
        self.options.multi_file = multi_file;
        self
    }

    /// Logical source name promoted to the top-level base tree.
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.options.root = root.into();
        self
    }

    /// Replace the invocation arguments.
    pub fn args(mut self, args: ArgSet) -> Self {
        self.args = args;
        self
    }

    /// Replace the branch source.
    pub fn branch_source(mut self, branch: impl BranchSource + 'static) -> Self {
        self.branch = Box::new(branch);
        self
    }

    /// Load, merge, and resolve the configuration at `paths`.
    pub fn load<P: AsRef<Path>>(&self, paths: &[P]) -> Result<ResolvedConfig> {
        let sources = source::aggregate(paths)?;
        let raw = sources.into_tree(&self.options.root);
        let environment = env::resolve(&raw, &self.args, self.branch.as_ref());
        let metadata = merge::metadata(&environment, &self.args);
        let base = if self.options.multi_file {
            resolve::resolve_each_source(raw)?.into_tree()
        } else {
            raw
        };
        let merged = merge::overlay(base, &environment, metadata);
        let tree = resolve::resolve(merged).into_tree()?;
        Ok(ResolvedConfig { tree, environment })
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The outcome of one load: the merged, fully substituted tree plus the
/// environment it was resolved under.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    tree: ConfigTree,
    environment: Environment,
}

impl ResolvedConfig {
    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn env_id(&self) -> Option<&str> {
        self.environment.id.as_deref()
    }

    pub fn env_type(&self) -> Option<&str> {
        self.environment.env_type.as_deref()
    }

    /// Value at a dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        tree::lookup(&self.tree, path)
    }

    /// String value at a dotted path.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Deserialize the subtree at `path` into a typed value.
    pub fn section<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.get(path).cloned().unwrap_or(Value::Null);
        serde_yaml::from_value(value)
            .map_err(|e| Error::Section { path: path.to_string(), message: e.to_string() })
    }

    /// Check that every dotted path in `names` is present, reporting all
    /// missing paths in one error. A present-but-null value counts as
    /// present.
    pub fn require_settings<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let missing: Vec<String> = names
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| tree::lookup(&self.tree, name).is_none())
            .map(str::to_string)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingSettings { names: missing })
        }
    }

    /// Print the active identifier and type, `-` standing in for "none".
    pub fn log(&self) {
        println!("CONFIG: {} {}", self.env_id().unwrap_or("-"), self.env_type().unwrap_or("-"));
    }
}

/// Load with default options, without touching the process-wide slot.
pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<ResolvedConfig> {
    Loader::new().load(paths)
}

/// Process-wide configuration slot.
///
/// Empty until [`init`] runs; replaced by every later [`init`]; lives for
/// the rest of the process. Nothing loads implicitly.
static CURRENT: Lazy<RwLock<Option<Arc<ResolvedConfig>>>> = Lazy::new(|| RwLock::new(None));

/// Load with default options and store the result as the process-wide
/// configuration.
pub fn init<P: AsRef<Path>>(paths: &[P]) -> Result<Arc<ResolvedConfig>> {
    init_with(Loader::new(), paths)
}

/// Like [`init`], with a custom loader.
pub fn init_with<P: AsRef<Path>>(loader: Loader, paths: &[P]) -> Result<Arc<ResolvedConfig>> {
    let config = Arc::new(loader.load(paths)?);
    *CURRENT.write().expect("configuration slot poisoned") = Some(config.clone());
    Ok(config)
}

/// The process-wide configuration, if [`init`] has run.
pub fn current() -> Option<Arc<ResolvedConfig>> {
    CURRENT.read().expect("configuration slot poisoned").clone()
}

/// Print the active identifier and type of the process-wide configuration.
pub fn log() {
    match current() {
        Some(config) => config.log(),
        None => println!("CONFIG: - -"),
    }
}

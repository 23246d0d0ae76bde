//! confstack: environment-aware layered configuration loading.
//!
//! Loads one or more YAML/TOML sources, selects an active environment from
//! invocation arguments, the `ENVIRONMENT_ID` variable, or the current git
//! branch, merges the matching override layer and injected metadata
//! (`envId`, `ENVID`, `timestamp`, `args`) into the base tree, and resolves
//! `${dotted.path}` placeholders to a fixed point.
//!
//! ```no_run
//! use confstack::Loader;
//!
//! let config = Loader::new().root("config").load(&["config"])?;
//! config.log();
//! if let Some(url) = config.get_str("database.url") {
//!     println!("connecting to {url}");
//! }
//! config.require_settings(&["database.url", "database.pool.size"])?;
//! # Ok::<(), confstack::Error>(())
//! ```

pub mod args;
pub mod env;
pub mod error;
pub mod loader;
pub mod merge;
pub mod resolve;
pub mod source;
pub mod tree;

pub use args::{ArgSet, ArgValue};
pub use env::{BranchSource, Environment, GitBranch};
pub use error::{Error, Result};
pub use loader::{current, init, init_with, load, log, Loader, Options, ResolvedConfig};

//! Error types for configuration loading.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the loader.
///
/// Two failure classes are deliberately absent: missing source files are
/// skipped during aggregation, and branch-lookup failures resolve to "no
/// branch". Both are logged at debug level instead of raised.
#[derive(Error, Debug)]
pub enum Error {
    /// An I/O failure other than a missing source file.
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file that exists but does not parse.
    #[error("failed to parse {}: {}", .path.display(), .message)]
    Parse { path: PathBuf, message: String },

    /// A typed section extraction that does not deserialize.
    #[error("failed to deserialize section {path}: {message}")]
    Section { path: String, message: String },

    /// One or more required settings are absent from the resolved tree.
    #[error("{}", missing_settings_message(.names))]
    MissingSettings { names: Vec<String> },

    /// Placeholder substitution kept succeeding past its pass budget.
    #[error("placeholder substitution did not settle after {passes} passes; reference cycle suspected")]
    SubstitutionCycle { passes: usize },
}

fn missing_settings_message(names: &[String]) -> String {
    match names {
        [single] => format!("missing required setting: {single}"),
        _ => format!("missing required settings: {}", names.join(", ")),
    }
}

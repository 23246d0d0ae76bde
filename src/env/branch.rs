//! Branch-name sources.

use std::path::{Path, PathBuf};

/// Where the environment resolver gets the current source-control branch.
///
/// Implementations return `None` for every failure mode (no repository,
/// detached or unborn head) and the resolver falls through to "no
/// identifier". Failures never propagate.
pub trait BranchSource {
    fn current_branch(&self) -> Option<String>;
}

/// Branch lookup against the repository containing `root`, or any of its
/// ancestors.
#[derive(Debug, Clone)]
pub struct GitBranch {
    root: PathBuf,
}

impl GitBranch {
    /// Discover from the current directory.
    pub fn new() -> Self {
        Self { root: PathBuf::from(".") }
    }

    /// Discover from an explicit starting point.
    pub fn at<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
}

impl Default for GitBranch {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchSource for GitBranch {
    fn current_branch(&self) -> Option<String> {
        let repo = match git2::Repository::discover(&self.root) {
            Ok(repo) => repo,
            Err(e) => {
                tracing::debug!(error = %e, "no git repository found");
                return None;
            }
        };
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) => {
                tracing::debug!(error = %e, "repository head unavailable");
                return None;
            }
        };
        head.shorthand().map(str::to_string)
    }
}

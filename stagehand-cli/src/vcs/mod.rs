//! Version control facade
//!
//! The staging run only needs a handful of facts from git. They are exposed
//! through the [`Vcs`] trait so the decision logic can be exercised without a
//! real repository.

mod git;
#[cfg(test)]
pub mod mock;

pub use git::GitCli;

use async_trait::async_trait;
use stagehand_core::domain::patch::DiffStrategy;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for git queries
pub type Result<T> = std::result::Result<T, VcsError>;

/// Errors reported by the version control facade
#[derive(Debug, Error)]
pub enum VcsError {
    /// The branch has no tracking ref
    #[error("no upstream configured for branch '{0}'")]
    NoUpstream(String),

    /// A ref named in the command does not exist
    #[error("ref not found: {0}")]
    MissingRef(String),

    /// git ran and exited unsuccessfully
    #[error("`git {command}` failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// git did not finish in time
    #[error("`git {command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// git could not be started
    #[error("failed to run git: {0}")]
    Io(#[from] std::io::Error),

    /// git printed something that is not text
    #[error("git output is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Read-only queries against the developer's repository
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Name of the checked out branch
    async fn current_branch(&self) -> Result<String>;

    /// URL of the `origin` remote
    async fn remote_url(&self) -> Result<String>;

    /// Globally configured user name
    async fn user_name(&self) -> Result<String>;

    /// Globally configured user email
    async fn user_email(&self) -> Result<String>;

    /// Raw tracking ref of `branch`
    ///
    /// Fails with [`VcsError::NoUpstream`] when none is configured.
    async fn upstream_ref(&self, branch: &str) -> Result<String>;

    /// Diff `branch` against `remotes/origin/<branch>`, discarding the output
    ///
    /// Fails with [`VcsError::MissingRef`] when the remote has no such branch.
    async fn diff_against_remote_branch(&self, branch: &str) -> Result<()>;

    /// Commits on the current branch that are not upstream, oldest first
    async fn unpushed_commits(&self) -> Result<Vec<String>>;

    /// Produce the raw patch for a strategy
    async fn diff(&self, strategy: &DiffStrategy) -> Result<Vec<u8>>;
}

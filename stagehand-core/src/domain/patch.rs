//! Patch selection types
//!
//! A staging run picks one of three diff strategies depending on the mode the
//! developer asked for and the shape of their unpushed history.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What kind of local work to stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchMode {
    /// Committed work that has not been pushed upstream
    Commit,
    /// Uncommitted edits in the working tree
    Local,
}

impl PatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchMode::Commit => "commit",
            PatchMode::Local => "local",
        }
    }
}

impl std::fmt::Display for PatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a mode string is neither `commit` nor `local`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMode(pub String);

impl std::fmt::Display for InvalidMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid patch mode '{}'", self.0)
    }
}

impl std::error::Error for InvalidMode {}

impl FromStr for PatchMode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commit" => Ok(PatchMode::Commit),
            "local" => Ok(PatchMode::Local),
            other => Err(InvalidMode(other.to_string())),
        }
    }
}

/// Span of unpushed commits, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRange {
    pub first_commit: String,
    /// `None` when exactly one commit is unpushed
    pub last_commit: Option<String>,
}

impl CommitRange {
    /// Build a range from the unpushed commits, ordered oldest to newest
    ///
    /// Returns `None` when there is nothing to stage.
    pub fn from_unpushed(commits: &[String]) -> Option<Self> {
        match commits {
            [] => None,
            [only] => Some(Self {
                first_commit: only.clone(),
                last_commit: None,
            }),
            [first, .., last] => Some(Self {
                first_commit: first.clone(),
                last_commit: Some(last.clone()),
            }),
        }
    }

    /// Diff strategy covering every commit in the range
    pub fn strategy(&self) -> DiffStrategy {
        match &self.last_commit {
            None => DiffStrategy::SingleCommit {
                commit: self.first_commit.clone(),
            },
            Some(last) => DiffStrategy::CommitSpan {
                first: self.first_commit.clone(),
                last: last.clone(),
            },
        }
    }
}

/// How the patch text is produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffStrategy {
    /// Show one commit as a self-contained patch
    SingleCommit { commit: String },
    /// Diff from the parent of `first` through `last`, inclusive
    CommitSpan { first: String, last: String },
    /// Working tree against an upstream branch, ignoring submodules
    WorkingTree { upstream: String },
}

impl std::fmt::Display for DiffStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffStrategy::SingleCommit { commit } => write!(f, "single commit {}", commit),
            DiffStrategy::CommitSpan { first, last } => write!(f, "commits {} through {}", first, last),
            DiffStrategy::WorkingTree { upstream } => write!(f, "working tree vs {}", upstream),
        }
    }
}

/// Materialized patch text plus the strategy that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchArtifact {
    pub strategy: DiffStrategy,
    pub text: String,
}

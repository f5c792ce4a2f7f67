//! Repository and branch tracking types

use serde::{Deserialize, Serialize};

/// Upstream name reported whenever the tracking ref points into `origin`
pub const DEFAULT_UPSTREAM: &str = "master";

const ORIGIN_MARKER: &str = "origin/";

/// Who is staging and from which repository
///
/// Derived once per run and never modified afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryIdentity {
    pub remote_url: String,
    pub repo_name: String,
    pub user_name: String,
    pub user_email: String,
}

impl RepositoryIdentity {
    /// Create an identity, deriving the repository name from the remote URL
    ///
    /// Trailing whitespace is dropped from the URL.
    pub fn new(
        remote_url: impl Into<String>,
        user_name: impl Into<String>,
        user_email: impl Into<String>,
    ) -> Self {
        let remote_url = remote_url.into().trim_end().to_string();
        let repo_name = repo_name_from_url(&remote_url);
        Self {
            remote_url,
            repo_name,
            user_name: user_name.into(),
            user_email: user_email.into(),
        }
    }
}

/// Extract the repository name from a remote URL
///
/// Takes the last segment after a `/` or `:` and strips any trailing `.git`
/// suffix and line endings, in whichever order they appear. Works for both
/// URL and scp-style remotes, including scp remotes with no path:
///
/// ```
/// use stagehand_core::domain::repository::repo_name_from_url;
///
/// assert_eq!(repo_name_from_url("git@host:org/my-repo.git\n"), "my-repo");
/// assert_eq!(repo_name_from_url("https://github.com/org/docs"), "docs");
/// assert_eq!(repo_name_from_url("git@host:docs.git"), "docs");
/// ```
pub fn repo_name_from_url(url: &str) -> String {
    let segment = url
        .trim_end()
        .rsplit(['/', ':'])
        .next()
        .unwrap_or_default();

    let mut name = segment;
    loop {
        let stripped = name.trim_end();
        let stripped = stripped.strip_suffix(".git").unwrap_or(stripped);
        if stripped == name {
            break;
        }
        name = stripped;
    }

    name.to_string()
}

/// Tracking state of the branch being staged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchState {
    pub local_branch_name: String,
    /// Tracking ref exactly as reported by git
    pub upstream_ref: String,
    pub resolved_upstream_name: String,
    pub remote_has_local_branch: bool,
}

impl BranchState {
    pub fn new(
        local_branch_name: impl Into<String>,
        upstream_ref: impl Into<String>,
        remote_has_local_branch: bool,
    ) -> Self {
        let upstream_ref = upstream_ref.into();
        let resolved_upstream_name = resolve_upstream_name(&upstream_ref);
        Self {
            local_branch_name: local_branch_name.into(),
            upstream_ref,
            resolved_upstream_name,
            remote_has_local_branch,
        }
    }

    /// Branch the staged job should target
    ///
    /// If the remote already has a branch with the local name, the job goes
    /// there directly. Otherwise it targets the resolved upstream.
    pub fn payload_branch_name(&self) -> &str {
        if self.remote_has_local_branch {
            &self.local_branch_name
        } else {
            &self.resolved_upstream_name
        }
    }
}

/// Map a raw tracking ref to the branch name reported in the job payload
///
/// Anything tracking `origin/...` is reported as [`DEFAULT_UPSTREAM`]; any
/// other ref is used verbatim after trimming.
pub fn resolve_upstream_name(upstream_ref: &str) -> String {
    let trimmed = upstream_ref.trim();
    if trimmed.contains(ORIGIN_MARKER) {
        DEFAULT_UPSTREAM.to_string()
    } else {
        trimmed.to_string()
    }
}

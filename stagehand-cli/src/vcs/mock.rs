use async_trait::async_trait;
use stagehand_core::domain::patch::DiffStrategy;
use std::sync::Mutex;

use super::{Result, Vcs, VcsError};

/// Test double for [`Vcs`] with canned answers and a call log
pub struct MockVcs {
    pub branch: String,
    pub remote_url: String,
    pub user_name: String,
    pub user_email: String,
    /// `None` means no upstream is configured
    pub upstream_ref: Option<String>,
    /// Whether `remotes/origin/<branch>` exists
    pub remote_has_branch: bool,
    /// Fail the remote branch check with a non-ref error
    pub remote_check_broken: bool,
    pub unpushed: Vec<String>,
    pub patch: Vec<u8>,
    pub diff_should_fail: bool,
    /// Every call as (method, argument)
    pub calls: Mutex<Vec<(String, String)>>,
}

impl Default for MockVcs {
    fn default() -> Self {
        Self {
            branch: "feature-x".to_string(),
            remote_url: "git@github.com:jane/docs.git\n".to_string(),
            user_name: "jane".to_string(),
            user_email: "jane@example.com".to_string(),
            upstream_ref: Some("origin/master\n".to_string()),
            remote_has_branch: false,
            remote_check_broken: false,
            unpushed: Vec::new(),
            patch: b"diff --git a/index.txt b/index.txt\n".to_vec(),
            diff_should_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockVcs {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, method: &str, arg: impl Into<String>) {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), arg.into()));
    }

    /// Strategies passed to `diff`, in call order
    pub fn diff_calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(method, _)| method == "diff")
            .map(|(_, arg)| arg.clone())
            .collect()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|(m, _)| m == method)
    }
}

#[async_trait]
impl Vcs for MockVcs {
    async fn current_branch(&self) -> Result<String> {
        self.record("current_branch", "");
        Ok(self.branch.clone())
    }

    async fn remote_url(&self) -> Result<String> {
        self.record("remote_url", "");
        Ok(self.remote_url.clone())
    }

    async fn user_name(&self) -> Result<String> {
        self.record("user_name", "");
        Ok(self.user_name.clone())
    }

    async fn user_email(&self) -> Result<String> {
        self.record("user_email", "");
        Ok(self.user_email.clone())
    }

    async fn upstream_ref(&self, branch: &str) -> Result<String> {
        self.record("upstream_ref", branch);
        self.upstream_ref
            .clone()
            .ok_or_else(|| VcsError::NoUpstream(branch.to_string()))
    }

    async fn diff_against_remote_branch(&self, branch: &str) -> Result<()> {
        self.record("diff_against_remote_branch", branch);
        if self.remote_check_broken {
            return Err(VcsError::CommandFailed {
                command: "diff".to_string(),
                code: Some(1),
                stderr: "mock: broken".to_string(),
            });
        }
        if self.remote_has_branch {
            Ok(())
        } else {
            Err(VcsError::MissingRef(format!("remotes/origin/{}", branch)))
        }
    }

    async fn unpushed_commits(&self) -> Result<Vec<String>> {
        self.record("unpushed_commits", "");
        Ok(self.unpushed.clone())
    }

    async fn diff(&self, strategy: &DiffStrategy) -> Result<Vec<u8>> {
        self.record("diff", strategy.to_string());
        if self.diff_should_fail {
            return Err(VcsError::CommandFailed {
                command: "diff".to_string(),
                code: Some(128),
                stderr: "mock: bad revision".to_string(),
            });
        }
        Ok(self.patch.clone())
    }
}

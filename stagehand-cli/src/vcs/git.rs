//! `git` subprocess implementation of [`Vcs`]

use async_trait::async_trait;
use stagehand_core::domain::patch::DiffStrategy;
use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use super::{Result, Vcs, VcsError};

/// Exit status git uses for fatal errors such as unknown refs
const GIT_FATAL: i32 = 128;

/// Runs the `git` binary in a working tree
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_dir: PathBuf,
    timeout: Duration,
}

impl GitCli {
    pub fn new(repo_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            timeout,
        }
    }

    /// Run git and return its raw output whatever the exit status
    async fn run(&self, args: &[&str]) -> Result<Output> {
        let command = args.join(" ");
        debug!("Running git {}", command);

        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(&self.repo_dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true);

        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(output) => Ok(output?),
            Err(_) => Err(VcsError::Timeout {
                command,
                timeout: self.timeout,
            }),
        }
    }

    /// Run git and return stdout, failing on a non-zero exit
    async fn run_ok(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = self.run(args).await?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(failure(args, &output))
        }
    }

    async fn run_text(&self, args: &[&str]) -> Result<String> {
        let stdout = self.run_ok(args).await?;
        Ok(String::from_utf8(stdout)?.trim_end().to_string())
    }
}

#[async_trait]
impl Vcs for GitCli {
    async fn current_branch(&self) -> Result<String> {
        self.run_text(&["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    async fn remote_url(&self) -> Result<String> {
        self.run_text(&["config", "--get", "remote.origin.url"]).await
    }

    async fn user_name(&self) -> Result<String> {
        self.run_text(&["config", "--global", "user.name"]).await
    }

    async fn user_email(&self) -> Result<String> {
        self.run_text(&["config", "--global", "user.email"]).await
    }

    async fn upstream_ref(&self, branch: &str) -> Result<String> {
        let spec = format!("{}@{{upstream}}", branch);
        let args = ["rev-parse", "--abbrev-ref", "--symbolic-full-name", &spec];
        let output = self.run(&args).await?;

        if output.status.code() == Some(GIT_FATAL) {
            return Err(VcsError::NoUpstream(branch.to_string()));
        }
        if !output.status.success() {
            return Err(failure(&args, &output));
        }

        Ok(String::from_utf8(output.stdout)?)
    }

    async fn diff_against_remote_branch(&self, branch: &str) -> Result<()> {
        let remote = format!("remotes/origin/{}", branch);
        let args = ["diff", "--name-only", branch, &remote, "--"];
        let output = self.run(&args).await?;

        if output.status.code() == Some(GIT_FATAL) {
            return Err(VcsError::MissingRef(remote));
        }
        if !output.status.success() {
            return Err(failure(&args, &output));
        }

        Ok(())
    }

    async fn unpushed_commits(&self) -> Result<Vec<String>> {
        let stdout = self.run_ok(&["cherry"]).await?;
        Ok(parse_cherry(&String::from_utf8(stdout)?))
    }

    async fn diff(&self, strategy: &DiffStrategy) -> Result<Vec<u8>> {
        let args = diff_args(strategy);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run_ok(&args).await
    }
}

/// Command line for a diff strategy
fn diff_args(strategy: &DiffStrategy) -> Vec<String> {
    match strategy {
        DiffStrategy::SingleCommit { commit } => {
            vec!["show".into(), "--no-color".into(), commit.clone()]
        }
        DiffStrategy::CommitSpan { first, last } => vec![
            "diff".into(),
            "--no-color".into(),
            format!("{}^...{}", first, last),
        ],
        DiffStrategy::WorkingTree { upstream } => vec![
            "diff".into(),
            "--no-color".into(),
            "--ignore-submodules".into(),
            upstream.clone(),
        ],
    }
}

/// Commit ids from `git cherry` output
///
/// Only `+` lines are unpushed; `-` lines already have an equivalent change
/// upstream.
fn parse_cherry(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.strip_prefix("+ "))
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

fn failure(args: &[&str], output: &Output) -> VcsError {
    VcsError::CommandFailed {
        command: args.join(" "),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

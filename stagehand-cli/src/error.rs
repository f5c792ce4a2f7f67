//! Error types for a staging run
//!
//! Every fatal condition maps to its own process exit code so scripts can
//! tell a usage mistake from a git failure or an unreachable queue.

use stagehand_core::domain::patch::InvalidMode;
use stagehand_queue::QueueError;
use thiserror::Error;

use crate::vcs::VcsError;

/// Exit code for invocation errors
pub const EXIT_USAGE: u8 = 2;
/// Exit code for configuration errors
pub const EXIT_CONFIG: u8 = 3;
/// Exit code for git resolution errors
pub const EXIT_VCS: u8 = 4;
/// Exit code for patch materialization errors
pub const EXIT_PATCH: u8 = 5;
/// Exit code for job queue errors
pub const EXIT_ENQUEUE: u8 = 6;

/// Configuration errors, raised before any git or network action
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value '{value}' for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Fatal errors of a staging run
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("a patch mode is required")]
    MissingMode,

    #[error(transparent)]
    InvalidMode(#[from] InvalidMode),

    #[error("branch '{branch}' has no upstream configured")]
    NoUpstreamConfigured { branch: String },

    #[error("git query failed: {0}")]
    Vcs(#[source] VcsError),

    #[error("failed to materialize patch: {0}")]
    Patch(#[source] VcsError),

    #[error("failed to enqueue staging job: {0}")]
    Enqueue(#[from] QueueError),
}

impl From<VcsError> for StageError {
    fn from(err: VcsError) -> Self {
        match err {
            VcsError::NoUpstream(branch) => StageError::NoUpstreamConfigured { branch },
            other => StageError::Vcs(other),
        }
    }
}

impl StageError {
    pub fn exit_code(&self) -> u8 {
        match self {
            StageError::MissingMode | StageError::InvalidMode(_) => EXIT_USAGE,
            StageError::Config(_) => EXIT_CONFIG,
            StageError::NoUpstreamConfigured { .. } | StageError::Vcs(_) => EXIT_VCS,
            StageError::Patch(_) => EXIT_PATCH,
            StageError::Enqueue(_) => EXIT_ENQUEUE,
        }
    }

    /// Whether the command line itself was wrong
    pub fn is_usage_error(&self) -> bool {
        self.exit_code() == EXIT_USAGE
    }

    /// What the developer should do next, if there is a known fix
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            StageError::MissingMode => Some(
                "You need a patch flag (\"commit\" or \"local\") in your make command",
            ),
            StageError::InvalidMode(_) => Some(
                "Use \"commit\" to stage a build from the committed work you have locally or use \"local\" to stage a build from the uncommitted work you have locally",
            ),
            StageError::NoUpstreamConfigured { .. } => Some(
                "Set an upstream for your local branch with: git branch -u <upstream-branch-name>",
            ),
            StageError::Config(ConfigError::Missing(_)) => {
                Some("Export the missing variables or add them to your staging env file")
            }
            StageError::Enqueue(e) if e.is_connection_error() => Some(
                "Your job was not queued: the job store is unreachable. Check DB_HOST and DB_PORT",
            ),
            StageError::Enqueue(_) => {
                Some("Your job was not queued. Check the job store settings and try again")
            }
            _ => None,
        }
    }
}

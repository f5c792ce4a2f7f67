//! Staging run
//!
//! Sequences a run: identity, branch, upstream, patch, payload, enqueue.
//! Any fatal error stops the run before the queue is touched. The patch only
//! ever lives in memory and is dropped when the run ends, whatever the
//! outcome.

use stagehand_core::domain::job::NEW_HEAD_SENTINEL;
use stagehand_core::domain::patch::{DiffStrategy, PatchMode};
use stagehand_core::domain::repository::RepositoryIdentity;
use stagehand_core::dto::job::{EnqueueJob, EnqueueOutcome};
use stagehand_core::payload::build_payload;
use stagehand_queue::JobQueue;
use tracing::info;

use crate::error::StageError;
use crate::service::patch::{Selection, select_patch};
use crate::service::upstream::resolve_upstream;
use crate::vcs::Vcs;

/// Input of a staging run
#[derive(Debug, Clone)]
pub struct StageRequest {
    pub mode: PatchMode,
    /// Build size hint passed through from the make target
    pub build_size: Option<String>,
}

/// How a staging run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Commit mode found no unpushed commits; the queue was not contacted
    NothingToStage { mode: PatchMode },
    /// A job was submitted
    Submitted {
        repo_name: String,
        branch_name: String,
        strategy: DiffStrategy,
        outcome: EnqueueOutcome,
    },
}

/// Stage the developer's pending work as a queued job
pub async fn run(
    vcs: &dyn Vcs,
    queue: &dyn JobQueue,
    req: &StageRequest,
) -> Result<StageOutcome, StageError> {
    info!(
        "Staging {} work (build size: {})",
        req.mode,
        req.build_size.as_deref().unwrap_or("default")
    );

    let identity = resolve_identity(vcs).await?;
    let branch = vcs.current_branch().await?;
    let state = resolve_upstream(vcs, &branch).await?;
    let branch_name = state.payload_branch_name().to_string();

    let artifact = match select_patch(vcs, req.mode, &state.resolved_upstream_name).await? {
        Selection::Patch(artifact) => artifact,
        Selection::NothingToStage => {
            info!("Nothing to stage in {} mode", req.mode);
            return Ok(StageOutcome::NothingToStage { mode: req.mode });
        }
    };

    let payload = build_payload(&identity, &branch_name, &artifact.text, NEW_HEAD_SENTINEL);
    let job = EnqueueJob::for_identity(payload, &identity);

    info!("Enqueueing \"{}\" for branch {}", job.title, branch_name);
    let outcome = queue.enqueue(&job).await?;

    Ok(StageOutcome::Submitted {
        repo_name: identity.repo_name,
        branch_name,
        strategy: artifact.strategy,
        outcome,
    })
}

async fn resolve_identity(vcs: &dyn Vcs) -> Result<RepositoryIdentity, StageError> {
    let user_name = vcs.user_name().await?;
    let user_email = vcs.user_email().await?;
    let remote_url = vcs.remote_url().await?;

    let identity = RepositoryIdentity::new(remote_url, user_name, user_email);
    info!(
        "Staging {} as {} <{}>",
        identity.repo_name, identity.user_name, identity.user_email
    );

    Ok(identity)
}

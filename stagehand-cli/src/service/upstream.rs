//! Upstream resolution
//!
//! Works out which branch the staged job should report and whether the remote
//! already carries the developer's branch under the same name.

use stagehand_core::domain::repository::BranchState;
use tracing::{debug, info};

use crate::vcs::{Result, Vcs, VcsError};

/// Resolve the tracking state of `branch`
///
/// Fails with [`VcsError::NoUpstream`] if the branch tracks nothing. A missing
/// `remotes/origin/<branch>` is not an error: it only means the remote does
/// not have the branch yet.
pub async fn resolve_upstream(vcs: &dyn Vcs, branch: &str) -> Result<BranchState> {
    let upstream_ref = vcs.upstream_ref(branch).await?;
    if upstream_ref.trim().is_empty() {
        return Err(VcsError::NoUpstream(branch.to_string()));
    }

    let remote_has_local_branch = match vcs.diff_against_remote_branch(branch).await {
        Ok(()) => true,
        Err(VcsError::MissingRef(remote)) => {
            debug!("{} does not exist", remote);
            false
        }
        Err(e) => return Err(e),
    };

    let state = BranchState::new(branch, upstream_ref.trim_end(), remote_has_local_branch);
    info!(
        "Branch {} tracks {} (reported as {}), remote has branch: {}",
        state.local_branch_name,
        state.upstream_ref,
        state.resolved_upstream_name,
        state.remote_has_local_branch
    );

    Ok(state)
}

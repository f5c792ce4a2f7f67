//! Payload builder
//!
//! Assembles the job description sent to the queue from values resolved
//! earlier in the run.

use crate::domain::job::{JOB_ACTION, JOB_SOURCE, JOB_TYPE, JobPayload};
use crate::domain::repository::RepositoryIdentity;

/// Build the payload for a staged job
///
/// `branch_name` is the branch the job targets, normally
/// [`BranchState::payload_branch_name`](crate::domain::repository::BranchState::payload_branch_name).
pub fn build_payload(
    identity: &RepositoryIdentity,
    branch_name: &str,
    patch: &str,
    head_sentinel: &str,
) -> JobPayload {
    JobPayload {
        job_type: JOB_TYPE.to_string(),
        source: JOB_SOURCE.to_string(),
        action: JOB_ACTION.to_string(),
        repo_name: identity.repo_name.clone(),
        branch_name: branch_name.to_string(),
        is_fork: true,
        private: false,
        is_xlarge: false,
        repo_owner: identity.user_name.clone(),
        url: identity.remote_url.clone(),
        new_head: head_sentinel.to_string(),
        patch: patch.to_string(),
    }
}

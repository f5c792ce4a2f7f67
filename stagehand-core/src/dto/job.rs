//! Job queue DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::job::{JobPayload, job_title};
use crate::domain::repository::RepositoryIdentity;

/// Request to put a staged job on the queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueJob {
    pub payload: JobPayload,
    pub title: String,
    pub user_name: String,
    pub user_email: String,
}

impl EnqueueJob {
    /// Request for `payload` submitted by the owner of `identity`
    pub fn for_identity(payload: JobPayload, identity: &RepositoryIdentity) -> Self {
        Self {
            payload,
            title: job_title(&identity.user_name, &identity.repo_name),
            user_name: identity.user_name.clone(),
            user_email: identity.user_email.clone(),
        }
    }
}

/// Result of an enqueue attempt
///
/// Both variants are successful outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnqueueOutcome {
    /// A new record was created with this id
    Inserted(Uuid),
    /// An unfinished job with an identical payload is already queued
    AlreadyExists,
}

impl EnqueueOutcome {
    pub fn inserted_id(&self) -> Option<Uuid> {
        match self {
            EnqueueOutcome::Inserted(id) => Some(*id),
            EnqueueOutcome::AlreadyExists => None,
        }
    }
}

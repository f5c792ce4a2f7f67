//! In-memory job queue
//!
//! Keeps records in a mutex-guarded list. The duplicate check and the insert
//! happen under one lock acquisition, matching the atomicity of the shared
//! store.

use async_trait::async_trait;
use stagehand_core::domain::job::{JobRecord, JobStatus};
use stagehand_core::dto::job::{EnqueueJob, EnqueueOutcome};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::JobQueue;
use crate::error::Result;

/// Process-local job queue
#[derive(Debug, Default)]
pub struct MemoryJobQueue {
    records: Mutex<Vec<JobRecord>>,
}

impl MemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record, oldest first
    pub async fn records(&self) -> Vec<JobRecord> {
        self.records.lock().await.clone()
    }

    /// Move a record to another status, as the build system would
    ///
    /// Returns `false` if no record has this id.
    pub async fn set_status(&self, id: Uuid, status: JobStatus) -> bool {
        let mut records = self.records.lock().await;
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.status = status;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn enqueue(&self, req: &EnqueueJob) -> Result<EnqueueOutcome> {
        let mut records = self.records.lock().await;

        let duplicate = records
            .iter()
            .any(|r| !r.status.is_finished() && r.payload == req.payload);
        if duplicate {
            tracing::debug!("Identical unfinished job already queued");
            return Ok(EnqueueOutcome::AlreadyExists);
        }

        let id = Uuid::new_v4();
        records.push(JobRecord::queued(
            id,
            req.title.clone(),
            req.user_name.clone(),
            req.user_email.clone(),
            req.payload.clone(),
            chrono::Utc::now(),
        ));
        tracing::debug!("Job {} enqueued in memory", id);

        Ok(EnqueueOutcome::Inserted(id))
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobRecord>> {
        let records = self.records.lock().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }
}

//! Stagehand Job Queue
//!
//! Persistence for staged build jobs. The queue offers one write operation,
//! an atomic insert-if-absent: a job is only created when no unfinished job
//! with an identical payload exists.
//!
//! Two implementations are provided:
//! - [`PgJobQueue`]: the shared Postgres-backed queue
//! - [`MemoryJobQueue`]: a process-local queue for tests and dry runs
//!
//! # Example
//!
//! ```no_run
//! use stagehand_queue::{JobQueue, PgJobQueue, StoreSettings};
//! # use stagehand_core::dto::job::EnqueueJob;
//! # async fn example(req: EnqueueJob, settings: StoreSettings) -> stagehand_queue::Result<()> {
//! let queue = PgJobQueue::connect(&settings).await?;
//! let outcome = queue.enqueue(&req).await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod error;
mod memory;
mod postgres;
pub mod repository;

pub use db::{StoreSettings, TableName};
pub use error::{QueueError, Result};
pub use memory::MemoryJobQueue;
pub use postgres::{LazyPgJobQueue, PgJobQueue};

use async_trait::async_trait;
use stagehand_core::domain::job::JobRecord;
use stagehand_core::dto::job::{EnqueueJob, EnqueueOutcome};
use uuid::Uuid;

/// Job queue abstraction
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a job unless an identical unfinished one exists
    ///
    /// Identical means the whole payload compares equal and the existing
    /// record is `inQueue` or `inProgress`. The check and the insert happen
    /// atomically, so concurrent callers with the same payload produce at
    /// most one unfinished record.
    async fn enqueue(&self, req: &EnqueueJob) -> Result<EnqueueOutcome>;

    /// Fetch a job record by id
    async fn get(&self, id: Uuid) -> Result<Option<JobRecord>>;
}

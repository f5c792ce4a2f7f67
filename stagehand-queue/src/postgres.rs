//! Postgres-backed job queue

use async_trait::async_trait;
use sqlx::PgPool;
use stagehand_core::domain::job::JobRecord;
use stagehand_core::dto::job::{EnqueueJob, EnqueueOutcome};
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use crate::JobQueue;
use crate::db::{self, StoreSettings, TableName};
use crate::error::{QueueError, Result};
use crate::repository::job_repository;

/// Job queue stored in a shared Postgres table
#[derive(Debug, Clone)]
pub struct PgJobQueue {
    pool: PgPool,
    table: TableName,
    timeout: Duration,
}

impl PgJobQueue {
    /// Wrap an existing pool; the table must already exist
    pub fn new(pool: PgPool, table: TableName, timeout: Duration) -> Self {
        Self {
            pool,
            table,
            timeout,
        }
    }

    /// Connect to the store, creating the jobs table if it is missing
    pub async fn connect(settings: &StoreSettings) -> Result<Self> {
        tracing::info!(
            "Connecting to job store {}:{}/{}",
            settings.host,
            settings.port,
            settings.database
        );

        let pool = db::create_pool(settings).await?;
        let queue = Self::new(pool, settings.table.clone(), settings.timeout);
        queue
            .bounded(db::ensure_table(&queue.pool, &queue.table))
            .await?;

        Ok(queue)
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    async fn bounded<T, E>(&self, fut: impl Future<Output = std::result::Result<T, E>>) -> Result<T>
    where
        QueueError: From<E>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(QueueError::from),
            Err(_) => Err(QueueError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl JobQueue for PgJobQueue {
    async fn enqueue(&self, req: &EnqueueJob) -> Result<EnqueueOutcome> {
        let inserted = self
            .bounded(job_repository::insert_if_absent(&self.pool, &self.table, req))
            .await?;

        match inserted {
            Some(id) => {
                tracing::info!("Job {} enqueued in {}", id, self.table);
                Ok(EnqueueOutcome::Inserted(id))
            }
            None => {
                tracing::info!("Identical unfinished job already queued in {}", self.table);
                Ok(EnqueueOutcome::AlreadyExists)
            }
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobRecord>> {
        self.bounded(job_repository::find_by_id(&self.pool, &self.table, id))
            .await
    }
}

/// Postgres queue that connects on first use
///
/// Lets a caller hold a queue handle without touching the store until a job
/// is actually submitted.
#[derive(Debug)]
pub struct LazyPgJobQueue {
    settings: StoreSettings,
    inner: tokio::sync::OnceCell<PgJobQueue>,
}

impl LazyPgJobQueue {
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings,
            inner: tokio::sync::OnceCell::new(),
        }
    }

    async fn queue(&self) -> Result<&PgJobQueue> {
        self.inner
            .get_or_try_init(|| PgJobQueue::connect(&self.settings))
            .await
    }
}

#[async_trait]
impl JobQueue for LazyPgJobQueue {
    async fn enqueue(&self, req: &EnqueueJob) -> Result<EnqueueOutcome> {
        self.queue().await?.enqueue(req).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobRecord>> {
        self.queue().await?.get(id).await
    }
}

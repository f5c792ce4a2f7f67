//! Job Repository
//!
//! SQL for the jobs table. The table name comes from configuration and is
//! validated by [`TableName`] before it reaches any statement.

use sqlx::PgPool;
use stagehand_core::domain::job::{DEFAULT_PRIORITY, JobPayload, JobRecord, JobStatus};
use stagehand_core::dto::job::EnqueueJob;
use uuid::Uuid;

use crate::db::{TableName, unfinished_status_list};
use crate::error::{QueueError, Result};

/// Insert a queued job unless an unfinished job with the same payload exists
///
/// Returns the new id, or `None` if a duplicate was found. A transaction
/// scoped advisory lock keyed on the payload serializes concurrent inserts of
/// the same payload, and the insert itself is a single conditional statement.
pub async fn insert_if_absent(
    pool: &PgPool,
    table: &TableName,
    req: &EnqueueJob,
) -> Result<Option<Uuid>> {
    let payload = serde_json::to_value(&req.payload)?;

    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::jsonb::text, 0))")
        .bind(&payload)
        .execute(&mut *tx)
        .await?;

    let id = sqlx::query_scalar::<_, Uuid>(&format!(
        r#"
        INSERT INTO {table} (id, title, user_name, email, status, created_time,
                             priority, num_failures, failures, payload, logs)
        SELECT $1, $2, $3, $4, $5, now(), $6, 0, '[]'::jsonb, $7, '{{}}'::jsonb
        WHERE NOT EXISTS (
            SELECT 1 FROM {table}
            WHERE md5(payload::text) = md5($7::jsonb::text)
              AND payload = $7
              AND status IN ({unfinished})
        )
        RETURNING id
        "#,
        unfinished = unfinished_status_list()
    ))
    .bind(Uuid::new_v4())
    .bind(&req.title)
    .bind(&req.user_name)
    .bind(&req.user_email)
    .bind(JobStatus::InQueue.as_str())
    .bind(DEFAULT_PRIORITY)
    .bind(&payload)
    .fetch_optional(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(id)
}

/// Find a job by ID
pub async fn find_by_id(pool: &PgPool, table: &TableName, id: Uuid) -> Result<Option<JobRecord>> {
    let row = sqlx::query_as::<_, JobRow>(&format!(
        r#"
        SELECT id, title, user_name, email, status, created_time, start_time,
               end_time, priority, num_failures, failures, result, payload, logs
        FROM {table}
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(JobRecord::try_from).transpose()
}

/// Move a job to another status
///
/// Staging never calls this; the build system owns job progress. It exists
/// for operators and for exercising the dedup window end to end.
pub async fn update_status(
    pool: &PgPool,
    table: &TableName,
    id: Uuid,
    status: JobStatus,
) -> Result<bool> {
    let result = sqlx::query(&format!("UPDATE {table} SET status = $1 WHERE id = $2"))
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a stored status, rejecting values the build system never writes
fn string_to_status(s: &str) -> Result<JobStatus> {
    Ok(serde_json::from_value(serde_json::Value::String(s.to_string()))?)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    user_name: String,
    email: String,
    status: String,
    created_time: chrono::DateTime<chrono::Utc>,
    start_time: Option<chrono::DateTime<chrono::Utc>>,
    end_time: Option<chrono::DateTime<chrono::Utc>>,
    priority: i32,
    num_failures: i32,
    failures: serde_json::Value,
    result: Option<serde_json::Value>,
    payload: serde_json::Value,
    logs: serde_json::Value,
}

impl TryFrom<JobRow> for JobRecord {
    type Error = QueueError;

    fn try_from(row: JobRow) -> Result<Self> {
        let payload: JobPayload = serde_json::from_value(row.payload)?;
        let failures = serde_json::from_value(row.failures)?;
        let logs = serde_json::from_value(row.logs)?;

        Ok(JobRecord {
            id: row.id,
            title: row.title,
            user: row.user_name,
            email: row.email,
            status: string_to_status(&row.status)?,
            created_time: row.created_time,
            start_time: row.start_time,
            end_time: row.end_time,
            priority: row.priority,
            num_failures: row.num_failures,
            failures,
            result: row.result,
            payload,
            logs,
        })
    }
}

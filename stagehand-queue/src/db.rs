use sqlx::{
    PgConnection, PgExecutor, PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use stagehand_core::domain::job::JobStatus;
use std::time::Duration;

use crate::error::{QueueError, Result};

/// Connection settings for the shared job store
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub table: TableName,
    /// Bound on acquiring a connection and on each queue operation
    pub timeout: Duration,
}

impl StoreSettings {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
            .application_name("stagehand")
    }
}

/// Name of the jobs table
///
/// The name is interpolated into SQL, so only plain identifiers are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    pub fn parse(name: &str) -> Result<Self> {
        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

        if valid_start && valid_rest && name.len() <= 63 {
            Ok(Self(name.to_string()))
        } else {
            Err(QueueError::InvalidTableName(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// SQL list of the unfinished statuses, e.g. `'inQueue', 'inProgress'`
///
/// The partial index and the duplicate lookup must use the same predicate
/// text for the planner to match them.
pub(crate) fn unfinished_status_list() -> String {
    JobStatus::UNFINISHED
        .iter()
        .map(|status| format!("'{}'", status.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn create_pool(settings: &StoreSettings) -> std::result::Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(settings.timeout)
        .connect_with(settings.connect_options())
        .await
}

/// Check whether the jobs table exists, without touching the schema
pub async fn table_exists<'e, E>(executor: E, table: &TableName) -> std::result::Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>("SELECT to_regclass($1) IS NOT NULL")
        .bind(table.as_str())
        .fetch_one(executor)
        .await
}

/// Create the jobs table on first use
///
/// Returns `true` if the table was created. When the table already exists no
/// DDL is issued, so a role with only `SELECT` and `INSERT` on the table can
/// enqueue. Concurrent first runs serialize on an advisory lock keyed on the
/// table name.
pub async fn ensure_table(pool: &PgPool, table: &TableName) -> std::result::Result<bool, sqlx::Error> {
    if table_exists(pool, table).await? {
        tracing::debug!("Job table {} already exists", table);
        return Ok(false);
    }

    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(format!("stagehand:{}", table))
        .execute(&mut *tx)
        .await?;

    if table_exists(&mut *tx, table).await? {
        tx.commit().await?;
        return Ok(false);
    }

    run_migrations(&mut *tx, table).await?;
    tx.commit().await?;

    tracing::info!("Created job table {}", table);
    Ok(true)
}

pub async fn run_migrations(conn: &mut PgConnection, table: &TableName) -> std::result::Result<(), sqlx::Error> {
    // Create jobs table
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id UUID PRIMARY KEY,
            title TEXT NOT NULL,
            user_name TEXT NOT NULL,
            email TEXT NOT NULL,
            status VARCHAR(20) NOT NULL,
            created_time TIMESTAMPTZ NOT NULL,
            start_time TIMESTAMPTZ,
            end_time TIMESTAMPTZ,
            priority INTEGER NOT NULL DEFAULT 1,
            num_failures INTEGER NOT NULL DEFAULT 0,
            failures JSONB NOT NULL DEFAULT '[]',
            result JSONB,
            payload JSONB NOT NULL,
            logs JSONB NOT NULL DEFAULT '{{}}'
        )
        "#
    ))
    .execute(&mut *conn)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_status ON {table}(status)"
    ))
    .execute(&mut *conn)
    .await?;

    // Narrows the duplicate lookup before the full JSONB comparison
    sqlx::query(&format!(
        r#"
        CREATE INDEX IF NOT EXISTS idx_{table}_unfinished_payload
        ON {table} (md5(payload::text))
        WHERE status IN ({unfinished})
        "#,
        unfinished = unfinished_status_list()
    ))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

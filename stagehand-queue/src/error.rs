//! Error types for the job queue

use std::time::Duration;
use thiserror::Error;

/// Result type alias for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;

/// Errors that can occur while talking to the job queue
#[derive(Debug, Error)]
pub enum QueueError {
    /// Connection or query failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Payload could not be converted to JSON
    #[error("Failed to serialize job: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configured table name is not a plain SQL identifier
    #[error("Invalid job table name '{0}': use letters, digits and underscores only")]
    InvalidTableName(String),

    /// The store did not answer in time
    #[error("Job queue did not respond within {0:?}")]
    Timeout(Duration),
}

impl QueueError {
    /// Check if the failure happened before reaching the store
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_)
                | Self::Database(sqlx::Error::PoolTimedOut)
                | Self::Database(sqlx::Error::Io(_))
                | Self::Database(sqlx::Error::Tls(_))
        )
    }
}

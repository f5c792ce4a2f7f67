//! Job domain types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Job type tag understood by the build system
pub const JOB_TYPE: &str = "githubPush";

/// Event source tag
pub const JOB_SOURCE: &str = "github";

/// Event action tag
pub const JOB_ACTION: &str = "push";

/// Sentinel stored in `newHead`; staged patches have no pushed head commit
pub const NEW_HEAD_SENTINEL: &str = "newHead";

/// Priority given to every staged job
pub const DEFAULT_PRIORITY: i32 = 1;

/// Description of the work a staged build should perform
///
/// The whole payload is the deduplication key in the queue, so two payloads
/// compare equal only if every field matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPayload {
    pub job_type: String,
    pub source: String,
    pub action: String,
    pub repo_name: String,
    pub branch_name: String,
    pub is_fork: bool,
    pub private: bool,
    pub is_xlarge: bool,
    pub repo_owner: String,
    pub url: String,
    pub new_head: String,
    pub patch: String,
}

/// Queue-side job record
///
/// Owned by the queue store. Staging only ever creates the initial
/// [`JobStatus::InQueue`] state via [`JobRecord::queued`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: Uuid,
    pub title: String,
    pub user: String,
    pub email: String,
    pub status: JobStatus,
    pub created_time: chrono::DateTime<chrono::Utc>,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub priority: i32,
    pub num_failures: i32,
    pub failures: Vec<serde_json::Value>,
    pub result: Option<serde_json::Value>,
    pub payload: JobPayload,
    pub logs: HashMap<String, serde_json::Value>,
}

impl JobRecord {
    /// Build the record for a freshly enqueued job
    pub fn queued(
        id: Uuid,
        title: impl Into<String>,
        user: impl Into<String>,
        email: impl Into<String>,
        payload: JobPayload,
        created_time: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            user: user.into(),
            email: email.into(),
            status: JobStatus::InQueue,
            created_time,
            start_time: None,
            end_time: None,
            priority: DEFAULT_PRIORITY,
            num_failures: 0,
            failures: Vec::new(),
            result: None,
            payload,
            logs: HashMap::new(),
        }
    }
}

/// Job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    InQueue,
    InProgress,
    Succeeded,
    Failed,
}

impl JobStatus {
    /// Statuses that still block an identical payload from being enqueued
    pub const UNFINISHED: [JobStatus; 2] = [JobStatus::InQueue, JobStatus::InProgress];

    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::InQueue => "inQueue",
            JobStatus::InProgress => "inProgress",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        !Self::UNFINISHED.contains(self)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Title shown for a staged job in the build system
pub fn job_title(user_name: &str, repo_name: &str) -> String {
    format!("Github Push: {}/{}", user_name, repo_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> JobPayload {
        JobPayload {
            job_type: JOB_TYPE.to_string(),
            source: JOB_SOURCE.to_string(),
            action: JOB_ACTION.to_string(),
            repo_name: "docs".to_string(),
            branch_name: "master".to_string(),
            is_fork: true,
            private: false,
            is_xlarge: false,
            repo_owner: "jane".to_string(),
            url: "git@github.com:jane/docs.git".to_string(),
            new_head: NEW_HEAD_SENTINEL.to_string(),
            patch: "diff --git a/x b/x\n".to_string(),
        }
    }

    #[test]
    fn test_payload_serializes_with_camel_case_fields() {
        let value = serde_json::to_value(sample_payload()).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "action",
                "branchName",
                "isFork",
                "isXlarge",
                "jobType",
                "newHead",
                "patch",
                "private",
                "repoName",
                "repoOwner",
                "source",
                "url",
            ]
        );
        assert_eq!(object["jobType"], "githubPush");
        assert_eq!(object["isFork"], true);
    }

    #[test]
    fn test_queued_record_initial_state() {
        let now = chrono::Utc::now();
        let record = JobRecord::queued(
            Uuid::new_v4(),
            job_title("jane", "docs"),
            "jane",
            "jane@example.com",
            sample_payload(),
            now,
        );

        assert_eq!(record.title, "Github Push: jane/docs");
        assert_eq!(record.status, JobStatus::InQueue);
        assert_eq!(record.priority, 1);
        assert_eq!(record.num_failures, 0);
        assert!(record.failures.is_empty());
        assert!(record.start_time.is_none());
        assert!(record.end_time.is_none());
        assert!(record.result.is_none());
        assert!(record.logs.is_empty());
        assert_eq!(record.created_time, now);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&JobStatus::InQueue).unwrap(),
            "\"inQueue\""
        );
        assert_eq!(
            serde_json::to_string(&JobStatus::InProgress).unwrap(),
            "\"inProgress\""
        );
        assert_eq!(JobStatus::Succeeded.as_str(), "succeeded");
        assert_eq!(JobStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_finished_statuses() {
        assert!(!JobStatus::InQueue.is_finished());
        assert!(!JobStatus::InProgress.is_finished());
        assert!(JobStatus::Succeeded.is_finished());
        assert!(JobStatus::Failed.is_finished());
    }
}

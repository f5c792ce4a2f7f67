use std::sync::Arc;

use stagehand_core::domain::job::{JobStatus, NEW_HEAD_SENTINEL};
use stagehand_core::domain::repository::RepositoryIdentity;
use stagehand_core::dto::job::{EnqueueJob, EnqueueOutcome};
use stagehand_core::payload::build_payload;
use stagehand_queue::{JobQueue, MemoryJobQueue};

fn request(patch: &str) -> EnqueueJob {
    let identity =
        RepositoryIdentity::new("git@github.com:jane/docs.git", "jane", "jane@example.com");
    let payload = build_payload(&identity, "master", patch, NEW_HEAD_SENTINEL);
    EnqueueJob::for_identity(payload, &identity)
}

#[tokio::test]
async fn test_duplicate_while_queued_is_reported() {
    let queue = MemoryJobQueue::new();
    let req = request("diff --git a/a b/a\n");

    let first = queue.enqueue(&req).await.unwrap();
    let second = queue.enqueue(&req).await.unwrap();

    assert!(matches!(first, EnqueueOutcome::Inserted(_)));
    assert_eq!(second, EnqueueOutcome::AlreadyExists);
    assert_eq!(queue.records().await.len(), 1);
}

#[tokio::test]
async fn test_duplicate_while_in_progress_is_reported() {
    let queue = MemoryJobQueue::new();
    let req = request("p");

    let id = queue.enqueue(&req).await.unwrap().inserted_id().unwrap();
    assert!(queue.set_status(id, JobStatus::InProgress).await);

    assert_eq!(
        queue.enqueue(&req).await.unwrap(),
        EnqueueOutcome::AlreadyExists
    );
}

#[tokio::test]
async fn test_finished_jobs_do_not_block_resubmission() {
    for finished in [JobStatus::Succeeded, JobStatus::Failed] {
        let queue = MemoryJobQueue::new();
        let req = request("p");

        let first = queue.enqueue(&req).await.unwrap().inserted_id().unwrap();
        assert_eq!(
            queue.enqueue(&req).await.unwrap(),
            EnqueueOutcome::AlreadyExists
        );

        queue.set_status(first, finished).await;

        let third = queue.enqueue(&req).await.unwrap();
        let third_id = third.inserted_id().expect("resubmission should insert");
        assert_ne!(third_id, first);
        assert_eq!(queue.records().await.len(), 2);
    }
}

#[tokio::test]
async fn test_different_payloads_are_independent() {
    let queue = MemoryJobQueue::new();

    let a = queue.enqueue(&request("a")).await.unwrap();
    let b = queue.enqueue(&request("b")).await.unwrap();

    assert!(a.inserted_id().is_some());
    assert!(b.inserted_id().is_some());
}

#[tokio::test]
async fn test_inserted_record_has_initial_state() {
    let queue = MemoryJobQueue::new();
    let req = request("p");

    let id = queue.enqueue(&req).await.unwrap().inserted_id().unwrap();
    let record = queue.get(id).await.unwrap().unwrap();

    assert_eq!(record.title, "Github Push: jane/docs");
    assert_eq!(record.user, "jane");
    assert_eq!(record.email, "jane@example.com");
    assert_eq!(record.status, JobStatus::InQueue);
    assert_eq!(record.num_failures, 0);
    assert!(record.result.is_none());
    assert_eq!(record.payload, req.payload);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_identical_enqueues_insert_once() {
    let queue = Arc::new(MemoryJobQueue::new());
    let req = request("racy patch");

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let req = req.clone();
            tokio::spawn(async move { queue.enqueue(&req).await.unwrap() })
        })
        .collect();

    let mut inserted = 0;
    for handle in handles {
        if handle.await.unwrap().inserted_id().is_some() {
            inserted += 1;
        }
    }

    assert_eq!(inserted, 1);
    assert_eq!(queue.records().await.len(), 1);
}

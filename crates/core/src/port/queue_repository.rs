// Queue Repository Port (Interface)

use crate::domain::{Queue, QueueId, QueueStatus};
use crate::error::Result;
use async_trait::async_trait;

/// Outcome of an optimistic write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Snapshot stored; carries the new version
    Swapped { version: u64 },
    /// Stored version no longer matches the expected one
    Conflict,
}

/// Repository interface for queue snapshots.
///
/// A queue is always read and written as a whole. Writes are guarded by the
/// snapshot `version`, so a writer that started from a stale read never
/// overwrites a newer state.
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Store a brand new queue. Returns its initial version.
    async fn insert(&self, queue: &Queue) -> Result<u64>;

    /// Load a consistent snapshot
    async fn load(&self, id: &QueueId) -> Result<Option<Queue>>;

    /// Replace the stored snapshot if its version still equals `expected_version`
    async fn compare_and_swap(&self, queue: &Queue, expected_version: u64) -> Result<SwapOutcome>;

    /// All queues currently in `status`, oldest session first
    async fn list_by_status(&self, status: QueueStatus) -> Result<Vec<Queue>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::DomainError;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory repository with fault injection
    #[derive(Default)]
    pub struct InMemoryQueueRepository {
        queues: Mutex<HashMap<QueueId, Queue>>,
        conflicts_to_inject: AtomicUsize,
        fail_writes: AtomicBool,
        swap_calls: AtomicUsize,
    }

    impl InMemoryQueueRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make the next `n` swaps lose against a phantom concurrent writer
        pub fn inject_conflicts(&self, n: usize) {
            self.conflicts_to_inject.store(n, Ordering::SeqCst);
        }

        /// Make every swap fail with a storage error
        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        pub fn swap_calls(&self) -> usize {
            self.swap_calls.load(Ordering::SeqCst)
        }

        pub fn stored(&self, id: &str) -> Option<Queue> {
            self.queues.lock().unwrap().get(id).cloned()
        }
    }

    #[async_trait]
    impl QueueRepository for InMemoryQueueRepository {
        async fn insert(&self, queue: &Queue) -> Result<u64> {
            let mut queues = self.queues.lock().unwrap();
            if queues.contains_key(&queue.id) {
                return Err(AppError::Database(format!(
                    "Unique constraint violation: queue {}",
                    queue.id
                )));
            }
            let mut stored = queue.clone();
            stored.version = 1;
            queues.insert(stored.id.clone(), stored);
            Ok(1)
        }

        async fn load(&self, id: &QueueId) -> Result<Option<Queue>> {
            Ok(self.queues.lock().unwrap().get(id).cloned())
        }

        async fn compare_and_swap(
            &self,
            queue: &Queue,
            expected_version: u64,
        ) -> Result<SwapOutcome> {
            self.swap_calls.fetch_add(1, Ordering::SeqCst);

            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(AppError::Database("disk full".to_string()));
            }

            let mut queues = self.queues.lock().unwrap();
            let stored = queues
                .get_mut(&queue.id)
                .ok_or_else(|| DomainError::QueueNotFound(queue.id.clone()))?;

            let injected = self
                .conflicts_to_inject
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if injected {
                // Someone else wrote in between
                stored.version += 1;
                return Ok(SwapOutcome::Conflict);
            }

            if stored.version != expected_version {
                return Ok(SwapOutcome::Conflict);
            }

            let mut next = queue.clone();
            next.version = expected_version + 1;
            *stored = next;
            Ok(SwapOutcome::Swapped {
                version: expected_version + 1,
            })
        }

        async fn list_by_status(&self, status: QueueStatus) -> Result<Vec<Queue>> {
            let mut found: Vec<Queue> = self
                .queues
                .lock()
                .unwrap()
                .values()
                .filter(|q| q.status == status)
                .cloned()
                .collect();
            found.sort_by(|a, b| {
                a.session_date
                    .cmp(&b.session_date)
                    .then(a.created_at.cmp(&b.created_at))
            });
            Ok(found)
        }
    }
}

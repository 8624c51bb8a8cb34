// Per-queue write serialization

use crate::application::constants::LOCK_TABLE_PRUNE_THRESHOLD;
use crate::domain::QueueId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per queue id.
///
/// Writers on the same queue wait in FIFO order behind the holder; writers on
/// different queues never touch each other's lock. Readers do not use it.
#[derive(Default)]
pub struct QueueLocks {
    table: Mutex<HashMap<QueueId, Arc<AsyncMutex<()>>>>,
}

impl QueueLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for this queue's turn. The turn ends when the guard drops.
    pub async fn acquire(&self, queue_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
            if table.len() > LOCK_TABLE_PRUNE_THRESHOLD {
                // Only the table itself references an idle lock
                table.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            Arc::clone(table.entry(queue_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_queue_is_exclusive() {
        let locks = Arc::new(QueueLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            handles.push(tokio::spawn(async move {
                let _turn = locks.acquire("q1").await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_queues_do_not_block() {
        let locks = QueueLocks::new();
        let _a = locks.acquire("a").await;
        // Would hang if "b" shared "a"'s lock
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("b")).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }
}

// Notifier Port (queue-changed announcements)

use crate::domain::{QueueId, QueueStatus, TicketNumber, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// What happened to the queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueChange {
    Created,
    Joined { user_id: UserId, ticket_number: TicketNumber },
    Approved { user_id: UserId },
    Rejected { user_id: UserId },
    Left { user_id: UserId },
    Advanced { served: Option<TicketNumber> },
    StatusChanged { status: QueueStatus },
    MentorNote { user_id: UserId },
}

/// Announcement sent after a mutation is durable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueChanged {
    pub queue_id: QueueId,
    pub version: u64,
    pub change: QueueChange,
}

/// Fan-out boundary. Fire-and-forget: implementations must not fail the
/// caller, and a lost announcement never undoes the mutation behind it.
pub trait QueueNotifier: Send + Sync {
    fn announce(&self, event: QueueChanged);
}

/// In-process fan-out over a tokio broadcast channel
pub struct BroadcastNotifier {
    tx: broadcast::Sender<QueueChanged>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueChanged> {
        self.tx.subscribe()
    }
}

impl QueueNotifier for BroadcastNotifier {
    fn announce(&self, event: QueueChanged) {
        // Err only means nobody is listening right now
        if let Err(broadcast::error::SendError(event)) = self.tx.send(event) {
            debug!(queue_id = %event.queue_id, "No subscribers for queue change");
        }
    }
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every announcement for assertions
    #[derive(Default)]
    pub struct RecordingNotifier {
        events: Mutex<Vec<QueueChanged>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<QueueChanged> {
            self.events.lock().unwrap().clone()
        }
    }

    impl QueueNotifier for RecordingNotifier {
        fn announce(&self, event: QueueChanged) {
            self.events.lock().unwrap().push(event);
        }
    }
}

// Position / ETA Calculator
//
// Read-only projections over a queue snapshot. Recomputed on every read and
// never written back.

use crate::domain::member::MemberStatus;
use crate::domain::queue::Queue;
use crate::domain::ticket::TicketNumber;
use serde::{Deserialize, Serialize};

/// Where a waiting user stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuePosition {
    pub ticket_number: TicketNumber,
    /// 1-based rank among WAITING entries
    pub position: usize,
    pub waiting_count: usize,
    pub estimated_wait_minutes: u64,
}

/// Aggregate counts for the mentor dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub total: usize,
    pub pending: usize,
    pub waiting: usize,
    pub current: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub rejected: usize,
    pub estimated_completion_minutes: u64,
    /// Mean of (served_at - joined_at) over served entries
    pub average_wait_minutes: Option<u64>,
}

pub fn waiting_count(queue: &Queue) -> usize {
    queue.count(MemberStatus::Waiting)
}

/// Rank of the user's WAITING entry.
///
/// Returns `None` when the user is not waiting (pending, being served,
/// finished, or never joined).
pub fn position_of(queue: &Queue, user_id: &str) -> Option<QueuePosition> {
    let entry = queue
        .members
        .iter()
        .find(|m| m.user_id == user_id && m.status == MemberStatus::Waiting)?;

    let ahead = queue
        .members
        .iter()
        .filter(|m| m.status == MemberStatus::Waiting && m.ticket_number < entry.ticket_number)
        .count();
    let position = ahead + 1;

    Some(QueuePosition {
        ticket_number: entry.ticket_number,
        position,
        waiting_count: waiting_count(queue),
        estimated_wait_minutes: position as u64 * u64::from(queue.estimated_minutes_per_member),
    })
}

pub fn stats(queue: &Queue) -> QueueStats {
    let waiting = waiting_count(queue);

    let waits: Vec<i64> = queue
        .members
        .iter()
        .filter_map(|m| m.served_at.map(|served| (served - m.joined_at).max(0)))
        .collect();
    let average_wait_minutes = if waits.is_empty() {
        None
    } else {
        let total_ms: i64 = waits.iter().sum();
        Some((total_ms / waits.len() as i64 / 60_000) as u64)
    };

    QueueStats {
        total: queue.members.len(),
        pending: queue.count(MemberStatus::Pending),
        waiting,
        current: queue.count(MemberStatus::Current),
        completed: queue.count(MemberStatus::Completed),
        cancelled: queue.count(MemberStatus::Cancelled),
        rejected: queue.count(MemberStatus::Rejected),
        estimated_completion_minutes: waiting as u64
            * u64::from(queue.estimated_minutes_per_member),
        average_wait_minutes,
    }
}

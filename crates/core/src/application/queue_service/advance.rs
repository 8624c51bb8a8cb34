// Advance Use Case (mentor "next")

use super::{Access, Applied, QueueCoordinator};
use crate::domain::{Actor, MemberEntry, Queue, TicketNumber};
use crate::error::Result;
use crate::port::QueueChange;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Advance outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceResult {
    pub queue: Queue,
    /// Entry now being served, if anyone was waiting
    pub served: Option<MemberEntry>,
    /// Ticket that was completed by this step
    pub completed: Option<TicketNumber>,
}

/// Complete the current entry and serve the lowest waiting ticket.
///
/// Allowed in any queue status so a mentor can drain a paused queue. With
/// nobody current or waiting nothing is written or announced.
pub async fn execute(
    coord: &QueueCoordinator,
    queue_id: &str,
    actor: &Actor,
) -> Result<AdvanceResult> {
    let mutation = coord
        .mutate(queue_id, actor, Access::TeamManager, "advance", |queue, now| {
            let step = queue.advance(now)?;
            if !step.changed() {
                return Ok(Applied::Unchanged(step));
            }
            let served = step.served.as_ref().map(|m| m.ticket_number);
            Ok(Applied::Changed(step, QueueChange::Advanced { served }))
        })
        .await?;

    let step = mutation.outcome;
    match &step.served {
        Some(entry) => info!(
            queue_id = %queue_id,
            ticket = entry.ticket_number,
            user_id = %entry.user_id,
            "Now serving"
        ),
        None => info!(queue_id = %queue_id, completed = ?step.completed, "Nobody waiting"),
    }

    Ok(AdvanceResult {
        queue: mutation.queue,
        served: step.served,
        completed: step.completed,
    })
}

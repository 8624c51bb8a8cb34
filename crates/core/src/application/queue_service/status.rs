// Queue Status Use Case

use super::{Access, Applied, QueueCoordinator};
use crate::domain::{Actor, Queue, QueueStatus};
use crate::error::Result;
use crate::port::QueueChange;

/// Move the queue to `status`. Setting the status it already has is a no-op.
pub async fn execute(
    coord: &QueueCoordinator,
    queue_id: &str,
    actor: &Actor,
    status: QueueStatus,
) -> Result<Queue> {
    let mutation = coord
        .mutate(queue_id, actor, Access::TeamManager, "set_status", |queue, _| {
            if queue.set_status(status)? {
                Ok(Applied::Changed((), QueueChange::StatusChanged { status }))
            } else {
                Ok(Applied::Unchanged(()))
            }
        })
        .await?;
    Ok(mutation.queue)
}

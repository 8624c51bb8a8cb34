// Read-side queries (no lock, no write)

use super::QueueCoordinator;
use crate::domain::{position, Actor, Queue, QueuePosition, QueueStats, QueueStatus};
use crate::error::Result;

pub async fn snapshot(coord: &QueueCoordinator, queue_id: &str, actor: &Actor) -> Result<Queue> {
    let queue = coord.load(queue_id).await?;
    coord.present(actor, queue).await
}

/// `None` unless the user holds a WAITING entry
pub async fn position(
    coord: &QueueCoordinator,
    queue_id: &str,
    user_id: &str,
) -> Result<Option<QueuePosition>> {
    let queue = coord.load(queue_id).await?;
    Ok(position::position_of(&queue, user_id))
}

pub async fn stats(coord: &QueueCoordinator, queue_id: &str) -> Result<QueueStats> {
    let queue = coord.load(queue_id).await?;
    Ok(position::stats(&queue))
}

pub async fn list_active(coord: &QueueCoordinator, actor: &Actor) -> Result<Vec<Queue>> {
    let queues = coord.queue_repo.list_by_status(QueueStatus::Active).await?;
    let mut presented = Vec::with_capacity(queues.len());
    for queue in queues {
        presented.push(coord.present(actor, queue).await?);
    }
    Ok(presented)
}

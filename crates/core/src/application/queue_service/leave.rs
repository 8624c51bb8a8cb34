// Leave Use Case

use super::{Access, Applied, QueueCoordinator};
use crate::domain::{Actor, Queue};
use crate::error::Result;
use crate::port::QueueChange;
use tracing::info;

/// Cancel `user_id`'s live entry.
///
/// Students may only cancel their own entry; the team's mentor or an admin
/// may remove anyone.
pub async fn execute(
    coord: &QueueCoordinator,
    queue_id: &str,
    actor: &Actor,
    user_id: &str,
) -> Result<Queue> {
    let mutation = coord
        .mutate(
            queue_id,
            actor,
            Access::SelfOrTeamManager(user_id),
            "leave",
            |queue, now| {
                let previous = queue.leave(user_id, now)?;
                Ok(Applied::Changed(
                    previous,
                    QueueChange::Left {
                        user_id: user_id.to_string(),
                    },
                ))
            },
        )
        .await?;

    info!(
        queue_id = %queue_id,
        user_id = %user_id,
        previous = %mutation.outcome,
        by = %actor.user_id,
        "Entry cancelled"
    );

    Ok(mutation.presented())
}

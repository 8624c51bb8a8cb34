// Review Use Cases (mentor/admin): approve, reject, annotate

use super::{validate_note, Access, Applied, QueueCoordinator};
use crate::domain::{Actor, Queue};
use crate::error::Result;
use crate::port::QueueChange;

/// PENDING -> WAITING
pub async fn approve(
    coord: &QueueCoordinator,
    queue_id: &str,
    actor: &Actor,
    user_id: &str,
) -> Result<Queue> {
    let mutation = coord
        .mutate(queue_id, actor, Access::TeamManager, "approve", |queue, _| {
            queue.approve(user_id)?;
            Ok(Applied::Changed(
                (),
                QueueChange::Approved {
                    user_id: user_id.to_string(),
                },
            ))
        })
        .await?;
    Ok(mutation.queue)
}

/// PENDING -> REJECTED
pub async fn reject(
    coord: &QueueCoordinator,
    queue_id: &str,
    actor: &Actor,
    user_id: &str,
) -> Result<Queue> {
    let mutation = coord
        .mutate(queue_id, actor, Access::TeamManager, "reject", |queue, now| {
            queue.reject(user_id, now)?;
            Ok(Applied::Changed(
                (),
                QueueChange::Rejected {
                    user_id: user_id.to_string(),
                },
            ))
        })
        .await?;
    Ok(mutation.queue)
}

/// Write (or clear, with `None`) the mentor note on the user's latest entry
pub async fn set_mentor_note(
    coord: &QueueCoordinator,
    queue_id: &str,
    actor: &Actor,
    user_id: &str,
    note: Option<String>,
) -> Result<Queue> {
    let note = validate_note(note)?;

    let mutation = coord
        .mutate(queue_id, actor, Access::TeamManager, "mentor_note", |queue, _| {
            queue.set_mentor_note(user_id, note.clone())?;
            Ok(Applied::Changed(
                (),
                QueueChange::MentorNote {
                    user_id: user_id.to_string(),
                },
            ))
        })
        .await?;
    Ok(mutation.queue)
}

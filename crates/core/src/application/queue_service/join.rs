// Join Use Case

use super::{validate_note, Access, Applied, QueueCoordinator};
use crate::domain::{Actor, Queue};
use crate::error::Result;
use crate::port::QueueChange;
use tracing::info;

/// Execute join: the caller asks for a slot as themself.
///
/// The ticket is drawn inside the serialized mutation, so two callers
/// joining at the same moment can never share a number.
pub async fn execute(
    coord: &QueueCoordinator,
    queue_id: &str,
    actor: &Actor,
    note: Option<String>,
) -> Result<Queue> {
    let note = validate_note(note)?;
    let user_id = actor.user_id.as_str();

    let mutation = coord
        .mutate(queue_id, actor, Access::Member, "join", |queue, now| {
            let ticket = queue.join(user_id, note.clone(), now)?;
            Ok(Applied::Changed(
                ticket,
                QueueChange::Joined {
                    user_id: user_id.to_string(),
                    ticket_number: ticket,
                },
            ))
        })
        .await?;

    info!(
        queue_id = %queue_id,
        user_id = %user_id,
        ticket = mutation.outcome,
        "Join request recorded"
    );

    Ok(mutation.presented())
}

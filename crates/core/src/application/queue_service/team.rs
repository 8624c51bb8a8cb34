// Register Team Use Case (admin only)

use super::QueueCoordinator;
use crate::domain::{Actor, DomainError, Role, Team};
use crate::error::{AppError, Result};
use tracing::info;

pub async fn register(coord: &QueueCoordinator, actor: &Actor, team: Team) -> Result<Team> {
    if actor.role != Role::Admin {
        return Err(DomainError::NotAuthorized(format!(
            "{} ({}) cannot register teams",
            actor.user_id, actor.role
        ))
        .into());
    }

    let team = Team {
        id: team.id.trim().to_string(),
        name: team.name.trim().to_string(),
        mentor_id: team.mentor_id.trim().to_string(),
        is_active: team.is_active,
    };
    if team.id.is_empty() || team.name.is_empty() || team.mentor_id.is_empty() {
        return Err(AppError::Validation(
            "team id, name and mentor_id must not be empty".to_string(),
        ));
    }

    coord.teams.register(&team).await?;
    info!(team_id = %team.id, mentor_id = %team.mentor_id, by = %actor.user_id, "Team saved");
    Ok(team)
}

// Create Queue Use Case

use super::QueueCoordinator;
use crate::domain::{Actor, DomainError, Queue, TeamId, DEFAULT_MINUTES_PER_MEMBER};
use crate::error::{AppError, Result};
use crate::port::{QueueChange, QueueChanged};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Create queue request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQueueRequest {
    pub team_id: TeamId,
    /// Defaults to today (UTC)
    #[serde(default)]
    pub session_date: Option<NaiveDate>,
    /// Defaults to DEFAULT_MINUTES_PER_MEMBER
    #[serde(default)]
    pub estimated_minutes_per_member: Option<u32>,
}

impl CreateQueueRequest {
    pub fn for_team(team_id: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            session_date: None,
            estimated_minutes_per_member: None,
        }
    }
}

/// Execute create: the team must exist, be active, and be managed by `actor`.
pub async fn execute(
    coord: &QueueCoordinator,
    actor: &Actor,
    req: CreateQueueRequest,
) -> Result<Queue> {
    let team = coord
        .teams
        .find_team(&req.team_id)
        .await?
        .ok_or_else(|| DomainError::TeamNotFound(req.team_id.clone()))?;

    if !team.is_active {
        return Err(AppError::Validation(format!(
            "team {} is not active",
            team.id
        )));
    }
    if !team.is_managed_by(actor) {
        return Err(DomainError::NotAuthorized(format!(
            "{} ({}) cannot open a queue for team {}",
            actor.user_id, actor.role, team.id
        ))
        .into());
    }

    let now = coord.time_provider.now_millis();
    let session_date = match req.session_date {
        Some(date) => date,
        None => DateTime::from_timestamp_millis(now)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| AppError::Internal(format!("clock out of range: {}", now)))?,
    };
    let minutes = req
        .estimated_minutes_per_member
        .unwrap_or(DEFAULT_MINUTES_PER_MEMBER);

    let mut queue = Queue::new(
        coord.id_provider.generate_id(),
        team.id.clone(),
        session_date,
        minutes,
        now,
    )?;
    queue.version = coord.queue_repo.insert(&queue).await?;

    info!(
        queue_id = %queue.id,
        team_id = %team.id,
        session_date = %session_date,
        by = %actor.user_id,
        "Queue created"
    );

    coord.notifier.announce(QueueChanged {
        queue_id: queue.id.clone(),
        version: queue.version,
        change: QueueChange::Created,
    });

    Ok(queue)
}

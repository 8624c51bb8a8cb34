// Queue Coordinator - sole entry point for every queue mutation
//
// Each mutation runs as: take the queue's turn -> load snapshot -> authorize
// -> apply the state machine -> compare-and-swap -> announce. A lost swap
// reloads and reapplies; any error leaves the stored snapshot untouched.

pub mod advance;
pub mod create;
pub mod join;
pub mod leave;
pub mod query;
pub mod review;
pub mod status;
pub mod team;

#[cfg(test)]
mod coordinator_test;

pub use advance::AdvanceResult;
pub use create::CreateQueueRequest;

use crate::application::constants::{
    DEFAULT_MAX_SWAP_ATTEMPTS, DEFAULT_SWAP_BASE_DELAY_MS, MAX_NOTE_LENGTH,
};
use crate::application::locks::QueueLocks;
use crate::application::retry::{RetryDecision, SwapRetryPolicy};
use crate::domain::{
    Actor, DomainError, Queue, QueuePosition, QueueStats, QueueStatus, Role, Team, TeamId,
};
use crate::error::{AppError, Result};
use crate::port::{
    IdProvider, QueueChange, QueueChanged, QueueNotifier, QueueRepository, SwapOutcome,
    TeamDirectory, TimeProvider,
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Coordinator tuning
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub max_swap_attempts: u32,
    pub swap_base_delay_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_swap_attempts: DEFAULT_MAX_SWAP_ATTEMPTS,
            swap_base_delay_ms: DEFAULT_SWAP_BASE_DELAY_MS,
        }
    }
}

/// Who may run a mutation
pub(crate) enum Access<'a> {
    /// Any authenticated caller
    Member,
    /// The team's mentor or an admin
    TeamManager,
    /// The named user themself, or a team manager
    SelfOrTeamManager(&'a str),
}

/// What a state-machine step produced
pub(crate) enum Applied<T> {
    Changed(T, QueueChange),
    Unchanged(T),
}

pub(crate) struct Mutation<T> {
    pub queue: Queue,
    pub outcome: T,
    /// Whether the caller manages the queue's team, settled before the write
    pub manager: bool,
}

impl<T> Mutation<T> {
    /// The stored snapshot as the caller may see it
    pub fn presented(self) -> Queue {
        if self.manager {
            self.queue
        } else {
            self.queue.without_mentor_notes()
        }
    }
}

pub struct QueueCoordinator {
    queue_repo: Arc<dyn QueueRepository>,
    teams: Arc<dyn TeamDirectory>,
    notifier: Arc<dyn QueueNotifier>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    retry_policy: SwapRetryPolicy,
    locks: QueueLocks,
}

impl QueueCoordinator {
    pub fn new(
        queue_repo: Arc<dyn QueueRepository>,
        teams: Arc<dyn TeamDirectory>,
        notifier: Arc<dyn QueueNotifier>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            queue_repo,
            teams,
            notifier,
            id_provider,
            time_provider,
            retry_policy: SwapRetryPolicy::new(config.max_swap_attempts, config.swap_base_delay_ms),
            locks: QueueLocks::new(),
        }
    }

    /// Open a new queue for a team (mentor of that team, or admin)
    pub async fn create_queue(&self, actor: &Actor, req: CreateQueueRequest) -> Result<Queue> {
        create::execute(self, actor, req).await
    }

    /// Add or update a team record (admin only)
    pub async fn register_team(&self, actor: &Actor, team: Team) -> Result<Team> {
        team::register(self, actor, team).await
    }

    /// Request a slot as the calling user
    pub async fn join(&self, queue_id: &str, actor: &Actor, note: Option<String>) -> Result<Queue> {
        join::execute(self, queue_id, actor, note).await
    }

    pub async fn approve(&self, queue_id: &str, actor: &Actor, user_id: &str) -> Result<Queue> {
        review::approve(self, queue_id, actor, user_id).await
    }

    pub async fn reject(&self, queue_id: &str, actor: &Actor, user_id: &str) -> Result<Queue> {
        review::reject(self, queue_id, actor, user_id).await
    }

    /// Cancel `user_id`'s live entry (the user themself, or a team manager)
    pub async fn leave(&self, queue_id: &str, actor: &Actor, user_id: &str) -> Result<Queue> {
        leave::execute(self, queue_id, actor, user_id).await
    }

    /// Serve the next waiting student
    pub async fn advance(&self, queue_id: &str, actor: &Actor) -> Result<AdvanceResult> {
        advance::execute(self, queue_id, actor).await
    }

    pub async fn set_status(
        &self,
        queue_id: &str,
        actor: &Actor,
        status: QueueStatus,
    ) -> Result<Queue> {
        status::execute(self, queue_id, actor, status).await
    }

    pub async fn set_mentor_note(
        &self,
        queue_id: &str,
        actor: &Actor,
        user_id: &str,
        note: Option<String>,
    ) -> Result<Queue> {
        review::set_mentor_note(self, queue_id, actor, user_id, note).await
    }

    /// Current snapshot as `actor` may see it
    pub async fn snapshot(&self, queue_id: &str, actor: &Actor) -> Result<Queue> {
        query::snapshot(self, queue_id, actor).await
    }

    pub async fn position(&self, queue_id: &str, user_id: &str) -> Result<Option<QueuePosition>> {
        query::position(self, queue_id, user_id).await
    }

    pub async fn stats(&self, queue_id: &str) -> Result<QueueStats> {
        query::stats(self, queue_id).await
    }

    pub async fn list_active(&self, actor: &Actor) -> Result<Vec<Queue>> {
        query::list_active(self, actor).await
    }

    /// Run one serialized, all-or-nothing mutation against a queue.
    ///
    /// `apply` may run more than once: after a lost swap it is called again
    /// on the freshly loaded snapshot, so it must not carry state between
    /// calls.
    pub(crate) async fn mutate<T, F>(
        &self,
        queue_id: &str,
        actor: &Actor,
        access: Access<'_>,
        op: &'static str,
        mut apply: F,
    ) -> Result<Mutation<T>>
    where
        F: FnMut(&mut Queue, i64) -> std::result::Result<Applied<T>, DomainError>,
    {
        let _turn = self.locks.acquire(queue_id).await;
        let mut authorized: Option<bool> = None;
        let mut attempt = 0;

        loop {
            attempt += 1;

            let mut queue = self.load(queue_id).await?;
            let manager = match authorized {
                Some(manager) => manager,
                None => {
                    let manager = self.authorize(actor, &access, &queue).await?;
                    authorized = Some(manager);
                    manager
                }
            };

            let expected_version = queue.version;
            let now = self.time_provider.now_millis();

            let (outcome, change) = match apply(&mut queue, now)? {
                Applied::Unchanged(outcome) => {
                    return Ok(Mutation {
                        queue,
                        outcome,
                        manager,
                    })
                }
                Applied::Changed(outcome, change) => (outcome, change),
            };

            let swapped = self
                .queue_repo
                .compare_and_swap(&queue, expected_version)
                .await
                .map_err(|e| {
                    error!(queue_id = %queue_id, op, error = %e, "Failed to persist queue");
                    e
                })?;

            match swapped {
                SwapOutcome::Swapped { version } => {
                    queue.version = version;
                    info!(
                        queue_id = %queue_id,
                        op,
                        actor = %actor.user_id,
                        version,
                        attempt,
                        "Queue updated"
                    );
                    self.notifier.announce(QueueChanged {
                        queue_id: queue.id.clone(),
                        version,
                        change,
                    });
                    return Ok(Mutation {
                        queue,
                        outcome,
                        manager,
                    });
                }
                SwapOutcome::Conflict => {
                    warn!(
                        queue_id = %queue_id,
                        op,
                        expected_version,
                        attempt,
                        "Concurrent write detected, reloading"
                    );
                    match self.retry_policy.should_retry(queue_id, attempt) {
                        RetryDecision::Retry(delay) => tokio::time::sleep(delay).await,
                        RetryDecision::GiveUp => {
                            return Err(AppError::Conflict(format!(
                                "queue {} kept changing during {} ({} attempts)",
                                queue_id, op, attempt
                            )));
                        }
                    }
                }
            }
        }
    }

    pub(crate) async fn load(&self, queue_id: &str) -> Result<Queue> {
        self.queue_repo
            .load(&queue_id.to_string())
            .await?
            .ok_or_else(|| DomainError::QueueNotFound(queue_id.to_string()).into())
    }

    /// Admins manage every queue, students none; mentors only their team's.
    pub(crate) async fn manages_team(&self, actor: &Actor, team_id: &TeamId) -> Result<bool> {
        match actor.role {
            Role::Admin => Ok(true),
            Role::Student => Ok(false),
            Role::Mentor => {
                let team = self
                    .teams
                    .find_team(team_id)
                    .await?
                    .ok_or_else(|| DomainError::TeamNotFound(team_id.clone()))?;
                Ok(team.is_managed_by(actor))
            }
        }
    }

    /// Strip mentor notes unless `actor` manages the queue's team
    pub(crate) async fn present(&self, actor: &Actor, queue: Queue) -> Result<Queue> {
        if self.manages_team(actor, &queue.team_id).await? {
            Ok(queue)
        } else {
            Ok(queue.without_mentor_notes())
        }
    }

    /// Check `access` and report whether `actor` manages the queue's team.
    ///
    /// Runs before anything is written, so every team lookup a mutation
    /// needs happens here.
    async fn authorize(&self, actor: &Actor, access: &Access<'_>, queue: &Queue) -> Result<bool> {
        let manager = self.manages_team(actor, &queue.team_id).await?;
        let allowed = match access {
            Access::Member => true,
            Access::SelfOrTeamManager(user_id) => manager || *user_id == actor.user_id,
            Access::TeamManager => manager,
        };

        if allowed {
            Ok(manager)
        } else {
            warn!(queue_id = %queue.id, actor = %actor.user_id, role = %actor.role, "Access denied");
            Err(DomainError::NotAuthorized(format!(
                "{} ({}) cannot manage queue {}",
                actor.user_id, actor.role, queue.id
            ))
            .into())
        }
    }
}

/// Trim a free-text note; blank means no note
pub(crate) fn validate_note(note: Option<String>) -> Result<Option<String>> {
    let Some(note) = note else {
        return Ok(None);
    };
    let trimmed = note.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_NOTE_LENGTH {
        return Err(AppError::Validation(format!(
            "note too long (max {} characters)",
            MAX_NOTE_LENGTH
        )));
    }
    Ok(Some(trimmed.to_string()))
}

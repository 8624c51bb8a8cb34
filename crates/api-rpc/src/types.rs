//! RPC Request/Response Types
//!
//! Every mutating call carries the authenticated caller as `actor`. The
//! transport in front of the daemon is trusted to fill it in.

use chrono::NaiveDate;
use mentorq_core::domain::{Actor, QueuePosition, QueueStatus, Role};
use serde::{Deserialize, Serialize};

/// Caller identity as sent on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorParam {
    pub user_id: String,
    pub role: Role,
}

impl From<ActorParam> for Actor {
    fn from(p: ActorParam) -> Self {
        Actor::new(p.user_id, p.role)
    }
}

/// team.register.v1
#[derive(Debug, Deserialize)]
pub struct RegisterTeamRequest {
    pub actor: ActorParam,
    pub team_id: String,
    pub name: String,
    pub mentor_id: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// queue.create.v1
#[derive(Debug, Deserialize)]
pub struct CreateQueueRequest {
    pub actor: ActorParam,
    pub team_id: String,
    #[serde(default)]
    pub session_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_minutes_per_member: Option<u32>,
}

/// queue.join.v1
#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub actor: ActorParam,
    pub queue_id: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// queue.approve.v1, queue.reject.v1, queue.leave.v1
#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    pub actor: ActorParam,
    pub queue_id: String,
    pub user_id: String,
}

/// queue.advance.v1, queue.get.v1
#[derive(Debug, Deserialize)]
pub struct QueueRequest {
    pub actor: ActorParam,
    pub queue_id: String,
}

/// queue.status.v1
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub actor: ActorParam,
    pub queue_id: String,
    /// ACTIVE, PAUSED or CLOSED (case-insensitive)
    pub status: String,
}

/// queue.mentor_note.v1
#[derive(Debug, Deserialize)]
pub struct MentorNoteRequest {
    pub actor: ActorParam,
    pub queue_id: String,
    pub user_id: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// queue.position.v1
#[derive(Debug, Deserialize)]
pub struct PositionRequest {
    pub queue_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionResponse {
    pub queue_id: String,
    pub user_id: String,
    /// Absent unless the user is WAITING
    pub position: Option<QueuePosition>,
}

/// queue.stats.v1
#[derive(Debug, Deserialize)]
pub struct StatsRequest {
    pub queue_id: String,
}

/// queue.list_active.v1
#[derive(Debug, Deserialize)]
pub struct ListActiveRequest {
    pub actor: ActorParam,
}

/// Row of queue.list_active.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSummary {
    pub queue_id: String,
    pub team_id: String,
    pub session_date: NaiveDate,
    pub status: QueueStatus,
    pub waiting: usize,
    pub pending: usize,
    pub now_serving: Option<u64>,
}

/// queue.subscribe.v1
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeRequest {
    /// Only forward changes of this queue; all queues when absent
    #[serde(default)]
    pub queue_id: Option<String>,
}

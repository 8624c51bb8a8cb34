//! RPC Method Handlers
//!
//! Thin translation between wire types and the queue coordinator.

use crate::error::to_rpc_error;
use crate::types::{
    CreateQueueRequest, JoinRequest, ListActiveRequest, MemberRequest, MentorNoteRequest,
    PositionRequest, PositionResponse, QueueRequest, QueueSummary, RegisterTeamRequest,
    SetStatusRequest, StatsRequest,
};
use jsonrpsee::types::ErrorObjectOwned;
use mentorq_core::application::{AdvanceResult, QueueCoordinator};
use mentorq_core::domain::{Actor, MemberStatus, Queue, QueueStats, QueueStatus, Team};
use mentorq_core::error::AppError;
use std::sync::Arc;

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    coordinator: Arc<QueueCoordinator>,
}

impl RpcHandler {
    pub fn new(coordinator: Arc<QueueCoordinator>) -> Self {
        Self { coordinator }
    }

    /// team.register.v1
    pub async fn register_team(&self, params: RegisterTeamRequest) -> RpcResult<Team> {
        let team = Team {
            id: params.team_id,
            name: params.name,
            mentor_id: params.mentor_id,
            is_active: params.is_active,
        };
        self.coordinator
            .register_team(&params.actor.into(), team)
            .await
            .map_err(to_rpc_error)
    }

    /// queue.create.v1
    pub async fn create_queue(&self, params: CreateQueueRequest) -> RpcResult<Queue> {
        let req = mentorq_core::application::CreateQueueRequest {
            team_id: params.team_id,
            session_date: params.session_date,
            estimated_minutes_per_member: params.estimated_minutes_per_member,
        };
        self.coordinator
            .create_queue(&params.actor.into(), req)
            .await
            .map_err(to_rpc_error)
    }

    /// queue.join.v1
    pub async fn join(&self, params: JoinRequest) -> RpcResult<Queue> {
        self.coordinator
            .join(&params.queue_id, &params.actor.into(), params.note)
            .await
            .map_err(to_rpc_error)
    }

    /// queue.approve.v1
    pub async fn approve(&self, params: MemberRequest) -> RpcResult<Queue> {
        self.coordinator
            .approve(&params.queue_id, &params.actor.into(), &params.user_id)
            .await
            .map_err(to_rpc_error)
    }

    /// queue.reject.v1
    pub async fn reject(&self, params: MemberRequest) -> RpcResult<Queue> {
        self.coordinator
            .reject(&params.queue_id, &params.actor.into(), &params.user_id)
            .await
            .map_err(to_rpc_error)
    }

    /// queue.leave.v1
    pub async fn leave(&self, params: MemberRequest) -> RpcResult<Queue> {
        self.coordinator
            .leave(&params.queue_id, &params.actor.into(), &params.user_id)
            .await
            .map_err(to_rpc_error)
    }

    /// queue.advance.v1
    pub async fn advance(&self, params: QueueRequest) -> RpcResult<AdvanceResult> {
        self.coordinator
            .advance(&params.queue_id, &params.actor.into())
            .await
            .map_err(to_rpc_error)
    }

    /// queue.status.v1
    pub async fn set_status(&self, params: SetStatusRequest) -> RpcResult<Queue> {
        let status: QueueStatus = params
            .status
            .parse()
            .map_err(|e| to_rpc_error(AppError::from(e)))?;
        self.coordinator
            .set_status(&params.queue_id, &params.actor.into(), status)
            .await
            .map_err(to_rpc_error)
    }

    /// queue.mentor_note.v1
    pub async fn set_mentor_note(&self, params: MentorNoteRequest) -> RpcResult<Queue> {
        self.coordinator
            .set_mentor_note(
                &params.queue_id,
                &params.actor.into(),
                &params.user_id,
                params.note,
            )
            .await
            .map_err(to_rpc_error)
    }

    /// queue.get.v1
    pub async fn snapshot(&self, params: QueueRequest) -> RpcResult<Queue> {
        self.coordinator
            .snapshot(&params.queue_id, &params.actor.into())
            .await
            .map_err(to_rpc_error)
    }

    /// queue.position.v1
    pub async fn position(&self, params: PositionRequest) -> RpcResult<PositionResponse> {
        let position = self
            .coordinator
            .position(&params.queue_id, &params.user_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(PositionResponse {
            queue_id: params.queue_id,
            user_id: params.user_id,
            position,
        })
    }

    /// queue.stats.v1
    pub async fn stats(&self, params: StatsRequest) -> RpcResult<QueueStats> {
        self.coordinator
            .stats(&params.queue_id)
            .await
            .map_err(to_rpc_error)
    }

    /// queue.list_active.v1
    pub async fn list_active(&self, params: ListActiveRequest) -> RpcResult<Vec<QueueSummary>> {
        let actor: Actor = params.actor.into();
        let queues = self
            .coordinator
            .list_active(&actor)
            .await
            .map_err(to_rpc_error)?;

        Ok(queues.iter().map(summarize).collect())
    }
}

fn summarize(queue: &Queue) -> QueueSummary {
    QueueSummary {
        queue_id: queue.id.clone(),
        team_id: queue.team_id.clone(),
        session_date: queue.session_date,
        status: queue.status,
        waiting: queue.count(MemberStatus::Waiting),
        pending: queue.count(MemberStatus::Pending),
        now_serving: queue.current().map(|m| m.ticket_number),
    }
}
